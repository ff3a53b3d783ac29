use crate::app::ports::{EmailValidation, EmailValidatorPort, LookupError, LookupResult};
use crate::common::constants::EMAIL_VALIDATION_SOURCE;
use crate::infra::api_client::ApiClient;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

const ENDPOINT: &str = "https://api.emailvalidation.io/v1/email";

/// Deliverability check against the hosted validation service.
pub struct EmailValidationApi {
    client: ApiClient,
    key: Option<String>,
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    email: &'a str,
}

#[derive(Deserialize)]
struct VerifyResponse {
    valid: Option<bool>,
    deliverable: Option<bool>,
    reason: Option<String>,
    risk_score: Option<f64>,
    provider: Option<String>,
}

impl EmailValidationApi {
    pub fn new(client: ApiClient, key: Option<String>) -> Self {
        Self { client, key }
    }
}

#[async_trait]
impl EmailValidatorPort for EmailValidationApi {
    async fn validate(&self, email: &str) -> LookupResult<EmailValidation> {
        let key = self
            .key
            .as_deref()
            .ok_or(LookupError::NotConfigured(EMAIL_VALIDATION_SOURCE))?;
        debug!(email, "validating email address");
        let resp: VerifyResponse = self
            .client
            .post_json(ENDPOINT, Some(key), &VerifyRequest { email })
            .await?;
        Ok(EmailValidation {
            valid: Some(resp.valid.unwrap_or(false)),
            deliverable: Some(resp.deliverable.unwrap_or(false)),
            reason: resp.reason.unwrap_or_else(|| "unknown".to_string()),
            risk_score: resp.risk_score,
            provider: resp.provider,
            error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_reports_not_configured() {
        let api = EmailValidationApi::new(ApiClient::new(Default::default()), None);
        let err = api.validate("a@b.co").await.unwrap_err();
        assert_eq!(err, LookupError::NotConfigured(EMAIL_VALIDATION_SOURCE));
    }
}
