use crate::app::ports::{LookupError, LookupResult};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::warn;

const JITTER_CEILING_MS: u64 = 250;
const BODY_SNIPPET_CHARS: usize = 200;

/// Retry knobs shared by every lookup adapter.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

/// JSON wrapper over reqwest used by all lookup adapters. Failed attempts
/// are retried with a linearly growing delay plus jitter so concurrent
/// enrichment tasks do not retry in lockstep.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    retry: RetryConfig,
}

impl ApiClient {
    pub fn new(retry: RetryConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            retry,
        }
    }

    pub async fn get_json<T>(&self, url: &str, bearer: Option<&str>) -> LookupResult<T>
    where
        T: DeserializeOwned,
    {
        self.request_json(|| {
            let mut req = self.http.get(url);
            if let Some(token) = bearer {
                req = req.bearer_auth(token);
            }
            req
        })
        .await
    }

    pub async fn post_json<B, T>(&self, url: &str, bearer: Option<&str>, body: &B) -> LookupResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        self.request_json(|| {
            let mut req = self.http.post(url).json(body);
            if let Some(token) = bearer {
                req = req.bearer_auth(token);
            }
            req
        })
        .await
    }

    /// Plain GET that only reports whether the response was 2xx. Transport
    /// errors count as "not there" rather than failing the caller.
    pub async fn probe(&self, url: &str) -> LookupResult<bool> {
        match self.http.get(url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(e) if e.is_connect() || e.is_timeout() => Ok(false),
            Err(e) => Err(LookupError::Request(e.to_string())),
        }
    }

    pub async fn get_text(&self, url: &str) -> LookupResult<String> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| LookupError::Request(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(LookupError::Response(format!(
                "HTTP {} from {url}",
                status.as_u16()
            )));
        }
        resp.text()
            .await
            .map_err(|e| LookupError::Request(e.to_string()))
    }

    async fn request_json<T, F>(&self, build: F) -> LookupResult<T>
    where
        T: DeserializeOwned,
        F: Fn() -> reqwest::RequestBuilder,
    {
        let attempts = self.retry.attempts.max(1);
        let mut last_error = LookupError::Request("no attempts were made".to_string());
        for attempt in 1..=attempts {
            match self.execute(build()).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!(attempt, attempts, error = %e, "api request attempt failed");
                    last_error = e;
                    if attempt < attempts {
                        tokio::time::sleep(retry_delay(self.retry.base_delay, attempt)).await;
                    }
                }
            }
        }
        Err(match last_error {
            LookupError::Request(msg) => {
                LookupError::Request(format!("after {attempts} attempts: {msg}"))
            }
            LookupError::Response(msg) => {
                LookupError::Response(format!("after {attempts} attempts: {msg}"))
            }
            other => other,
        })
    }

    async fn execute<T>(&self, req: reqwest::RequestBuilder) -> LookupResult<T>
    where
        T: DeserializeOwned,
    {
        let resp = req
            .send()
            .await
            .map_err(|e| LookupError::Request(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LookupError::Response(format!(
                "HTTP {}: {}",
                status.as_u16(),
                snippet(&body)
            )));
        }
        resp.json::<T>()
            .await
            .map_err(|e| LookupError::Response(format!("invalid JSON body: {e}")))
    }
}

/// Linear backoff with a little randomness on top.
fn retry_delay(base: Duration, attempt: u32) -> Duration {
    let jitter = rand::thread_rng().gen_range(0..=JITTER_CEILING_MS);
    base * attempt + Duration::from_millis(jitter)
}

/// Error bodies can be huge HTML pages; keep only the start.
fn snippet(body: &str) -> &str {
    match body.char_indices().nth(BODY_SNIPPET_CHARS) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_grows_linearly_with_attempt() {
        let base = Duration::from_millis(1000);
        for attempt in 1..=3 {
            let delay = retry_delay(base, attempt);
            assert!(delay >= base * attempt);
            assert!(delay <= base * attempt + Duration::from_millis(JITTER_CEILING_MS));
        }
    }

    #[test]
    fn snippet_truncates_long_bodies_on_char_boundaries() {
        let short = "not found";
        assert_eq!(snippet(short), short);

        let long = "é".repeat(500);
        let cut = snippet(&long);
        assert_eq!(cut.chars().count(), 200);
    }

    #[test]
    fn default_retry_matches_the_documented_budget() {
        let retry = RetryConfig::default();
        assert_eq!(retry.attempts, 3);
        assert_eq!(retry.base_delay, Duration::from_millis(1000));
    }
}
