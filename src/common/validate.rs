use once_cell::sync::Lazy;
use regex::Regex;

/// Same anchored shape the portal upload flow checks: something before the
/// `@`, something after, and at least one dot in the host part.
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Absolute URLs only; a bare `example.com` does not count.
pub fn is_valid_url(value: &str) -> bool {
    url::Url::parse(value).is_ok()
}

/// The host part of an email address, lowercased. `None` when the value
/// does not look like an address at all.
pub fn email_domain(email: &str) -> Option<String> {
    if !is_valid_email(email) {
        return None;
    }
    email
        .rsplit_once('@')
        .map(|(_, domain)| domain.trim().to_lowercase())
}
