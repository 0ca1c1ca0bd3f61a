//! Email and URL predicates used by metadata normalization
//!
//! All functions are total: they never panic and never return errors.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use url::Url;

/// URL schemes accepted by [`is_url`]
pub const URL_SCHEMES: &[&str] = &["http", "https", "ftp", "ftps"];

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$")
            .expect("email pattern is valid")
    })
}

/// Check whether a string looks like `local@domain.tld`
///
/// The domain must contain at least one dot, so bare hostnames such as
/// `localhost` are rejected.
pub fn is_email(value: &str) -> bool {
    email_regex().is_match(value)
}

/// Check whether a string is a `scheme://host...` URL with a known scheme
pub fn is_url(value: &str) -> bool {
    if value.contains(char::is_whitespace) || !value.contains("://") {
        return false;
    }

    match Url::parse(value) {
        Ok(url) => {
            URL_SCHEMES.contains(&url.scheme()) && url.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    }
}

/// [`is_email`] for untyped metadata values; anything but a string is rejected
pub fn value_is_email(value: &Value) -> bool {
    value.as_str().is_some_and(is_email)
}

/// [`is_url`] for untyped metadata values; anything but a string is rejected
pub fn value_is_url(value: &Value) -> bool {
    value.as_str().is_some_and(is_url)
}
