//! # Redirect Fragment Parsing
//!
//! After sign-in the provider sends the browser back to the redirect target
//! with the result in the URL fragment:
//!
//! ```text
//! https://locus.app/#id_token=eyJ...&authuser=0&prompt=none
//! https://locus.app/#error=access_denied&error_description=...
//! ```
//!
//! The fragment is `application/x-www-form-urlencoded`. Nothing here
//! validates the token itself.

use url::form_urlencoded;

use crate::assertion::IdentityAssertion;
use crate::config::ID_TOKEN_KEY;
use crate::error::IdentityError;

/// An error reported by the provider in place of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub error: String,
    pub description: Option<String>,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.description {
            Some(description) => write!(f, "{}: {}", self.error, description),
            None => f.write_str(&self.error),
        }
    }
}

fn pairs(fragment: &str) -> form_urlencoded::Parse<'_> {
    let body = fragment.strip_prefix('#').unwrap_or(fragment);
    form_urlencoded::parse(body.as_bytes())
}

fn first_value(fragment: &str, key: &str) -> Option<String> {
    pairs(fragment)
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Pull the `id_token` out of a redirect fragment.
///
/// A leading `#` is optional. Returns `None` when the key is missing or
/// its value is empty; never fails.
///
/// ```
/// use locus_identity::extract_assertion;
///
/// let token = extract_assertion("#id_token=abc&foo=bar").unwrap();
/// assert_eq!(token.as_str(), "abc");
/// assert!(extract_assertion("#foo=bar").is_none());
/// assert!(extract_assertion("").is_none());
/// ```
pub fn extract_assertion(fragment: &str) -> Option<IdentityAssertion> {
    first_value(fragment, ID_TOKEN_KEY)
        .filter(|token| !token.is_empty())
        .map(IdentityAssertion::new)
}

/// Like [`extract_assertion`], but a missing token is
/// [`IdentityError::MissingToken`].
pub fn require_assertion(fragment: &str) -> Result<IdentityAssertion, IdentityError> {
    extract_assertion(fragment).ok_or(IdentityError::MissingToken)
}

/// The provider's `error` / `error_description`, if the fragment carries one.
pub fn provider_error(fragment: &str) -> Option<ProviderError> {
    let mut error = None;
    let mut description = None;
    for (key, value) in pairs(fragment) {
        match key.as_ref() {
            "error" if error.is_none() => error = Some(value.into_owned()),
            "error_description" if description.is_none() => {
                description = Some(value.into_owned())
            }
            _ => {}
        }
    }
    error
        .filter(|e| !e.is_empty())
        .map(|error| ProviderError { error, description })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_id_token() {
        let token = extract_assertion("#id_token=abc&foo=bar").unwrap();
        assert_eq!(token.as_str(), "abc");
    }

    #[test]
    fn test_missing_key_is_none() {
        assert!(extract_assertion("#foo=bar").is_none());
        assert!(extract_assertion("").is_none());
        assert!(extract_assertion("#").is_none());
        assert!(extract_assertion("#id_token=").is_none());
    }

    #[test]
    fn test_leading_hash_is_optional() {
        let token = extract_assertion("foo=bar&id_token=xyz").unwrap();
        assert_eq!(token.as_str(), "xyz");
    }

    #[test]
    fn test_first_value_wins() {
        let token = extract_assertion("#id_token=one&id_token=two").unwrap();
        assert_eq!(token.as_str(), "one");
    }

    #[test]
    fn test_value_is_percent_decoded() {
        let token = extract_assertion("#id_token=a%2Eb%2Ec&x=1").unwrap();
        assert_eq!(token.as_str(), "a.b.c");
    }

    #[test]
    fn test_only_leading_hash_stripped() {
        // A second '#' belongs to the key.
        assert!(extract_assertion("##id_token=abc").is_none());
    }

    #[test]
    fn test_require_assertion() {
        assert_eq!(
            require_assertion("#state=1").unwrap_err(),
            IdentityError::MissingToken
        );
        assert_eq!(require_assertion("#id_token=t").unwrap().as_str(), "t");
    }

    #[test]
    fn test_provider_error() {
        let err =
            provider_error("#error=access_denied&error_description=User+cancelled").unwrap();
        assert_eq!(err.error, "access_denied");
        assert_eq!(err.description.as_deref(), Some("User cancelled"));
        assert_eq!(err.to_string(), "access_denied: User cancelled");

        assert!(provider_error("#id_token=abc").is_none());
        assert!(provider_error("#error=").is_none());
    }
}
