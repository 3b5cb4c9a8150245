//! # Identity Assertions
//!
//! An identity assertion is the `id_token` handed back by the OAuth
//! provider: a JWT of three dot-separated base64url segments. The binder
//! treats it as an opaque string and only passes it on whole.
//!
//! Decoding the claims is the derivation's job (it needs `iss`, `sub`,
//! `aud`) and the login flow's (it checks `nonce` and `exp`). The signature
//! segment is checked for well-formed base64url but never verified against
//! the issuer's keys.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::IdentityError;

/// An opaque signed identity token.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityAssertion(String);

impl IdentityAssertion {
    /// Wrap a token. Nothing is validated here.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split the token into its three segments and decode the claims.
    pub fn decode_claims(&self) -> Result<IdTokenClaims, IdentityError> {
        let segments: Vec<&str> = self.0.split('.').collect();
        let [header, payload, signature] = segments.as_slice() else {
            return Err(malformed(format!(
                "expected 3 segments, found {}",
                segments.len()
            )));
        };
        if header.is_empty() || payload.is_empty() || signature.is_empty() {
            return Err(malformed("empty token segment"));
        }

        let header: serde_json::Value = serde_json::from_slice(&b64_decode(header, "header")?)
            .map_err(|e| malformed(format!("header is not JSON: {}", e)))?;
        if !header.is_object() {
            return Err(malformed("header is not a JSON object"));
        }

        b64_decode(signature, "signature")?;

        let claims: IdTokenClaims = serde_json::from_slice(&b64_decode(payload, "payload")?)
            .map_err(|e| malformed(format!("invalid claims: {}", e)))?;
        if claims.audience().is_none() {
            return Err(malformed("aud claim is empty"));
        }
        Ok(claims)
    }
}

impl From<&str> for IdentityAssertion {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for IdentityAssertion {
    fn from(token: String) -> Self {
        Self::new(token)
    }
}

// Tokens are bearer credentials; keep them out of logs.
impl fmt::Debug for IdentityAssertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityAssertion(<{} bytes>)", self.0.len())
    }
}

fn b64_decode(input: &str, segment: &str) -> Result<Vec<u8>, IdentityError> {
    URL_SAFE_NO_PAD
        .decode(input)
        .map_err(|e| malformed(format!("{} is not base64url: {}", segment, e)))
}

fn malformed(reason: impl Into<String>) -> IdentityError {
    IdentityError::MalformedAssertion(reason.into())
}

// ---------------------------------------------------------------------------
// Claims
// ---------------------------------------------------------------------------

/// The `aud` claim: a single client id or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Multiple(Vec<String>),
}

/// The identity claims the binder cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    pub iss: String,
    pub sub: String,
    pub aud: Audience,
    #[serde(default)]
    pub nonce: Option<String>,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
}

impl IdTokenClaims {
    /// The audience used for derivation: the single value, or the first of
    /// a list. An empty string counts as no audience.
    pub fn audience(&self) -> Option<&str> {
        let aud = match &self.aud {
            Audience::Single(aud) => Some(aud.as_str()),
            Audience::Multiple(auds) => auds.first().map(String::as_str),
        };
        aud.filter(|aud| !aud.is_empty())
    }

    /// Tokens without an `exp` claim never expire.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.exp, Some(exp) if exp <= now.timestamp())
    }

    pub fn check_expiry(&self, now: DateTime<Utc>) -> Result<(), IdentityError> {
        match self.exp {
            Some(exp) if self.is_expired_at(now) => Err(IdentityError::Expired {
                exp,
                now: now.timestamp(),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn encode_token(header: &str, payload: &str, signature: &[u8]) -> String {
        format!(
            "{}.{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload),
            URL_SAFE_NO_PAD.encode(signature)
        )
    }

    pub(crate) const HEADER: &str = r#"{"alg":"RS256","kid":"test","typ":"JWT"}"#;

    #[test]
    fn test_decode_claims() {
        let token = encode_token(
            HEADER,
            r#"{"iss":"https://accounts.google.com","sub":"42","aud":"client","nonce":"n","exp":10,"email":"a@b.c"}"#,
            b"sig",
        );
        let claims = IdentityAssertion::new(token).decode_claims().unwrap();
        assert_eq!(claims.iss, "https://accounts.google.com");
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.audience(), Some("client"));
        assert_eq!(claims.nonce.as_deref(), Some("n"));
        assert_eq!(claims.exp, Some(10));
        assert_eq!(claims.email.as_deref(), Some("a@b.c"));
    }

    #[test]
    fn test_audience_list_uses_first() {
        let token = encode_token(
            HEADER,
            r#"{"iss":"i","sub":"s","aud":["first","second"]}"#,
            b"sig",
        );
        let claims = IdentityAssertion::new(token).decode_claims().unwrap();
        assert_eq!(claims.audience(), Some("first"));
        assert!(claims.nonce.is_none());
    }

    #[test]
    fn test_empty_audience_list_is_malformed() {
        let token = encode_token(HEADER, r#"{"iss":"i","sub":"s","aud":[]}"#, b"sig");
        assert!(matches!(
            IdentityAssertion::new(token).decode_claims(),
            Err(IdentityError::MalformedAssertion(_))
        ));
    }

    #[test]
    fn test_empty_audience_string_is_malformed() {
        for aud in [r#""""#, r#"[""]"#, r#"["","second"]"#] {
            let token = encode_token(
                HEADER,
                &format!(r#"{{"iss":"i","sub":"s","aud":{}}}"#, aud),
                b"sig",
            );
            assert!(
                matches!(
                    IdentityAssertion::new(token).decode_claims(),
                    Err(IdentityError::MalformedAssertion(_))
                ),
                "aud {aud} should be malformed"
            );
        }
    }

    #[test]
    fn test_wrong_segment_count() {
        for token in ["", "abc", "a.b", "a.b.c.d"] {
            assert!(
                matches!(
                    IdentityAssertion::new(token).decode_claims(),
                    Err(IdentityError::MalformedAssertion(_))
                ),
                "{token:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_empty_segment() {
        let token = format!("{}..{}", URL_SAFE_NO_PAD.encode(HEADER), "c2ln");
        assert!(matches!(
            IdentityAssertion::new(token).decode_claims(),
            Err(IdentityError::MalformedAssertion(_))
        ));
    }

    #[test]
    fn test_bad_base64_and_missing_claims() {
        let bad_b64 = format!("{}.!!!.c2ln", URL_SAFE_NO_PAD.encode(HEADER));
        assert!(IdentityAssertion::new(bad_b64).decode_claims().is_err());

        let missing_sub = encode_token(HEADER, r#"{"iss":"i","aud":"a"}"#, b"sig");
        assert!(IdentityAssertion::new(missing_sub).decode_claims().is_err());

        let header_not_object = encode_token("[1,2]", r#"{"iss":"i","sub":"s","aud":"a"}"#, b"s");
        assert!(IdentityAssertion::new(header_not_object)
            .decode_claims()
            .is_err());
    }

    #[test]
    fn test_expiry() {
        let claims = IdTokenClaims {
            iss: "i".into(),
            sub: "s".into(),
            aud: Audience::Single("a".into()),
            nonce: None,
            iat: None,
            exp: Some(1_700_000_000),
            email: None,
        };
        let before = Utc.timestamp_opt(1_699_999_999, 0).unwrap();
        let after = Utc.timestamp_opt(1_700_000_001, 0).unwrap();
        assert!(!claims.is_expired_at(before));
        assert!(claims.is_expired_at(after));
        assert!(claims.check_expiry(before).is_ok());
        // Expiry is inclusive: a token is dead at exactly `exp`.
        let at_exp = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert!(claims.is_expired_at(at_exp));
        assert!(claims.check_expiry(at_exp).is_err());
        assert_eq!(
            claims.check_expiry(after),
            Err(IdentityError::Expired {
                exp: 1_700_000_000,
                now: 1_700_000_001
            })
        );

        let no_exp = IdTokenClaims { exp: None, ..claims };
        assert!(!no_exp.is_expired_at(after));
    }

    #[test]
    fn test_debug_hides_token() {
        let assertion = IdentityAssertion::new("secret.token.value");
        assert!(!format!("{:?}", assertion).contains("secret"));
    }
}
