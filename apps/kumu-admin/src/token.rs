//! Reading the claims of a stored JWT.
//!
//! The signature is not checked; the server does that. The console only
//! reads `sub`, `email` and `exp` to show who is logged in and to warn
//! before sending a token that has already expired.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is not a JWT (expected three dot-separated parts)")]
    Shape,
    #[error("token payload is not base64url: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("token payload is not JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The claims the console displays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    /// Expiry, seconds since the Unix epoch.
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub iat: Option<i64>,
}

impl TokenClaims {
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// Tokens without `exp` never count as expired.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|at| at <= now)
    }
}

/// Decode the payload segment of `token`.
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Shape);
    };
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Expiry of `token`, if it is a JWT carrying `exp`.
#[must_use]
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    decode_claims(token).ok().and_then(|c| c.expires_at())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::TimeZone;

    fn jwt(payload: &str) -> String {
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn reads_claims() {
        let token = jwt(r#"{"sub":"u1","email":"admin@kumu.app","exp":1717200000}"#);
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("u1"));
        assert_eq!(claims.email.as_deref(), Some("admin@kumu.app"));
        assert_eq!(
            claims.expires_at(),
            Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn expiry_check() {
        let token = jwt(r#"{"exp":1000}"#);
        let claims = decode_claims(&token).unwrap();
        assert!(claims.is_expired(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));

        let open = decode_claims(&jwt(r#"{"sub":"x"}"#)).unwrap();
        assert!(!open.is_expired(Utc::now()));
        assert!(token_expiry(&jwt(r#"{"sub":"x"}"#)).is_none());
    }

    #[test]
    fn rejects_non_jwt() {
        assert!(matches!(decode_claims("opaque"), Err(TokenError::Shape)));
        assert!(matches!(decode_claims("a.b.c.d"), Err(TokenError::Shape)));
        assert!(matches!(decode_claims("a.!!!.c"), Err(TokenError::Base64(_))));
        assert!(token_expiry("opaque").is_none());
    }
}
