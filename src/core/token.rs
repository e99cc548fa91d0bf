//! Short-lived signed tokens for providers that authenticate with
//! `id.secret` keys instead of a bearer key.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

use crate::error::TokenError;

/// Lifetime of a signed token.
pub const TOKEN_TTL: Duration = Duration::seconds(3600);

/// Claims carried by the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Key id (the part before the dot).
    pub api_key: String,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
    /// Issue time, milliseconds since the epoch.
    pub timestamp: i64,
}

/// A token together with the instant it stops being accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Split an `id.secret` key.
///
/// # Errors
///
/// Returns [`TokenError::InvalidFormat`] unless the key contains exactly one
/// dot with non-empty text on both sides.
pub fn split_key(api_key: &str) -> Result<(&str, &str), TokenError> {
    let mut parts = api_key.split('.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(id), Some(secret), None) if !id.is_empty() && !secret.is_empty() => {
            Ok((id, secret))
        }
        _ => Err(TokenError::InvalidFormat),
    }
}

/// Sign an HS256 token for key `id` with `secret`, valid for [`TOKEN_TTL`]
/// from `now`.
///
/// # Errors
///
/// Returns [`TokenError::Signing`] if the signing backend fails.
pub fn sign(id: &str, secret: &str, now: DateTime<Utc>) -> Result<SignedToken, TokenError> {
    let expires_at = now + TOKEN_TTL;
    let claims = Claims {
        api_key: id.to_string(),
        exp: expires_at.timestamp(),
        timestamp: now.timestamp_millis(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(SignedToken { token, expires_at })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use jsonwebtoken::{DecodingKey, Validation, decode};

    #[test]
    fn split_key_requires_exactly_one_dot() {
        assert_eq!(split_key("abc.def").unwrap(), ("abc", "def"));
        assert!(split_key("abcdef").is_err());
        assert!(split_key("a.b.c").is_err());
        assert!(split_key(".def").is_err());
        assert!(split_key("abc.").is_err());
        assert!(split_key("").is_err());
    }

    #[test]
    fn signed_token_decodes_with_secret() {
        let now = Utc::now();
        let signed = sign("my-id", "my-secret", now).unwrap();

        let decoded = decode::<Claims>(
            &signed.token,
            &DecodingKey::from_secret(b"my-secret"),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();

        assert_eq!(decoded.header.alg, Algorithm::HS256);
        assert_eq!(decoded.claims.api_key, "my-id");
        assert_eq!(decoded.claims.exp, now.timestamp() + 3600);
        assert_eq!(decoded.claims.timestamp, now.timestamp_millis());
    }

    #[test]
    fn token_expires_after_ttl() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let signed = sign("id", "secret", now).unwrap();
        assert_eq!(signed.expires_at, now + TOKEN_TTL);
        assert_eq!(signed.expires_at, now + Duration::minutes(60));
    }

    #[test]
    fn same_inputs_sign_identically() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let a = sign("id", "secret", now).unwrap();
        let b = sign("id", "secret", now).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.token, sign("id", "other", now).unwrap().token);
    }
}
