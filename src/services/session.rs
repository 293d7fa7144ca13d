// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session artifacts: HS256 JWTs minted from a verified identity token.

use crate::services::platform::{IdTokenClaims, PlatformError, SessionClaims};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Session validity window: one week, in milliseconds.
pub const SESSION_DURATION_MS: u64 = 7 * 24 * 60 * 60 * 1000;

/// Session validity window.
pub const SESSION_DURATION: Duration = Duration::from_millis(SESSION_DURATION_MS);

const MIN_SESSION_DURATION: Duration = Duration::from_secs(5 * 60);
const MAX_SESSION_DURATION: Duration = Duration::from_secs(14 * 24 * 60 * 60);

/// An identity token older than this can no longer be exchanged.
const RECENT_SIGN_IN_WINDOW_SECS: i64 = 5 * 60;

const CLOCK_SKEW_SECS: i64 = 60;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    iss: String,
    sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    iat: i64,
    exp: i64,
    auth_time: i64,
}

/// Mints and verifies session artifacts with a shared signing key.
pub struct SessionSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl SessionSigner {
    pub fn new(signing_key: &[u8], issuer: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(signing_key),
            decoding_key: DecodingKey::from_secret(signing_key),
            issuer: issuer.into(),
        }
    }

    /// Mint a session artifact for a verified identity token, valid from now.
    pub fn mint(
        &self,
        identity: &IdTokenClaims,
        expires_in: Duration,
    ) -> Result<String, PlatformError> {
        self.mint_at(identity, chrono::Utc::now().timestamp(), expires_in)
    }

    /// Mint a session artifact issued at `issued_at` (Unix seconds).
    pub fn mint_at(
        &self,
        identity: &IdTokenClaims,
        issued_at: i64,
        expires_in: Duration,
    ) -> Result<String, PlatformError> {
        validate_session_duration(expires_in)?;

        let claims = Claims {
            iss: self.issuer.clone(),
            sub: identity.uid.clone(),
            email: identity.email.clone(),
            iat: issued_at,
            exp: issued_at + expires_in.as_secs() as i64,
            auth_time: identity.auth_time,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| PlatformError::Transient(format!("session signing failed: {e}")))
    }

    /// Verify signature, issuer and expiry of a session artifact.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, PlatformError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.leeway = CLOCK_SKEW_SECS as u64;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => PlatformError::TokenExpired,
                    _ => PlatformError::InvalidToken(e.to_string()),
                }
            })?;

        let claims = token_data.claims;
        if claims.sub.is_empty() {
            return Err(PlatformError::InvalidToken("empty subject".to_string()));
        }

        Ok(SessionClaims {
            uid: claims.sub,
            email: claims.email,
            auth_time: claims.auth_time,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }
}

/// Issuer claim stamped on session artifacts for a project.
pub fn session_issuer(project_id: &str) -> String {
    format!("https://session.mockmind.app/{project_id}")
}

/// Session lifetimes are bounded to five minutes through two weeks.
pub fn validate_session_duration(expires_in: Duration) -> Result<(), PlatformError> {
    if expires_in < MIN_SESSION_DURATION || expires_in > MAX_SESSION_DURATION {
        return Err(PlatformError::InvalidArgument(format!(
            "session duration must be between 5 minutes and 2 weeks, got {}s",
            expires_in.as_secs()
        )));
    }
    Ok(())
}

/// Only identity tokens from a recent sign-in may be exchanged for a session.
pub fn require_recent_sign_in(identity: &IdTokenClaims, now: i64) -> Result<(), PlatformError> {
    if identity.auth_time > now + CLOCK_SKEW_SECS {
        return Err(PlatformError::InvalidToken(
            "auth_time is in the future".to_string(),
        ));
    }
    if now - identity.auth_time > RECENT_SIGN_IN_WINDOW_SECS {
        return Err(PlatformError::InvalidToken(
            "recent sign-in required".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test_session_key_32_bytes_long!!";

    fn identity(auth_time: i64) -> IdTokenClaims {
        IdTokenClaims {
            uid: "u1".to_string(),
            email: Some("ada@x.com".to_string()),
            auth_time,
        }
    }

    #[test]
    fn session_duration_is_one_week() {
        assert_eq!(SESSION_DURATION_MS, 604_800_000);
        assert_eq!(SESSION_DURATION.as_secs(), 604_800);
    }

    #[test]
    fn mint_then_verify() {
        let signer = SessionSigner::new(KEY, "mockmind");
        let now = chrono::Utc::now().timestamp();
        let token = signer.mint(&identity(now), SESSION_DURATION).unwrap();

        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.uid, "u1");
        assert_eq!(claims.email.as_deref(), Some("ada@x.com"));
        assert_eq!(claims.auth_time, now);
        assert_eq!(claims.expires_at - claims.issued_at, 604_800);
    }

    #[test]
    fn expired_session_is_rejected() {
        let signer = SessionSigner::new(KEY, "mockmind");
        let eight_days_ago = chrono::Utc::now().timestamp() - 8 * 24 * 60 * 60;
        let token = signer
            .mint_at(&identity(eight_days_ago), eight_days_ago, SESSION_DURATION)
            .unwrap();

        assert_eq!(signer.verify(&token), Err(PlatformError::TokenExpired));
    }

    #[test]
    fn wrong_key_or_issuer_is_rejected() {
        let signer = SessionSigner::new(KEY, "mockmind");
        let token = signer
            .mint(&identity(chrono::Utc::now().timestamp()), SESSION_DURATION)
            .unwrap();

        let other_key = SessionSigner::new(b"another_key_that_is_long_enough!", "mockmind");
        assert!(matches!(
            other_key.verify(&token),
            Err(PlatformError::InvalidToken(_))
        ));

        let other_issuer = SessionSigner::new(KEY, "someone-else");
        assert!(matches!(
            other_issuer.verify(&token),
            Err(PlatformError::InvalidToken(_))
        ));

        assert!(matches!(
            signer.verify("not-a-jwt"),
            Err(PlatformError::InvalidToken(_))
        ));
    }

    #[test]
    fn duration_bounds() {
        assert!(validate_session_duration(Duration::from_secs(60)).is_err());
        assert!(validate_session_duration(Duration::from_secs(15 * 24 * 60 * 60)).is_err());
        assert!(validate_session_duration(SESSION_DURATION).is_ok());
    }

    #[test]
    fn stale_sign_in_cannot_be_exchanged() {
        let now = 1_700_000_000;
        assert!(require_recent_sign_in(&identity(now - 30), now).is_ok());
        assert!(require_recent_sign_in(&identity(now - 600), now).is_err());
        assert!(require_recent_sign_in(&identity(now + 3600), now).is_err());
    }
}
