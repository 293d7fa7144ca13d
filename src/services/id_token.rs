// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase ID token verification.
//!
//! ID tokens are RS256 JWTs signed by `securetoken@system.gserviceaccount.com`.
//! Public keys are fetched from the JWKS endpoint and cached for the
//! `max-age` the endpoint advertises.

use crate::services::platform::{IdTokenClaims, PlatformError};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

const SECURETOKEN_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
const CLOCK_SKEW_SECS: u64 = 60;

#[derive(Clone)]
enum VerifierMode {
    Google,
    StaticKey {
        kid: String,
        decoding_key: Arc<DecodingKey>,
    },
    /// The Auth emulator issues unsigned tokens.
    Emulator,
}

#[derive(Clone)]
struct JwksCacheEntry {
    keys_by_kid: HashMap<String, Arc<DecodingKey>>,
    expires_at: Instant,
}

/// Verifier for ID tokens issued to a single Firebase project.
pub struct IdTokenVerifier {
    http_client: reqwest::Client,
    project_id: String,
    mode: VerifierMode,
    jwks_cache: RwLock<Option<JwksCacheEntry>>,
    refresh_lock: Mutex<()>,
}

impl IdTokenVerifier {
    /// Create a production verifier that fetches and caches Google's keys.
    pub fn new(project_id: &str) -> anyhow::Result<Self> {
        Self::with_mode(project_id, VerifierMode::Google)
    }

    /// Create a verifier with a static RSA public key, for tests.
    pub fn new_with_static_key(
        project_id: &str,
        kid: impl Into<String>,
        decoding_key: DecodingKey,
    ) -> anyhow::Result<Self> {
        let kid = kid.into();
        if kid.trim().is_empty() {
            anyhow::bail!("static ID token kid must not be empty");
        }
        Self::with_mode(
            project_id,
            VerifierMode::StaticKey {
                kid,
                decoding_key: Arc::new(decoding_key),
            },
        )
    }

    /// Create a verifier for Auth emulator tokens (no signature check).
    pub fn new_for_emulator(project_id: &str) -> anyhow::Result<Self> {
        tracing::warn!("ID token signatures are not checked (Auth emulator)");
        Self::with_mode(project_id, VerifierMode::Emulator)
    }

    fn with_mode(project_id: &str, mode: VerifierMode) -> anyhow::Result<Self> {
        use anyhow::Context;

        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building JWKS HTTP client")?;

        Ok(Self {
            http_client,
            project_id: project_id.to_string(),
            mode,
            jwks_cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    fn expected_issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.project_id)
    }

    /// Verify an ID token and return the identity it proves.
    pub async fn verify(&self, token: &str) -> Result<IdTokenClaims, PlatformError> {
        if token.is_empty() {
            return Err(PlatformError::InvalidToken("ID token is empty".to_string()));
        }

        let claims = match &self.mode {
            VerifierMode::Emulator => decode_unsigned(token)?,
            _ => self.verify_signed(token).await?,
        };

        self.check_claims(claims)
    }

    async fn verify_signed(&self, token: &str) -> Result<FirebaseIdTokenClaims, PlatformError> {
        let header = decode_header(token)
            .map_err(|e| PlatformError::InvalidToken(format!("invalid JWT header: {e}")))?;

        if header.alg != Algorithm::RS256 {
            return Err(PlatformError::InvalidToken(format!(
                "unexpected JWT alg: {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| PlatformError::InvalidToken("missing JWT kid".to_string()))?;

        let decoding_key = self.decoding_key_for_kid(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.set_issuer(&[self.expected_issuer()]);
        validation.set_audience(&[self.project_id.as_str()]);
        validation.leeway = CLOCK_SKEW_SECS;

        decode::<FirebaseIdTokenClaims>(token, decoding_key.as_ref(), &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => PlatformError::TokenExpired,
                _ => PlatformError::InvalidToken(format!("JWT validation failed: {e}")),
            })
    }

    fn check_claims(&self, claims: FirebaseIdTokenClaims) -> Result<IdTokenClaims, PlatformError> {
        // Signed tokens had these checked by jsonwebtoken already; emulator
        // tokens did not.
        if claims.aud != self.project_id {
            return Err(PlatformError::InvalidToken(format!(
                "unexpected audience: {}",
                claims.aud
            )));
        }
        if claims.iss != self.expected_issuer() {
            return Err(PlatformError::InvalidToken(format!(
                "unexpected issuer: {}",
                claims.iss
            )));
        }
        if claims.sub.is_empty() || claims.sub.len() > 128 {
            return Err(PlatformError::InvalidToken(
                "sub must be 1 to 128 characters".to_string(),
            ));
        }

        let now = chrono::Utc::now().timestamp();
        let skew = CLOCK_SKEW_SECS as i64;
        let exp = claims
            .exp
            .ok_or_else(|| PlatformError::InvalidToken("missing exp".to_string()))?;
        if exp + skew < now {
            return Err(PlatformError::TokenExpired);
        }
        if claims.iat.is_some_and(|iat| iat > now + skew) {
            return Err(PlatformError::InvalidToken(
                "iat is in the future".to_string(),
            ));
        }
        if claims.auth_time > now + skew {
            return Err(PlatformError::InvalidToken(
                "auth_time is in the future".to_string(),
            ));
        }

        tracing::debug!(
            uid = %claims.sub,
            email = claims.email.as_deref().unwrap_or("<missing>"),
            auth_time = claims.auth_time,
            "ID token verified"
        );

        Ok(IdTokenClaims {
            uid: claims.sub,
            email: claims.email,
            auth_time: claims.auth_time,
        })
    }

    async fn decoding_key_for_kid(&self, kid: &str) -> Result<Arc<DecodingKey>, PlatformError> {
        if let VerifierMode::StaticKey {
            kid: static_kid,
            decoding_key,
        } = &self.mode
        {
            if kid == static_kid {
                return Ok(decoding_key.clone());
            }
            return Err(PlatformError::InvalidToken(format!(
                "unknown JWT kid for static verifier: {kid}"
            )));
        }

        if let Some(key) = self.lookup_cached_key(kid).await {
            return Ok(key);
        }

        // Keys rotate; a miss forces one refresh past the cache.
        for force_refresh in [false, true] {
            self.refresh_jwks(force_refresh).await?;
            if let Some(key) = self.lookup_cached_key(kid).await {
                return Ok(key);
            }
        }

        Err(PlatformError::InvalidToken(format!(
            "JWT kid not found in JWKS after refresh: {kid}"
        )))
    }

    async fn lookup_cached_key(&self, kid: &str) -> Option<Arc<DecodingKey>> {
        let cache = self.jwks_cache.read().await;
        let now = Instant::now();
        cache
            .as_ref()
            .filter(|entry| entry.expires_at > now)
            .and_then(|entry| entry.keys_by_kid.get(kid))
            .cloned()
    }

    async fn refresh_jwks(&self, force_refresh: bool) -> Result<(), PlatformError> {
        let _guard = self.refresh_lock.lock().await;

        if !force_refresh {
            let cache = self.jwks_cache.read().await;
            if cache
                .as_ref()
                .is_some_and(|entry| entry.expires_at > Instant::now())
            {
                return Ok(());
            }
        }

        tracing::debug!(jwks_uri = SECURETOKEN_JWKS_URL, "Refreshing ID token JWKS cache");

        let response = self
            .http_client
            .get(SECURETOKEN_JWKS_URL)
            .send()
            .await
            .map_err(|e| PlatformError::Transient(format!("JWKS request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(PlatformError::Transient(format!(
                "JWKS request returned status {}",
                response.status()
            )));
        }

        let ttl = cache_ttl_from_headers(response.headers(), DEFAULT_CACHE_TTL);

        let jwks: Jwks = response
            .json()
            .await
            .map_err(|e| PlatformError::Transient(format!("invalid JWKS JSON: {e}")))?;

        let keys_by_kid = usable_keys(jwks);
        if keys_by_kid.is_empty() {
            return Err(PlatformError::Transient(
                "JWKS response did not include any usable RSA keys".to_string(),
            ));
        }

        *self.jwks_cache.write().await = Some(JwksCacheEntry {
            keys_by_kid,
            expires_at: Instant::now() + ttl,
        });

        tracing::debug!(ttl_secs = ttl.as_secs(), "ID token JWKS cache refreshed");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    alg: Option<String>,
    n: String,
    e: String,
    #[serde(rename = "use")]
    use_: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FirebaseIdTokenClaims {
    iss: String,
    aud: String,
    sub: String,
    #[serde(default)]
    auth_time: i64,
    exp: Option<i64>,
    iat: Option<i64>,
    email: Option<String>,
}

fn usable_keys(jwks: Jwks) -> HashMap<String, Arc<DecodingKey>> {
    let mut keys_by_kid = HashMap::new();

    for jwk in jwks.keys {
        if jwk.kty != "RSA" || jwk.kid.trim().is_empty() {
            continue;
        }
        if jwk.alg.as_deref().is_some_and(|alg| alg != "RS256") {
            continue;
        }
        if jwk.use_.as_deref().is_some_and(|use_| use_ != "sig") {
            continue;
        }

        match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
            Ok(key) => {
                keys_by_kid.insert(jwk.kid, Arc::new(key));
            }
            Err(e) => {
                tracing::warn!(error = %e, kid = %jwk.kid, "Skipping invalid RSA JWKS key");
            }
        }
    }

    keys_by_kid
}

/// Decode the payload of an unsigned emulator token.
fn decode_unsigned(token: &str) -> Result<FirebaseIdTokenClaims, PlatformError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| PlatformError::InvalidToken("malformed JWT".to_string()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| PlatformError::InvalidToken(format!("invalid JWT payload: {e}")))?;
    let claims: FirebaseIdTokenClaims = serde_json::from_slice(&bytes)
        .map_err(|e| PlatformError::InvalidToken(format!("invalid JWT claims: {e}")))?;
    Ok(claims)
}

fn cache_ttl_from_headers(headers: &reqwest::header::HeaderMap, fallback: Duration) -> Duration {
    headers
        .get(CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_cache_control_max_age)
        .map(Duration::from_secs)
        .unwrap_or(fallback)
}

fn parse_cache_control_max_age(value: &str) -> Option<u64> {
    value.split(',').find_map(|directive| {
        directive
            .trim()
            .strip_prefix("max-age=")
            .and_then(|raw| raw.trim_matches('"').parse::<u64>().ok())
    })
}
