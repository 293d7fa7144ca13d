//! Application configuration loaded from environment variables.
//!
//! Loaded once at startup. A `.env` file is honored for local development.

use std::env;
use std::str::FromStr;

/// Which platform backs identity and documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformMode {
    /// Firebase Authentication + Cloud Firestore
    Firebase,
    /// In-process maps; nothing survives a restart
    Memory,
}

impl FromStr for PlatformMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firebase" => Ok(PlatformMode::Firebase),
            "memory" => Ok(PlatformMode::Memory),
            _ => Err(ConfigError::Invalid("PLATFORM", s.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Server port
    pub port: u16,
    /// Production deployment; gates the `Secure` cookie attribute
    pub production: bool,
    /// Firebase / GCP project ID
    pub project_id: String,
    /// Firebase web API key (public; used by form clients)
    pub firebase_api_key: Option<String>,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Where anonymous visitors and signed-out users are sent
    pub sign_in_path: String,
    pub platform: PlatformMode,
    /// Auth emulator host:port, when running against the emulator
    pub auth_emulator_host: Option<String>,

    // --- Secrets ---
    /// HS256 key for session artifacts (raw bytes)
    pub session_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let project_id = env::var("FIREBASE_PROJECT_ID")
            .or_else(|_| env::var("GCP_PROJECT_ID"))
            .unwrap_or_else(|_| "local-dev".to_string());

        let session_signing_key = env::var("SESSION_SIGNING_KEY")
            .map_err(|_| ConfigError::Missing("SESSION_SIGNING_KEY"))?
            .trim()
            .as_bytes()
            .to_vec();
        if session_signing_key.len() < 32 {
            return Err(ConfigError::Invalid(
                "SESSION_SIGNING_KEY",
                "must be at least 32 bytes".to_string(),
            ));
        }

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            production: env::var("APP_ENV")
                .map(|v| v.eq_ignore_ascii_case("production"))
                .unwrap_or(false),
            project_id,
            firebase_api_key: env::var("FIREBASE_API_KEY").ok(),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            sign_in_path: validate_sign_in_path(
                env::var("SIGN_IN_PATH").unwrap_or_else(|_| "/sign-in".to_string()),
            )?,
            platform: env::var("PLATFORM")
                .unwrap_or_else(|_| "firebase".to_string())
                .parse()?,
            auth_emulator_host: env::var("FIREBASE_AUTH_EMULATOR_HOST").ok(),
            session_signing_key,
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            production: false,
            project_id: "test-project".to_string(),
            firebase_api_key: None,
            frontend_url: "http://localhost:3000".to_string(),
            sign_in_path: "/sign-in".to_string(),
            platform: PlatformMode::Memory,
            auth_emulator_host: None,
            session_signing_key: b"test_session_key_32_bytes_long!!".to_vec(),
        }
    }
}

/// The sign-in path becomes a `Location` header value.
fn validate_sign_in_path(path: String) -> Result<String, ConfigError> {
    axum::http::HeaderValue::from_str(&path).map_err(|_| {
        ConfigError::Invalid("SIGN_IN_PATH", format!("not a valid header value: {path:?}"))
    })?;
    Ok(path)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
