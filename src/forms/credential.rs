// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Email/password credentials against the identity platform, as a client
//! (browser-side) sees them.

use crate::config::Config;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a successful credential creation or check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub uid: String,
    /// Short-lived identity token proving the credential check.
    pub id_token: String,
}

/// Credential failures, by kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("email already in use")]
    EmailExists,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("password rejected: {0}")]
    WeakPassword(String),

    #[error("account disabled")]
    UserDisabled,

    #[error("too many attempts")]
    TooManyAttempts,

    #[error("network error: {0}")]
    Network(String),

    #[error("identity platform error: {0}")]
    Other(String),
}

impl CredentialError {
    pub fn user_message(&self) -> &'static str {
        match self {
            CredentialError::EmailExists => "This email is already in use.",
            CredentialError::InvalidCredentials => "Incorrect email or password.",
            CredentialError::WeakPassword(_) => "Password is too weak.",
            CredentialError::UserDisabled => "This account has been disabled.",
            CredentialError::TooManyAttempts => "Too many attempts. Try again later.",
            CredentialError::Network(_) => "Network error. Check your connection.",
            CredentialError::Other(_) => "Authentication failed. Try again.",
        }
    }

    /// Map an Identity Toolkit error message (`CODE` or `CODE : detail`).
    pub fn from_toolkit_message(message: &str) -> Self {
        let (code, detail) = match message.split_once(" : ") {
            Some((code, detail)) => (code.trim(), detail.trim()),
            None => (message.trim(), ""),
        };

        match code {
            "EMAIL_EXISTS" => CredentialError::EmailExists,
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
                CredentialError::InvalidCredentials
            }
            "WEAK_PASSWORD" => CredentialError::WeakPassword(detail.to_string()),
            "USER_DISABLED" => CredentialError::UserDisabled,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => CredentialError::TooManyAttempts,
            _ => CredentialError::Other(message.to_string()),
        }
    }
}

/// Email/password operations a client performs before calling the server.
#[async_trait]
pub trait CredentialClient: Send + Sync {
    async fn create_user_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Credential, CredentialError>;

    async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Credential, CredentialError>;
}

/// Identity Toolkit REST client authenticated with the project's web API key.
pub struct IdentityToolkitClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl IdentityToolkitClient {
    pub fn new(api_key: impl Into<String>) -> anyhow::Result<Self> {
        Self::with_base_url(api_key, IDENTITY_TOOLKIT_URL)
    }

    /// Client for the configured project, honoring the Auth emulator setting.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let api_key = config
            .firebase_api_key
            .clone()
            .ok_or_else(|| anyhow::anyhow!("FIREBASE_API_KEY is not set"))?;

        match &config.auth_emulator_host {
            Some(host) => Self::for_emulator(api_key, host),
            None => Self::new(api_key),
        }
    }

    /// Client for the Auth emulator at `host` (e.g. `localhost:9099`).
    pub fn for_emulator(api_key: impl Into<String>, host: &str) -> anyhow::Result<Self> {
        Self::with_base_url(
            api_key,
            &format!("http://{host}/identitytoolkit.googleapis.com"),
        )
    }

    fn with_base_url(api_key: impl Into<String>, base_url: &str) -> anyhow::Result<Self> {
        use anyhow::Context;

        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building Identity Toolkit HTTP client")?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn password_call(
        &self,
        method: &str,
        email: &str,
        password: &str,
    ) -> Result<Credential, CredentialError> {
        let url = format!("{}/v1/accounts:{}", self.base_url, method);

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&PasswordRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| CredentialError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let body: ErrorEnvelope = response
                .json()
                .await
                .map_err(|e| CredentialError::Other(format!("unreadable error body: {e}")))?;
            tracing::debug!(method, code = %body.error.message, "Credential call rejected");
            return Err(CredentialError::from_toolkit_message(&body.error.message));
        }

        let body: PasswordResponse = response
            .json()
            .await
            .map_err(|e| CredentialError::Other(format!("invalid response JSON: {e}")))?;

        Ok(Credential {
            uid: body.local_id,
            id_token: body.id_token,
        })
    }
}

#[async_trait]
impl CredentialClient for IdentityToolkitClient {
    async fn create_user_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Credential, CredentialError> {
        self.password_call("signUp", email, password).await
    }

    async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Credential, CredentialError> {
        self.password_call("signInWithPassword", email, password)
            .await
    }
}

#[async_trait]
impl<T: CredentialClient + ?Sized> CredentialClient for std::sync::Arc<T> {
    async fn create_user_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Credential, CredentialError> {
        (**self)
            .create_user_with_email_and_password(email, password)
            .await
    }

    async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Credential, CredentialError> {
        (**self).sign_in_with_email_and_password(email, password).await
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    #[serde(default)]
    id_token: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}
