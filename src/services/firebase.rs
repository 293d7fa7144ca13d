// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase Authentication backed identity platform.
//!
//! Account lookups go through the Identity Toolkit REST API, authenticated
//! with application default credentials. Against the Auth emulator
//! (`FIREBASE_AUTH_EMULATOR_HOST`) the `owner` bearer token is used instead.

use crate::config::Config;
use crate::services::id_token::IdTokenVerifier;
use crate::services::platform::{
    check_account_for_session, AccountRecord, IdentityPlatform, PlatformError, SessionClaims,
};
use crate::services::session::{
    require_recent_sign_in, session_issuer, validate_session_duration, SessionSigner,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);
const ADMIN_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/cloud-platform",
    "https://www.googleapis.com/auth/identitytoolkit",
];

enum AdminCredentials {
    Google(gcloud_sdk::GoogleAuthTokenGenerator),
    EmulatorOwner,
}

/// Identity platform backed by a Firebase project.
pub struct FirebaseAuth {
    http_client: reqwest::Client,
    project_id: String,
    base_url: String,
    credentials: AdminCredentials,
    id_tokens: IdTokenVerifier,
    sessions: SessionSigner,
}

impl FirebaseAuth {
    /// Connect to Firebase Authentication for the configured project.
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        use anyhow::Context;

        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building Identity Toolkit HTTP client")?;

        let sessions = SessionSigner::new(
            &config.session_signing_key,
            session_issuer(&config.project_id),
        );

        if let Some(host) = &config.auth_emulator_host {
            tracing::info!(host = %host, "Using Firebase Auth emulator");
            return Ok(Self {
                http_client,
                project_id: config.project_id.clone(),
                base_url: format!("http://{host}/identitytoolkit.googleapis.com"),
                credentials: AdminCredentials::EmulatorOwner,
                id_tokens: IdTokenVerifier::new_for_emulator(&config.project_id)?,
                sessions,
            });
        }

        let generator = gcloud_sdk::GoogleAuthTokenGenerator::new(
            gcloud_sdk::TokenSourceType::Default,
            ADMIN_SCOPES.iter().map(|s| s.to_string()).collect(),
        )
        .await
        .context("failed loading application default credentials")?;

        tracing::info!(project = %config.project_id, "Connected to Firebase Authentication");

        Ok(Self {
            http_client,
            project_id: config.project_id.clone(),
            base_url: IDENTITY_TOOLKIT_URL.to_string(),
            credentials: AdminCredentials::Google(generator),
            id_tokens: IdTokenVerifier::new(&config.project_id)?,
            sessions,
        })
    }

    async fn authorization(&self) -> Result<String, PlatformError> {
        match &self.credentials {
            AdminCredentials::EmulatorOwner => Ok("Bearer owner".to_string()),
            AdminCredentials::Google(generator) => generator
                .create_token()
                .await
                .map(|token| token.header_value())
                .map_err(|e| PlatformError::Transient(format!("access token: {e}"))),
        }
    }

    async fn lookup(&self, request: &LookupRequest<'_>) -> Result<Option<AccountRecord>, PlatformError> {
        let url = format!(
            "{}/v1/projects/{}/accounts:lookup",
            self.base_url, self.project_id
        );

        let response = self
            .http_client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.authorization().await?)
            .json(request)
            .send()
            .await
            .map_err(|e| PlatformError::Transient(format!("accounts:lookup failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body: ToolkitErrorBody = response.json().await.unwrap_or_default();
            return match map_toolkit_error(&body.error.message) {
                PlatformError::UserNotFound => Ok(None),
                err => {
                    tracing::warn!(status = %status, code = %body.error.message, "accounts:lookup rejected");
                    Err(err)
                }
            };
        }

        let body: LookupResponse = response
            .json()
            .await
            .map_err(|e| PlatformError::Transient(format!("invalid accounts:lookup JSON: {e}")))?;

        Ok(body.users.into_iter().next().map(AccountRecord::from))
    }
}

#[async_trait]
impl IdentityPlatform for FirebaseAuth {
    async fn get_user(&self, uid: &str) -> Result<Option<AccountRecord>, PlatformError> {
        self.lookup(&LookupRequest {
            local_id: Some([uid]),
            email: None,
        })
        .await
    }

    async fn get_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AccountRecord>, PlatformError> {
        self.lookup(&LookupRequest {
            local_id: None,
            email: Some([email]),
        })
        .await
    }

    async fn create_session_cookie(
        &self,
        id_token: &str,
        expires_in: Duration,
    ) -> Result<String, PlatformError> {
        validate_session_duration(expires_in)?;

        let identity = self.id_tokens.verify(id_token).await?;
        require_recent_sign_in(&identity, chrono::Utc::now().timestamp())?;

        let account = self.get_user(&identity.uid).await?;
        check_account_for_session(account, identity.auth_time)?;

        self.sessions.mint(&identity, expires_in)
    }

    async fn verify_session_cookie(
        &self,
        session_cookie: &str,
        check_revoked: bool,
    ) -> Result<SessionClaims, PlatformError> {
        let claims = self.sessions.verify(session_cookie)?;

        if check_revoked {
            let account = self.get_user(&claims.uid).await?;
            check_account_for_session(account, claims.auth_time)?;
        }

        Ok(claims)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    local_id: Option<[&'a str; 1]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<[&'a str; 1]>,
}

#[derive(Debug, Default, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<ToolkitUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolkitUser {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    #[serde(default)]
    disabled: bool,
    /// Unix seconds, encoded as a string.
    valid_since: Option<String>,
}

impl From<ToolkitUser> for AccountRecord {
    fn from(user: ToolkitUser) -> Self {
        AccountRecord {
            uid: user.local_id,
            email: user.email,
            display_name: user.display_name,
            disabled: user.disabled,
            tokens_valid_after: user.valid_since.and_then(|s| s.parse().ok()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ToolkitErrorBody {
    #[serde(default)]
    error: ToolkitError,
}

#[derive(Debug, Default, Deserialize)]
struct ToolkitError {
    #[serde(default)]
    message: String,
}

/// Map an Identity Toolkit error message (e.g. `EMAIL_EXISTS : ...`) to an
/// error kind.
pub(crate) fn map_toolkit_error(message: &str) -> PlatformError {
    let code = message.split([' ', ':']).next().unwrap_or_default();
    match code {
        "EMAIL_EXISTS" | "DUPLICATE_EMAIL" => PlatformError::EmailAlreadyExists,
        "USER_NOT_FOUND" | "EMAIL_NOT_FOUND" => PlatformError::UserNotFound,
        "USER_DISABLED" => PlatformError::UserDisabled,
        "TOKEN_EXPIRED" => PlatformError::TokenExpired,
        "INVALID_ID_TOKEN" => PlatformError::InvalidToken(message.to_string()),
        "INVALID_EMAIL" | "MISSING_LOCAL_ID" => PlatformError::InvalidArgument(message.to_string()),
        _ => PlatformError::Transient(message.to_string()),
    }
}
