// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Capabilities the server actions need from the identity and document
//! platform.
//!
//! The actions never reach for a process-wide client; they are handed
//! trait objects so the Firebase-backed implementations can be swapped for
//! [`InMemoryPlatform`](crate::services::InMemoryPlatform) in tests and
//! local development.

use crate::models::{Interview, UserProfile};
use async_trait::async_trait;
use std::time::Duration;

/// Platform account as seen by the identity service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub disabled: bool,
    /// Sessions authenticated before this Unix timestamp are revoked.
    pub tokens_valid_after: Option<i64>,
}

/// Claims carried by a verified identity token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdTokenClaims {
    pub uid: String,
    pub email: Option<String>,
    /// When the user last entered credentials (Unix seconds).
    pub auth_time: i64,
}

/// Claims carried by a verified session artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub uid: String,
    pub email: Option<String>,
    pub auth_time: i64,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// Error kinds surfaced by platform calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    #[error("email address is already in use by another account")]
    EmailAlreadyExists,

    #[error("no account for the given identifier")]
    UserNotFound,

    #[error("account is disabled")]
    UserDisabled,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token has expired")]
    TokenExpired,

    #[error("session has been revoked")]
    SessionRevoked,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("platform unavailable: {0}")]
    Transient(String),
}

impl PlatformError {
    /// Stable error code, mirroring the platform's `auth/...` codes.
    pub fn code(&self) -> &'static str {
        match self {
            PlatformError::EmailAlreadyExists => "auth/email-already-exists",
            PlatformError::UserNotFound => "auth/user-not-found",
            PlatformError::UserDisabled => "auth/user-disabled",
            PlatformError::InvalidToken(_) => "auth/argument-error",
            PlatformError::TokenExpired => "auth/session-cookie-expired",
            PlatformError::SessionRevoked => "auth/session-cookie-revoked",
            PlatformError::InvalidArgument(_) => "auth/invalid-argument",
            PlatformError::Database(_) => "firestore/internal",
            PlatformError::Transient(_) => "auth/internal-error",
        }
    }
}

/// Identity side of the platform: accounts, identity tokens, sessions.
#[async_trait]
pub trait IdentityPlatform: Send + Sync {
    /// Look up an account by uid.
    async fn get_user(&self, uid: &str) -> Result<Option<AccountRecord>, PlatformError>;

    /// Look up an account by email.
    async fn get_user_by_email(&self, email: &str)
        -> Result<Option<AccountRecord>, PlatformError>;

    /// Exchange an identity token for a session artifact valid for `expires_in`.
    async fn create_session_cookie(
        &self,
        id_token: &str,
        expires_in: Duration,
    ) -> Result<String, PlatformError>;

    /// Verify a session artifact, optionally checking for revocation.
    async fn verify_session_cookie(
        &self,
        session_cookie: &str,
        check_revoked: bool,
    ) -> Result<SessionClaims, PlatformError>;
}

/// Document side of the platform: the `users` collection.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_user(&self, uid: &str) -> Result<Option<UserProfile>, PlatformError>;

    async fn set_user(&self, uid: &str, profile: &UserProfile) -> Result<(), PlatformError>;
}

/// Read queries backing the home page.
#[async_trait]
pub trait InterviewQueries: Send + Sync {
    /// Interviews owned by `uid`, newest first.
    async fn interviews_by_user(&self, uid: &str) -> Result<Vec<Interview>, PlatformError>;

    /// Finalized interviews created by other users, newest first.
    async fn latest_interviews(
        &self,
        uid: &str,
        limit: usize,
    ) -> Result<Vec<Interview>, PlatformError>;
}

/// Account checks shared by session exchange and session verification:
/// the account must exist and be enabled, and any revocation must not be
/// newer than `auth_time`.
pub fn check_account_for_session(
    account: Option<AccountRecord>,
    auth_time: i64,
) -> Result<(), PlatformError> {
    let account = account.ok_or(PlatformError::UserNotFound)?;

    if account.disabled {
        return Err(PlatformError::UserDisabled);
    }

    if let Some(valid_after) = account.tokens_valid_after {
        if auth_time < valid_after {
            return Err(PlatformError::SessionRevoked);
        }
    }

    Ok(())
}
