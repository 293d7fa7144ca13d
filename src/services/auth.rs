// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth server actions: sign-up, sign-in, session exchange and current-user
//! resolution.
//!
//! None of these return errors. Failures are logged and turned into an
//! [`ActionResult`], or into "no current user" on the read path.

use crate::models::{ActionResult, CurrentUser, SignInParams, SignUpParams, UserProfile};
use crate::services::platform::{DocumentStore, IdentityPlatform, PlatformError};
use crate::services::session::SESSION_DURATION;
use std::sync::Arc;

/// User-facing messages returned by the actions.
pub mod messages {
    pub const USER_EXISTS: &str = "User already exists. Please sign in instead";
    pub const ACCOUNT_CREATED: &str = "Account created successfully.";
    pub const EMAIL_IN_USE: &str = "This email is already in use.";
    pub const SIGN_UP_FAILED: &str = "Failed to create an account.";
    pub const USER_MISSING: &str = "User does not exist. Create a new account instead.";
    pub const SIGNED_IN: &str = "Signed in successfully.";
    pub const SIGN_IN_FAILED: &str = "Failed to log in.";
    pub const SIGN_OUT_FAILED: &str = "Failed to sign out. Try again.";
}

/// Outcome of a sign-in: the result shown to the user and, on success, the
/// session artifact to store in the `session` cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInOutcome {
    pub result: ActionResult,
    pub session_cookie: Option<String>,
}

impl SignInOutcome {
    fn failed(message: &str) -> Self {
        Self {
            result: ActionResult::failed(message),
            session_cookie: None,
        }
    }
}

/// The auth server actions, over injected platform handles.
#[derive(Clone)]
pub struct AuthService {
    identity: Arc<dyn IdentityPlatform>,
    store: Arc<dyn DocumentStore>,
}

impl AuthService {
    pub fn new(identity: Arc<dyn IdentityPlatform>, store: Arc<dyn DocumentStore>) -> Self {
        Self { identity, store }
    }

    /// Ensure a user document exists for a freshly created credential.
    pub async fn sign_up(&self, params: &SignUpParams) -> ActionResult {
        match self.try_sign_up(params).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(uid = %params.uid, error = %e, code = e.code(), "Error creating a user");
                match e {
                    PlatformError::EmailAlreadyExists => ActionResult::failed(messages::EMAIL_IN_USE),
                    _ => ActionResult::failed(messages::SIGN_UP_FAILED),
                }
            }
        }
    }

    async fn try_sign_up(&self, params: &SignUpParams) -> Result<ActionResult, PlatformError> {
        if self.store.get_user(&params.uid).await?.is_some() {
            tracing::info!(uid = %params.uid, "Sign-up for existing user");
            return Ok(ActionResult::failed(messages::USER_EXISTS));
        }

        let profile = UserProfile {
            name: params.name.clone(),
            email: params.email.clone(),
        };
        self.store.set_user(&params.uid, &profile).await?;

        tracing::info!(uid = %params.uid, "User document created");
        Ok(ActionResult::ok(messages::ACCOUNT_CREATED))
    }

    /// Establish a session for an existing account.
    pub async fn sign_in(&self, params: &SignInParams) -> SignInOutcome {
        let account = match self.identity.get_user_by_email(&params.email).await {
            Ok(account) => account,
            Err(e) => {
                tracing::warn!(error = %e, code = e.code(), "Account lookup failed during sign-in");
                return SignInOutcome::failed(messages::SIGN_IN_FAILED);
            }
        };

        let Some(account) = account else {
            tracing::info!("Sign-in for unknown email");
            return SignInOutcome::failed(messages::USER_MISSING);
        };

        match self.create_session_for(&account.uid, &params.id_token).await {
            Ok(session_cookie) => {
                tracing::info!(uid = %account.uid, "Session created");
                SignInOutcome {
                    result: ActionResult::ok(messages::SIGNED_IN),
                    session_cookie: Some(session_cookie),
                }
            }
            Err(e) => {
                tracing::warn!(uid = %account.uid, error = %e, code = e.code(), "Session exchange failed");
                SignInOutcome::failed(messages::SIGN_IN_FAILED)
            }
        }
    }

    /// Exchange an identity token for a one-week session artifact.
    pub async fn create_session(&self, id_token: &str) -> Result<String, PlatformError> {
        self.identity
            .create_session_cookie(id_token, SESSION_DURATION)
            .await
    }

    /// Exchange `id_token` for a session that must belong to `uid`.
    async fn create_session_for(&self, uid: &str, id_token: &str) -> Result<String, PlatformError> {
        let session_cookie = self.create_session(id_token).await?;
        let claims = self
            .identity
            .verify_session_cookie(&session_cookie, false)
            .await?;

        if claims.uid != uid {
            tracing::warn!(
                account_uid = %uid,
                token_uid = %claims.uid,
                "Identity token belongs to a different account than the email"
            );
            return Err(PlatformError::InvalidToken(
                "identity token does not match the account".to_string(),
            ));
        }
        Ok(session_cookie)
    }

    /// Resolve the user behind a session cookie value.
    ///
    /// A missing cookie, a cookie that fails verification and a uid without a
    /// user document all resolve to `None`.
    pub async fn current_user(&self, session_cookie: Option<&str>) -> Option<CurrentUser> {
        let session_cookie = session_cookie.filter(|value| !value.is_empty())?;

        match self.try_current_user(session_cookie).await {
            Ok(user) => user,
            Err(e) => {
                tracing::info!(error = %e, code = e.code(), "Session not accepted");
                None
            }
        }
    }

    async fn try_current_user(
        &self,
        session_cookie: &str,
    ) -> Result<Option<CurrentUser>, PlatformError> {
        let claims = self
            .identity
            .verify_session_cookie(session_cookie, true)
            .await?;

        let Some(profile) = self.store.get_user(&claims.uid).await? else {
            tracing::warn!(uid = %claims.uid, "Verified session has no user document");
            return Ok(None);
        };

        Ok(Some(CurrentUser::from_profile(claims.uid, profile)))
    }

    pub async fn is_authenticated(&self, session_cookie: Option<&str>) -> bool {
        self.current_user(session_cookie).await.is_some()
    }
}
