// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Submission flow for the auth form.

use crate::forms::credential::CredentialClient;
use crate::forms::schema::{validate, AuthFormInput, FormError, FormType, ValidatedForm};
use crate::middleware::session::SESSION_COOKIE;
use crate::models::{ActionResult, SignInParams, SignUpParams};
use crate::services::auth::{AuthService, SignInOutcome};
use async_trait::async_trait;
use std::time::Duration;

/// Where to go and what to tell the user after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormOutcome {
    pub notice: &'static str,
    pub navigate_to: &'static str,
    /// Session artifact, when the submission signed the user in.
    pub session_cookie: Option<String>,
}

/// The server actions, as seen from the form.
#[async_trait]
pub trait AuthActions: Send + Sync {
    async fn sign_up(&self, params: SignUpParams) -> Result<ActionResult, FormError>;

    async fn sign_in(&self, params: SignInParams) -> Result<SignInOutcome, FormError>;
}

#[async_trait]
impl AuthActions for AuthService {
    async fn sign_up(&self, params: SignUpParams) -> Result<ActionResult, FormError> {
        Ok(AuthService::sign_up(self, &params).await)
    }

    async fn sign_in(&self, params: SignInParams) -> Result<SignInOutcome, FormError> {
        Ok(AuthService::sign_in(self, &params).await)
    }
}

/// Server actions reached over the HTTP API.
pub struct HttpAuthActions {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpAuthActions {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        use anyhow::Context;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .cookie_store(true)
            .build()
            .context("failed building auth API HTTP client")?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post<T: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, FormError> {
        self.http_client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(|e| FormError::Transport(e.to_string()))
    }
}

#[async_trait]
impl AuthActions for HttpAuthActions {
    async fn sign_up(&self, params: SignUpParams) -> Result<ActionResult, FormError> {
        self.post("/api/auth/sign-up", &params)
            .await?
            .json()
            .await
            .map_err(|e| FormError::Transport(e.to_string()))
    }

    async fn sign_in(&self, params: SignInParams) -> Result<SignInOutcome, FormError> {
        let response = self.post("/api/auth/sign-in", &params).await?;

        let session_cookie = response
            .cookies()
            .find(|cookie| cookie.name() == SESSION_COOKIE && !cookie.value().is_empty())
            .map(|cookie| cookie.value().to_string());

        let result: ActionResult = response
            .json()
            .await
            .map_err(|e| FormError::Transport(e.to_string()))?;

        Ok(SignInOutcome {
            result,
            session_cookie,
        })
    }
}

/// Drives a form submission from raw input to a navigation decision.
pub struct AuthFormController<C, A> {
    credentials: C,
    actions: A,
}

impl<C: CredentialClient, A: AuthActions> AuthFormController<C, A> {
    pub fn new(credentials: C, actions: A) -> Self {
        Self {
            credentials,
            actions,
        }
    }

    pub async fn submit(
        &self,
        form_type: FormType,
        input: &AuthFormInput,
    ) -> Result<FormOutcome, FormError> {
        let outcome = match validate(form_type, input)? {
            ValidatedForm::SignUp {
                name,
                email,
                password,
            } => self.sign_up(name, email, password).await,
            ValidatedForm::SignIn { email, password } => self.sign_in(email, password).await,
        };

        if let Err(e) = &outcome {
            tracing::info!(?form_type, error = %e, "Auth form submission failed");
        }
        outcome
    }

    async fn sign_up(
        &self,
        name: String,
        email: String,
        password: String,
    ) -> Result<FormOutcome, FormError> {
        let credential = self
            .credentials
            .create_user_with_email_and_password(&email, &password)
            .await?;

        let result = self
            .actions
            .sign_up(SignUpParams {
                uid: credential.uid,
                name,
                email,
                password: None,
            })
            .await?;

        if !result.success {
            return Err(FormError::Rejected(result.message));
        }

        Ok(FormOutcome {
            notice: "Account created successfully. Please sign in.",
            navigate_to: "/sign-in",
            session_cookie: None,
        })
    }

    async fn sign_in(&self, email: String, password: String) -> Result<FormOutcome, FormError> {
        let credential = self
            .credentials
            .sign_in_with_email_and_password(&email, &password)
            .await?;

        if credential.id_token.is_empty() {
            return Err(FormError::MissingIdToken);
        }

        let outcome = self
            .actions
            .sign_in(SignInParams {
                email,
                id_token: credential.id_token,
            })
            .await?;

        if !outcome.result.success {
            return Err(FormError::Rejected(outcome.result.message));
        }

        Ok(FormOutcome {
            notice: "Sign-in successfully",
            navigate_to: "/",
            session_cookie: outcome.session_cookie,
        })
    }
}
