// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth server actions exposed over HTTP.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::error::Result;
use crate::middleware::session::{
    cleared_session_cookie, see_other, session_cookie, session_value,
};
use crate::models::{ActionResult, AuthStatus, CurrentUser, SignInParams, SignUpParams};
use crate::services::auth::messages;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/sign-up", post(sign_up))
        .route("/api/auth/sign-in", post(sign_in))
        .route("/api/auth/sign-out", post(sign_out))
        .route("/api/auth/me", get(current_user))
        .route("/api/auth/status", get(status))
}

/// Create the user document for a new credential.
async fn sign_up(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<Json<SignUpParams>, JsonRejection>,
) -> Result<Json<ActionResult>> {
    let Json(params) = params?;
    Ok(Json(state.auth.sign_up(&params).await))
}

/// Exchange an identity token for a session cookie.
async fn sign_in(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    params: std::result::Result<Json<SignInParams>, JsonRejection>,
) -> Result<(CookieJar, Json<ActionResult>)> {
    let Json(params) = params?;
    let outcome = state.auth.sign_in(&params).await;

    let jar = match outcome.session_cookie {
        Some(value) => jar.add(session_cookie(value, state.config.production)),
        None => jar,
    };

    Ok((jar, Json(outcome.result)))
}

/// Clear the session cookie and send the user to the sign-in page.
///
/// The cleared cookie is sent even when the redirect cannot be built.
async fn sign_out(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let jar = jar.add(cleared_session_cookie());

    match see_other(&state.config.sign_in_path) {
        Ok(redirect) => (jar, redirect).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Error signing out");
            (jar, Json(ActionResult::failed(messages::SIGN_OUT_FAILED))).into_response()
        }
    }
}

/// The signed-in user, or `null`.
async fn current_user(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Json<Option<CurrentUser>> {
    Json(state.auth.current_user(session_value(&jar)).await)
}

async fn status(State(state): State<Arc<AppState>>, jar: CookieJar) -> Json<AuthStatus> {
    Json(AuthStatus {
        authenticated: state.auth.is_authenticated(session_value(&jar)).await,
    })
}
