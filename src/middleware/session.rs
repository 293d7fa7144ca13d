// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session cookie handling and the signed-in-user middleware.

use crate::services::session::SESSION_DURATION;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

/// Name of the cookie holding the session artifact.
pub const SESSION_COOKIE: &str = "session";

/// Cookie carrying a freshly minted session artifact.
pub fn session_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .max_age(time::Duration::seconds(SESSION_DURATION.as_secs() as i64))
        .http_only(true)
        .secure(secure)
        .path("/")
        .same_site(SameSite::Lax)
        .build()
}

/// Cookie that overwrites the session with an empty, already expired value.
pub fn cleared_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .max_age(time::Duration::seconds(-1))
        .path("/")
        .build()
}

/// Current session artifact from the request cookies, if any.
pub fn session_value(jar: &CookieJar) -> Option<&str> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
}

/// 303 See Other to `location`.
pub fn see_other(location: &str) -> Result<Response, header::InvalidHeaderValue> {
    let location = HeaderValue::from_str(location)?;
    Ok((StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response())
}

/// Middleware that requires a signed-in user.
///
/// Resolves the session cookie to a [`CurrentUser`](crate::models::CurrentUser)
/// and stores it as a request extension; anonymous visitors are redirected
/// to the sign-in page.
pub async fn require_user(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(user) = state.auth.current_user(session_value(&jar)).await else {
        return match see_other(&state.config.sign_in_path) {
            Ok(redirect) => redirect,
            Err(e) => {
                tracing::error!(error = %e, path = %state.config.sign_in_path, "Invalid sign-in path");
                StatusCode::UNAUTHORIZED.into_response()
            }
        };
    };

    request.extensions_mut().insert(user);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie("abc".to_string(), false).to_string();
        assert!(cookie.starts_with("session=abc"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(!cookie.contains("Secure"));

        let secure = session_cookie("abc".to_string(), true).to_string();
        assert!(secure.contains("Secure"));
    }

    #[test]
    fn cleared_cookie_expires_immediately() {
        let cookie = cleared_session_cookie().to_string();
        assert!(cookie.starts_with("session=;"));
        assert!(cookie.contains("Max-Age=-1"));
        assert!(cookie.contains("Path=/"));
    }

    #[test]
    fn empty_session_is_absent() {
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, ""));
        assert_eq!(session_value(&jar), None);

        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, "tok"));
        assert_eq!(session_value(&jar), Some("tok"));
    }

    #[test]
    fn see_other_rejects_bad_location() {
        assert!(see_other("/sign-in").is_ok());
        assert!(see_other("/bad\nheader").is_err());
    }
}
