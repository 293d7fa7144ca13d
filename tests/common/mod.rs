// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
};
use mockmind::config::Config;
use mockmind::db::FirestoreDb;
use mockmind::routes::create_router;
use mockmind::services::{AuthService, InMemoryPlatform};
use mockmind::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// In-memory platform configured like the test app.
#[allow(dead_code)]
pub fn test_platform(config: &Config) -> Arc<InMemoryPlatform> {
    Arc::new(InMemoryPlatform::new(
        &config.project_id,
        &config.session_signing_key,
    ))
}

/// Create a test app backed by the in-memory platform.
/// Returns the router, the shared state and the platform for seeding.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, Arc<InMemoryPlatform>) {
    create_test_app_with_config(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with_config(
    config: Config,
) -> (axum::Router, Arc<AppState>, Arc<InMemoryPlatform>) {
    let platform = test_platform(&config);

    let state = Arc::new(AppState {
        config,
        auth: AuthService::new(platform.clone(), platform.clone()),
        interviews: platform.clone(),
    });

    (create_router(state.clone()), state, platform)
}

/// Create an account with a user document and return `(uid, id_token)`.
#[allow(dead_code)]
pub async fn seed_user(platform: &InMemoryPlatform, name: &str, email: &str) -> (String, String) {
    use mockmind::models::UserProfile;
    use mockmind::services::DocumentStore;

    let account = platform.create_account(email, "password123").unwrap();
    let profile = UserProfile {
        name: name.to_string(),
        email: email.to_string(),
    };
    DocumentStore::set_user(platform, &account.uid, &profile)
        .await
        .unwrap();
    let id_token = platform.issue_id_token(&account.uid).unwrap();
    (account.uid, id_token)
}

#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

#[allow(dead_code)]
pub fn get_with_session(uri: &str, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(session) = session {
        builder = builder.header(header::COOKIE, format!("session={session}"));
    }
    builder.body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[allow(dead_code)]
pub fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

/// Value of the `session` cookie set by a response, if any.
#[allow(dead_code)]
pub fn session_from_response(response: &Response) -> Option<String> {
    set_cookie_headers(response).iter().find_map(|cookie| {
        cookie
            .strip_prefix("session=")
            .and_then(|rest| rest.split(';').next())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    })
}
