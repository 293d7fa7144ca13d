// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-up server action tests.
//!
//! Sign-up only creates the user document; the credential itself was already
//! created with the identity platform by the client.

use axum::http::StatusCode;
use mockmind::services::DocumentStore;
use serde_json::json;
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_sign_up_creates_user_document() {
    let (app, _, platform) = common::create_test_app();

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/auth/sign-up",
            &json!({"uid": "u1", "name": "Ada", "email": "ada@x.com", "password": "pw"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(
        body,
        json!({"success": true, "message": "Account created successfully."})
    );

    let profile = DocumentStore::get_user(platform.as_ref(), "u1")
        .await
        .unwrap()
        .expect("user document should exist");
    assert_eq!(profile.name, "Ada");
    assert_eq!(profile.email, "ada@x.com");
    assert_eq!(platform.user_writes(), 1);
}

#[tokio::test]
async fn test_sign_up_twice_reports_existing_user_without_writing() {
    let (app, _, platform) = common::create_test_app();
    let params = json!({"uid": "u1", "name": "Ada", "email": "ada@x.com"});

    let first = app
        .clone()
        .oneshot(common::json_request("POST", "/api/auth/sign-up", &params))
        .await
        .unwrap();
    assert_eq!(common::body_json(first).await["success"], true);

    let renamed = json!({"uid": "u1", "name": "Ada Lovelace", "email": "ada@x.com"});
    let second = app
        .oneshot(common::json_request("POST", "/api/auth/sign-up", &renamed))
        .await
        .unwrap();

    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(
        common::body_json(second).await,
        json!({"success": false, "message": "User already exists. Please sign in instead"})
    );

    // The existing document is left untouched.
    assert_eq!(platform.user_writes(), 1);
    let profile = DocumentStore::get_user(platform.as_ref(), "u1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.name, "Ada");
}

#[tokio::test]
async fn test_sign_up_email_in_use_by_other_user() {
    let (app, _, platform) = common::create_test_app();
    common::seed_user(&platform, "Ada", "ada@x.com").await;

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/auth/sign-up",
            &json!({"uid": "u2", "name": "Imposter", "email": "ada@x.com"}),
        ))
        .await
        .unwrap();

    assert_eq!(
        common::body_json(response).await,
        json!({"success": false, "message": "This email is already in use."})
    );
}

#[tokio::test]
async fn test_sign_up_platform_unavailable() {
    let (app, _, platform) = common::create_test_app();
    platform.set_unavailable(true);

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/auth/sign-up",
            &json!({"uid": "u1", "name": "Ada", "email": "ada@x.com"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        common::body_json(response).await,
        json!({"success": false, "message": "Failed to create an account."})
    );
    assert_eq!(platform.user_writes(), 0);
}

#[tokio::test]
async fn test_sign_up_malformed_body_is_bad_request() {
    let (app, _, platform) = common::create_test_app();

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/auth/sign-up",
            &json!({"name": "Ada"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert!(body["error"].is_string());
    assert_eq!(platform.user_writes(), 0);
}
