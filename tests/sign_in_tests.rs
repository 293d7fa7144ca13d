// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-in server action and session cookie tests.

use axum::http::StatusCode;
use mockmind::config::Config;
use serde_json::json;
use tower::ServiceExt;

mod common;

fn find_session_cookie(headers: &[String]) -> String {
    headers
        .iter()
        .find(|value| value.starts_with("session="))
        .cloned()
        .unwrap_or_else(|| panic!("missing Set-Cookie header for session: {headers:?}"))
}

#[tokio::test]
async fn test_sign_in_sets_session_cookie() {
    let (app, _, platform) = common::create_test_app();
    let (_, id_token) = common::seed_user(&platform, "Ada", "ada@x.com").await;

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/auth/sign-in",
            &json!({"email": "ada@x.com", "idToken": id_token}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let set_cookies = common::set_cookie_headers(&response);
    let cookie = find_session_cookie(&set_cookies);
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=604800"));
    assert!(!cookie.contains("Secure"));
    assert!(common::session_from_response(&response).is_some());

    assert_eq!(
        common::body_json(response).await,
        json!({"success": true, "message": "Signed in successfully."})
    );
}

#[tokio::test]
async fn test_sign_in_cookie_is_secure_in_production() {
    let config = Config {
        production: true,
        ..Config::test_default()
    };
    let (app, _, platform) = common::create_test_app_with_config(config);
    let (_, id_token) = common::seed_user(&platform, "Ada", "ada@x.com").await;

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/auth/sign-in",
            &json!({"email": "ada@x.com", "idToken": id_token}),
        ))
        .await
        .unwrap();

    let cookie = find_session_cookie(&common::set_cookie_headers(&response));
    assert!(cookie.contains("Secure"));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_sign_in_unknown_email() {
    let (app, _, platform) = common::create_test_app();
    let (_, id_token) = common::seed_user(&platform, "Ada", "ada@x.com").await;

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/auth/sign-in",
            &json!({"email": "nobody@x.com", "idToken": id_token}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(common::set_cookie_headers(&response).is_empty());
    assert_eq!(
        common::body_json(response).await,
        json!({
            "success": false,
            "message": "User does not exist. Create a new account instead."
        })
    );
}

#[tokio::test]
async fn test_sign_in_invalid_id_token() {
    let (app, _, platform) = common::create_test_app();
    common::seed_user(&platform, "Ada", "ada@x.com").await;

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/auth/sign-in",
            &json!({"email": "ada@x.com", "idToken": "not-a-token"}),
        ))
        .await
        .unwrap();

    assert!(common::session_from_response(&response).is_none());
    assert_eq!(
        common::body_json(response).await,
        json!({"success": false, "message": "Failed to log in."})
    );
}

#[tokio::test]
async fn test_sign_in_with_session_artifact_instead_of_id_token() {
    let (app, _, platform) = common::create_test_app();
    let (_, id_token) = common::seed_user(&platform, "Ada", "ada@x.com").await;
    let request = json!({"email": "ada@x.com", "idToken": id_token});

    let first = app
        .clone()
        .oneshot(common::json_request("POST", "/api/auth/sign-in", &request))
        .await
        .unwrap();
    let session = common::session_from_response(&first).unwrap();

    let second = app
        .oneshot(common::json_request(
            "POST",
            "/api/auth/sign-in",
            &json!({"email": "ada@x.com", "idToken": session}),
        ))
        .await
        .unwrap();

    assert!(common::session_from_response(&second).is_none());
    assert_eq!(common::body_json(second).await["success"], false);
}

#[tokio::test]
async fn test_sign_in_disabled_account() {
    let (app, _, platform) = common::create_test_app();
    let (uid, id_token) = common::seed_user(&platform, "Ada", "ada@x.com").await;
    platform.disable_account(&uid).unwrap();

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/auth/sign-in",
            &json!({"email": "ada@x.com", "idToken": id_token}),
        ))
        .await
        .unwrap();

    assert!(common::session_from_response(&response).is_none());
    assert_eq!(
        common::body_json(response).await,
        json!({"success": false, "message": "Failed to log in."})
    );
}

#[tokio::test]
async fn test_sign_in_platform_unavailable() {
    let (app, _, platform) = common::create_test_app();
    let (_, id_token) = common::seed_user(&platform, "Ada", "ada@x.com").await;
    platform.set_unavailable(true);

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/auth/sign-in",
            &json!({"email": "ada@x.com", "idToken": id_token}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        common::body_json(response).await,
        json!({"success": false, "message": "Failed to log in."})
    );
}

#[tokio::test]
async fn test_sign_in_missing_id_token_is_bad_request() {
    let (app, _, _) = common::create_test_app();

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/auth/sign-in",
            &json!({"email": "ada@x.com"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::body_json(response).await["error"], "bad_request");
}

#[tokio::test]
async fn test_sign_in_with_another_accounts_id_token() {
    let (app, _, platform) = common::create_test_app();
    common::seed_user(&platform, "Ada", "ada@x.com").await;
    let (_, bob_token) = common::seed_user(&platform, "Bob", "bob@x.com").await;

    let response = app
        .clone()
        .oneshot(common::json_request(
            "POST",
            "/api/auth/sign-in",
            &json!({"email": "ada@x.com", "idToken": bob_token}),
        ))
        .await
        .unwrap();

    assert!(common::session_from_response(&response).is_none());
    assert_eq!(
        common::body_json(response).await,
        json!({"success": false, "message": "Failed to log in."})
    );

    // Bob's own token still signs Bob in.
    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/auth/sign-in",
            &json!({"email": "bob@x.com", "idToken": bob_token}),
        ))
        .await
        .unwrap();
    assert!(common::session_from_response(&response).is_some());
}
