// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running
//! (FIRESTORE_EMULATOR_HOST set); they skip otherwise.

use mockmind::db::FirestoreDb;
use mockmind::models::UserProfile;
use mockmind::services::{DocumentStore, InterviewQueries, PlatformError};

mod common;
use common::test_db;

/// Unique uid for test isolation.
fn unique_uid() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("test-{nanos}")
}

#[tokio::test]
async fn test_user_document_roundtrip() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid();

    let before = db.get_user(&uid).await.unwrap();
    assert!(before.is_none(), "User should not exist before creation");

    let profile = UserProfile {
        name: "Ada".to_string(),
        email: format!("{uid}@example.com"),
    };
    db.set_user(&uid, &profile).await.unwrap();

    let after = db.get_user(&uid).await.unwrap();
    assert_eq!(after, Some(profile));
}

#[tokio::test]
async fn test_interview_queries_for_new_user_are_empty() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid();

    let own = db.interviews_by_user(&uid).await.unwrap();
    assert!(own.is_empty());

    let latest = db.latest_interviews(&uid, 20).await.unwrap();
    assert!(latest.iter().all(|i| i.user_id != uid && i.finalized));
    assert!(latest.len() <= 20);
}

#[tokio::test]
async fn test_offline_client_reports_database_error() {
    let db = FirestoreDb::new_mock();

    assert!(matches!(
        db.get_user("u1").await,
        Err(PlatformError::Database(_))
    ));
    assert!(matches!(
        db.latest_interviews("u1", 20).await,
        Err(PlatformError::Database(_))
    ));
}
