// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile storage, keyed by uid)
//! - Interviews (read-only queries for the home page)

use crate::db::collections;
use crate::models::{Interview, UserProfile};
use crate::services::platform::{DocumentStore, InterviewQueries, PlatformError};
use async_trait::async_trait;
use futures_util::{future, StreamExt, TryStreamExt};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, PlatformError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id).await.map_err(|e| {
            PlatformError::Database(format!("Failed to connect to Firestore: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, PlatformError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            PlatformError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, PlatformError> {
        self.client.as_ref().ok_or_else(|| {
            PlatformError::Database("Database not connected (offline mode)".to_string())
        })
    }
}

#[async_trait]
impl DocumentStore for FirestoreDb {
    async fn get_user(&self, uid: &str) -> Result<Option<UserProfile>, PlatformError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| PlatformError::Database(e.to_string()))
    }

    async fn set_user(&self, uid: &str, profile: &UserProfile) -> Result<(), PlatformError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(uid)
            .object(profile)
            .execute()
            .await
            .map_err(|e| PlatformError::Database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl InterviewQueries for FirestoreDb {
    async fn interviews_by_user(&self, uid: &str) -> Result<Vec<Interview>, PlatformError> {
        let uid = uid.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::INTERVIEWS)
            .filter(move |q| q.for_all([q.field("userId").eq(uid.clone())]))
            .order_by([("createdAt", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| PlatformError::Database(e.to_string()))
    }

    async fn latest_interviews(
        &self,
        uid: &str,
        limit: usize,
    ) -> Result<Vec<Interview>, PlatformError> {
        // The caller's own interviews are dropped client-side so the query
        // only needs the (finalized, createdAt) index.
        let stream = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::INTERVIEWS)
            .filter(|q| q.for_all([q.field("finalized").eq(true)]))
            .order_by([("createdAt", firestore::FirestoreQueryDirection::Descending)])
            .obj::<Interview>()
            .stream_query_with_errors()
            .await
            .map_err(|e| PlatformError::Database(e.to_string()))?;

        stream
            .map_err(|e| PlatformError::Database(e.to_string()))
            .try_filter(|interview| future::ready(interview.user_id != uid))
            .take(limit)
            .try_collect()
            .await
    }
}
