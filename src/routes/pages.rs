// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Page data for signed-in users.

use crate::db::LATEST_INTERVIEWS_LIMIT;
use crate::models::{CurrentUser, Interview};
use crate::services::PlatformError;
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const NO_PAST_INTERVIEWS: &str = "You haven't generated any interviews yet. \
     Click Start an interview button above to generate an interview.";
const NO_UPCOMING_INTERVIEWS: &str = "There are no new interviews available.";

/// Page routes (require a signed-in user).
/// The session middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(home))
}

/// One list section of a page.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct InterviewSection {
    pub title: &'static str,
    pub interviews: Vec<Interview>,
    /// Shown instead of the list when it is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
}

impl InterviewSection {
    fn new(title: &'static str, interviews: Vec<Interview>, empty: &'static str) -> Self {
        let empty_message = interviews.is_empty().then_some(empty);
        Self {
            title,
            interviews,
            empty_message,
        }
    }
}

/// Home page data.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HomePage {
    pub user: CurrentUser,
    pub past_interviews: InterviewSection,
    pub upcoming_interviews: InterviewSection,
}

async fn home(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Json<HomePage> {
    let (past, latest) = tokio::join!(
        state.interviews.interviews_by_user(&user.id),
        state
            .interviews
            .latest_interviews(&user.id, LATEST_INTERVIEWS_LIMIT),
    );

    Json(HomePage {
        past_interviews: InterviewSection::new(
            "Your Interview",
            or_empty(past, "interviews by user"),
            NO_PAST_INTERVIEWS,
        ),
        upcoming_interviews: InterviewSection::new(
            "Take an Interview",
            or_empty(latest, "latest interviews"),
            NO_UPCOMING_INTERVIEWS,
        ),
        user,
    })
}

fn or_empty(result: Result<Vec<Interview>, PlatformError>, query: &str) -> Vec<Interview> {
    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, query, "Interview query failed, showing empty section");
        Vec::new()
    })
}
