// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Interview documents shown on the home page.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A generated mock interview.
///
/// Stored at: `interviews/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Interview {
    /// Document ID (filled in from the document name on reads)
    #[serde(default, alias = "_firestore_id")]
    pub id: String,
    /// Owner uid
    pub user_id: String,
    /// Job role the interview targets (e.g. "Frontend Developer")
    pub role: String,
    /// Seniority level (e.g. "Junior")
    pub level: String,
    /// Interview focus ("technical", "behavioural", "mixed")
    #[serde(rename = "type")]
    pub interview_type: String,
    #[serde(default)]
    pub techstack: Vec<String>,
    #[serde(default)]
    pub questions: Vec<String>,
    /// Whether generation completed and the interview can be taken
    #[serde(default)]
    pub finalized: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    /// Creation time (RFC 3339)
    pub created_at: String,
}
