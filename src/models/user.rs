//! User model for storage and API.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// User profile stored in Firestore at `users/{uid}`.
///
/// The uid is the document ID and is not repeated inside the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Display name entered at sign-up
    pub name: String,
    /// Email address (unique per platform account)
    pub email: String,
}

/// The authenticated user: the stored profile plus its document ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl CurrentUser {
    pub fn from_profile(uid: impl Into<String>, profile: UserProfile) -> Self {
        Self {
            id: uid.into(),
            name: profile.name,
            email: profile.email,
        }
    }
}
