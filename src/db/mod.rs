//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const INTERVIEWS: &str = "interviews";
}

/// Number of interviews shown in the "Take an Interview" section.
pub const LATEST_INTERVIEWS_LIMIT: usize = 20;
