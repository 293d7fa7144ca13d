// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod auth;
pub mod firebase;
pub mod id_token;
pub mod memory;
pub mod platform;
pub mod session;

pub use auth::{AuthService, SignInOutcome};
pub use firebase::FirebaseAuth;
pub use id_token::IdTokenVerifier;
pub use memory::InMemoryPlatform;
pub use platform::{DocumentStore, IdentityPlatform, InterviewQueries, PlatformError};
pub use session::{SessionSigner, SESSION_DURATION};
