// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-up / sign-in form flow used by clients of the auth API.
//!
//! A submission is validated against the schema for its mode, the
//! credential is created or checked with the identity platform, and the
//! resulting identity is handed to the server actions.

pub mod controller;
pub mod credential;
pub mod schema;

pub use controller::{AuthActions, AuthFormController, FormOutcome, HttpAuthActions};
pub use credential::{Credential, CredentialClient, CredentialError, IdentityToolkitClient};
pub use schema::{validate, AuthFormInput, FormError, FormType, ValidatedForm};
