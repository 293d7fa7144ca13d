// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod action;
pub mod interview;
pub mod user;

pub use action::{ActionResult, AuthStatus, SignInParams, SignUpParams};
pub use interview::Interview;
pub use user::{CurrentUser, UserProfile};
