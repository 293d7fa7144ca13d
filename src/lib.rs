// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! MockMind: AI mock-interview practice.
//!
//! This crate provides the backend for account sign-up, session-cookie
//! sign-in and the signed-in home page, on top of Firebase Authentication
//! and Cloud Firestore.

pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use services::{AuthService, InterviewQueries};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub auth: AuthService,
    pub interviews: Arc<dyn InterviewQueries>,
}
