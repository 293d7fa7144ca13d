// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process identity and document platform.
//!
//! Backs the service when `PLATFORM=memory` and stands in for Firebase in
//! tests. Accounts, user documents and interviews live in concurrent maps;
//! identity tokens and session artifacts are HS256 JWTs.

use crate::forms::credential::{Credential, CredentialClient, CredentialError};
use crate::models::{Interview, UserProfile};
use crate::services::platform::{
    check_account_for_session, AccountRecord, DocumentStore, IdTokenClaims, IdentityPlatform,
    InterviewQueries, PlatformError, SessionClaims,
};
use crate::services::session::{
    require_recent_sign_in, session_issuer, validate_session_duration, SessionSigner,
};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

const ID_TOKEN_ISSUER: &str = "https://securetoken.mockmind.local";
const ID_TOKEN_LIFETIME: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
struct StoredAccount {
    record: AccountRecord,
    password: String,
}

/// Identity platform, document store and interview queries in one process.
pub struct InMemoryPlatform {
    accounts: DashMap<String, StoredAccount>,
    uid_by_email: DashMap<String, String>,
    users: DashMap<String, UserProfile>,
    interviews: DashMap<String, Interview>,
    id_tokens: SessionSigner,
    sessions: SessionSigner,
    next_uid: AtomicU64,
    user_writes: AtomicUsize,
    unavailable: AtomicBool,
}

impl InMemoryPlatform {
    /// Create an empty platform whose session artifacts are signed with
    /// `session_signing_key` for `project_id`.
    pub fn new(project_id: &str, session_signing_key: &[u8]) -> Self {
        // ID tokens get their own key so a session artifact can never be
        // replayed as an identity token, or the reverse.
        let mut id_token_key = session_signing_key.to_vec();
        id_token_key.extend_from_slice(b"/id-token");

        Self {
            accounts: DashMap::new(),
            uid_by_email: DashMap::new(),
            users: DashMap::new(),
            interviews: DashMap::new(),
            id_tokens: SessionSigner::new(&id_token_key, ID_TOKEN_ISSUER),
            sessions: SessionSigner::new(session_signing_key, session_issuer(project_id)),
            next_uid: AtomicU64::new(1),
            user_writes: AtomicUsize::new(0),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Make every subsequent call fail as if the platform were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of user-document writes performed so far.
    pub fn user_writes(&self) -> usize {
        self.user_writes.load(Ordering::SeqCst)
    }

    fn ensure_available(&self) -> Result<(), PlatformError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(PlatformError::Transient(
                "in-memory platform marked unavailable".to_string(),
            ));
        }
        Ok(())
    }

    /// Create a platform account.
    pub fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AccountRecord, PlatformError> {
        self.ensure_available()?;

        let email_key = email.to_lowercase();
        let uid = format!("local-{:06}", self.next_uid.fetch_add(1, Ordering::SeqCst));

        match self.uid_by_email.entry(email_key) {
            Entry::Occupied(_) => return Err(PlatformError::EmailAlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(uid.clone());
            }
        }

        let record = AccountRecord {
            uid: uid.clone(),
            email: Some(email.to_string()),
            display_name: None,
            disabled: false,
            tokens_valid_after: None,
        };
        self.accounts.insert(
            uid.clone(),
            StoredAccount {
                record: record.clone(),
                password: password.to_string(),
            },
        );

        tracing::debug!(uid = %uid, "In-memory account created");
        Ok(record)
    }

    /// Issue an identity token for `uid` as if it had just signed in.
    pub fn issue_id_token(&self, uid: &str) -> Result<String, PlatformError> {
        let account = self
            .accounts
            .get(uid)
            .map(|entry| entry.record.clone())
            .ok_or(PlatformError::UserNotFound)?;

        let identity = IdTokenClaims {
            uid: account.uid,
            email: account.email,
            auth_time: chrono::Utc::now().timestamp(),
        };
        self.id_tokens.mint(&identity, ID_TOKEN_LIFETIME)
    }

    /// Revoke every session created so far for `uid`.
    pub fn revoke_refresh_tokens(&self, uid: &str) -> Result<(), PlatformError> {
        let mut account = self.accounts.get_mut(uid).ok_or(PlatformError::UserNotFound)?;
        // Sessions whose auth_time falls in the current second are revoked too.
        account.record.tokens_valid_after = Some(chrono::Utc::now().timestamp() + 1);
        Ok(())
    }

    pub fn disable_account(&self, uid: &str) -> Result<(), PlatformError> {
        let mut account = self.accounts.get_mut(uid).ok_or(PlatformError::UserNotFound)?;
        account.record.disabled = true;
        Ok(())
    }

    /// Store an interview document.
    pub fn insert_interview(&self, interview: Interview) {
        self.interviews.insert(interview.id.clone(), interview);
    }

    fn verify_id_token(&self, id_token: &str) -> Result<IdTokenClaims, PlatformError> {
        let claims = self.id_tokens.verify(id_token)?;
        Ok(IdTokenClaims {
            uid: claims.uid,
            email: claims.email,
            auth_time: claims.auth_time,
        })
    }

    fn account(&self, uid: &str) -> Option<AccountRecord> {
        self.accounts.get(uid).map(|entry| entry.record.clone())
    }
}

#[async_trait]
impl IdentityPlatform for InMemoryPlatform {
    async fn get_user(&self, uid: &str) -> Result<Option<AccountRecord>, PlatformError> {
        self.ensure_available()?;
        Ok(self.account(uid))
    }

    async fn get_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AccountRecord>, PlatformError> {
        self.ensure_available()?;
        let uid = self
            .uid_by_email
            .get(&email.to_lowercase())
            .map(|entry| entry.value().clone());
        Ok(uid.and_then(|uid| self.account(&uid)))
    }

    async fn create_session_cookie(
        &self,
        id_token: &str,
        expires_in: Duration,
    ) -> Result<String, PlatformError> {
        self.ensure_available()?;
        validate_session_duration(expires_in)?;

        let identity = self.verify_id_token(id_token)?;
        require_recent_sign_in(&identity, chrono::Utc::now().timestamp())?;
        check_account_for_session(self.account(&identity.uid), identity.auth_time)?;

        self.sessions.mint(&identity, expires_in)
    }

    async fn verify_session_cookie(
        &self,
        session_cookie: &str,
        check_revoked: bool,
    ) -> Result<SessionClaims, PlatformError> {
        self.ensure_available()?;
        let claims = self.sessions.verify(session_cookie)?;

        if check_revoked {
            check_account_for_session(self.account(&claims.uid), claims.auth_time)?;
        }

        Ok(claims)
    }
}

#[async_trait]
impl DocumentStore for InMemoryPlatform {
    async fn get_user(&self, uid: &str) -> Result<Option<UserProfile>, PlatformError> {
        self.ensure_available()?;
        Ok(self.users.get(uid).map(|entry| entry.value().clone()))
    }

    async fn set_user(&self, uid: &str, profile: &UserProfile) -> Result<(), PlatformError> {
        self.ensure_available()?;

        let email_taken = self.users.iter().any(|entry| {
            entry.key() != uid && entry.value().email.eq_ignore_ascii_case(&profile.email)
        });
        if email_taken {
            return Err(PlatformError::EmailAlreadyExists);
        }

        self.users.insert(uid.to_string(), profile.clone());
        self.user_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl InterviewQueries for InMemoryPlatform {
    async fn interviews_by_user(&self, uid: &str) -> Result<Vec<Interview>, PlatformError> {
        self.ensure_available()?;
        let mut interviews: Vec<Interview> = self
            .interviews
            .iter()
            .filter(|entry| entry.user_id == uid)
            .map(|entry| entry.value().clone())
            .collect();
        sort_newest_first(&mut interviews);
        Ok(interviews)
    }

    async fn latest_interviews(
        &self,
        uid: &str,
        limit: usize,
    ) -> Result<Vec<Interview>, PlatformError> {
        self.ensure_available()?;
        let mut interviews: Vec<Interview> = self
            .interviews
            .iter()
            .filter(|entry| entry.finalized && entry.user_id != uid)
            .map(|entry| entry.value().clone())
            .collect();
        sort_newest_first(&mut interviews);
        interviews.truncate(limit);
        Ok(interviews)
    }
}

/// RFC 3339 timestamps in UTC sort lexicographically.
fn sort_newest_first(interviews: &mut [Interview]) {
    interviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[async_trait]
impl CredentialClient for InMemoryPlatform {
    async fn create_user_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Credential, CredentialError> {
        if password.len() < 6 {
            return Err(CredentialError::WeakPassword(
                "Password should be at least 6 characters".to_string(),
            ));
        }

        let account = self.create_account(email, password).map_err(|e| match e {
            PlatformError::EmailAlreadyExists => CredentialError::EmailExists,
            PlatformError::Transient(msg) => CredentialError::Network(msg),
            other => CredentialError::Other(other.to_string()),
        })?;

        let id_token = self
            .issue_id_token(&account.uid)
            .map_err(|e| CredentialError::Other(e.to_string()))?;

        Ok(Credential {
            uid: account.uid,
            id_token,
        })
    }

    async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Credential, CredentialError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CredentialError::Network("platform unavailable".to_string()));
        }

        let uid = self
            .uid_by_email
            .get(&email.to_lowercase())
            .map(|entry| entry.value().clone())
            .ok_or(CredentialError::InvalidCredentials)?;

        let stored = self
            .accounts
            .get(&uid)
            .map(|entry| entry.value().clone())
            .ok_or(CredentialError::InvalidCredentials)?;

        if stored.password != password {
            return Err(CredentialError::InvalidCredentials);
        }
        if stored.record.disabled {
            return Err(CredentialError::UserDisabled);
        }

        let id_token = self
            .issue_id_token(&uid)
            .map_err(|e| CredentialError::Other(e.to_string()))?;

        Ok(Credential { uid, id_token })
    }
}
