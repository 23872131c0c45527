//! In-memory user directory keyed by email.
//!
//! Populated once from an import file at startup; afterwards users can only be
//! added or deleted, never updated in place.

use crate::error::UserStoreError;
use crate::oauth2::password::{credentials_match, hash_password, is_password_hash};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub email: String,
    /// Argon2 PHC hash for imported users, plaintext for records added as such.
    pub password: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Default)]
pub struct UserDirectory {
    by_email: DashMap<String, UserRecord>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a directory from records; a later record for the same email replaces
    /// the earlier one.
    pub fn from_records(records: impl IntoIterator<Item = UserRecord>) -> Self {
        let directory = Self::new();
        for record in records {
            let email = record.email.clone();
            if directory.by_email.insert(email.clone(), record).is_some() {
                tracing::warn!(%email, "duplicate user record, keeping the later one");
            }
        }
        directory
    }

    /// Loads users from a JSON array file, hashing plaintext passwords on the way.
    ///
    /// A missing or malformed file yields an empty directory so the service can
    /// still start.
    #[tracing::instrument]
    pub fn import_file(path: &Path) -> Self {
        let content = match std::fs::read(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read user import file");
                return Self::new();
            }
        };
        let records: Vec<UserRecord> = match serde_json::from_slice(&content) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not parse user import file");
                return Self::new();
            }
        };

        let directory = Self::from_records(records.into_iter().map(hash_imported_password));
        tracing::info!(count = directory.len(), "imported users");
        directory
    }

    pub fn get_by_email(&self, email: &str) -> Result<UserRecord, UserStoreError> {
        self.by_email
            .get(email)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| UserStoreError::NotFound(email.to_string()))
    }

    pub fn all(&self) -> Vec<UserRecord> {
        self.by_email
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn add(&self, user: UserRecord) -> Result<(), UserStoreError> {
        match self.by_email.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(UserStoreError::AlreadyExists(user.email)),
            Entry::Vacant(slot) => {
                slot.insert(user);
                Ok(())
            }
        }
    }

    pub fn delete_by_email(&self, email: &str) -> Result<UserRecord, UserStoreError> {
        self.by_email
            .remove(email)
            .map(|(_, user)| user)
            .ok_or_else(|| UserStoreError::NotFound(email.to_string()))
    }

    /// True when a user with this email exists and the password matches.
    pub fn verify_credentials(&self, email: &str, password: &str) -> bool {
        match self.get_by_email(email) {
            Ok(user) => credentials_match(&user.password, password),
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.by_email.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_email.is_empty()
    }
}

fn hash_imported_password(mut user: UserRecord) -> UserRecord {
    if is_password_hash(&user.password) {
        return user;
    }
    match hash_password(&user.password) {
        Ok(hash) => user.password = hash,
        Err(e) => {
            tracing::warn!(email = %user.email, error = %e, "could not hash imported password, keeping it as is");
        }
    }
    user
}
