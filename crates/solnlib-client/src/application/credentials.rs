//! CredentialManager: secrets kept in splunkd's `storage/passwords`.
//!
//! Secrets longer than splunkd's 255-character limit are stored as numbered
//! chunks (see [`solnlib_core::credential`]); this module hides the chunking
//! so callers only ever see whole passwords.

use std::collections::BTreeMap;

use serde::Deserialize;
use solnlib_core::credential::{
    chunk_username, entity_name, join_chunks, split_chunk_username, split_into_chunks,
};
use solnlib_core::rest::{EntryList, Namespace};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::application::rest_client::{RequestBody, RestError, SessionKey, SplunkRestClient};

const PASSWORDS_PATH: &str = "storage/passwords";

/// Error type for credential operations.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// No stored password matches the user in this realm.
    #[error("failed to find password for user {user:?} in realm {realm:?}")]
    NotExist { user: String, realm: String },

    /// `auth/login` rejected the username/password.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The login response carried no session key.
    #[error("login response did not contain a session key")]
    MissingSessionKey,

    #[error(transparent)]
    Rest(#[from] RestError),
}

/// A password entry as returned by `storage/passwords`, with chunks merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPassword {
    /// Entity name, e.g. `realm:user:`.
    pub name: String,
    pub realm: String,
    pub username: String,
    pub clear_password: String,
}

#[derive(Debug, Deserialize)]
struct PasswordContent {
    #[serde(default)]
    realm: String,
    username: String,
    #[serde(default)]
    clear_password: String,
}

/// Reads and writes passwords of one realm.
#[derive(Debug, Clone)]
pub struct CredentialManager {
    client: SplunkRestClient,
    realm: String,
}

impl CredentialManager {
    /// `realm` `None` is the empty realm.
    pub fn new(client: SplunkRestClient, realm: Option<String>) -> Self {
        Self {
            client,
            realm: realm.unwrap_or_default(),
        }
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Returns the clear-text password of `user`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::NotExist`] if no entry matches.
    pub fn get_password(&self, user: &str) -> Result<String, CredentialError> {
        self.get_clear_passwords_in_realm()?
            .into_iter()
            .find(|p| p.username == user)
            .map(|p| p.clear_password)
            .ok_or_else(|| CredentialError::NotExist {
                user: user.to_string(),
                realm: self.realm.clone(),
            })
    }

    /// Stores `password` for `user`, chunking it when needed.
    ///
    /// Existing chunks are overwritten in place.  A shorter new password
    /// leaves stale trailing chunks on the server; they sit after the end
    /// mark and are ignored on read.
    pub fn set_password(&self, user: &str, password: &str) -> Result<(), CredentialError> {
        let chunks = split_into_chunks(password);
        let count = chunks.len();
        for (i, chunk) in chunks.into_iter().enumerate() {
            let partial_user = chunk_username(user, i + 1);
            self.update_password(&partial_user, &chunk)?;
        }
        info!(user, realm = %self.realm, chunks = count, "stored password");
        Ok(())
    }

    /// Deletes every entry (plain or chunked) of `user` in this realm.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::NotExist`] if nothing matched.
    pub fn delete_password(&self, user: &str) -> Result<(), CredentialError> {
        let mut deleted = false;
        for entry in self.raw_entries()? {
            if entry.realm != self.realm {
                continue;
            }
            let matches = entry.username == user
                || split_chunk_username(&entry.username).map(|(u, _)| u) == Some(user);
            if matches {
                self.client.delete(&entity_path(&entry.name), &[])?;
                deleted = true;
            }
        }

        if !deleted {
            return Err(CredentialError::NotExist {
                user: user.to_string(),
                realm: self.realm.clone(),
            });
        }
        info!(user, realm = %self.realm, "deleted password");
        Ok(())
    }

    /// All passwords in this realm, chunks merged.
    pub fn get_clear_passwords_in_realm(&self) -> Result<Vec<StoredPassword>, CredentialError> {
        Ok(self
            .get_clear_passwords()?
            .into_iter()
            .filter(|p| p.realm == self.realm)
            .collect())
    }

    /// All passwords visible to the session, chunks merged.
    pub fn get_clear_passwords(&self) -> Result<Vec<StoredPassword>, CredentialError> {
        let mut plain = Vec::new();
        // (realm, user) -> [(index, chunk)]
        let mut chunked: BTreeMap<(String, String), Vec<(usize, String)>> = BTreeMap::new();

        for entry in self.raw_entries()? {
            let chunk_of = split_chunk_username(&entry.username)
                .map(|(user, index)| (user.to_string(), index));
            match chunk_of {
                Some((user, index)) => chunked
                    .entry((entry.realm, user))
                    .or_default()
                    .push((index, entry.clear_password)),
                None => plain.push(entry),
            }
        }

        for ((realm, username), chunks) in chunked {
            plain.push(StoredPassword {
                name: entity_name(&realm, &username),
                realm,
                username,
                clear_password: join_chunks(chunks),
            });
        }
        Ok(plain)
    }

    fn raw_entries(&self) -> Result<Vec<StoredPassword>, CredentialError> {
        let list: EntryList<PasswordContent> =
            self.client.get_entries(PASSWORDS_PATH, &[("count", "-1")])?;
        debug!(entries = list.entry.len(), "listed storage/passwords");
        Ok(list
            .entry
            .into_iter()
            .filter_map(|e| {
                let content = e.content?;
                Some(StoredPassword {
                    name: e.name,
                    realm: content.realm,
                    username: content.username,
                    clear_password: content.clear_password,
                })
            })
            .collect())
    }

    /// Creates the entity, or updates it when splunkd reports a conflict.
    fn update_password(&self, user: &str, password: &str) -> Result<(), CredentialError> {
        let create = vec![
            ("name".to_string(), user.to_string()),
            ("password".to_string(), password.to_string()),
            ("realm".to_string(), self.realm.clone()),
        ];
        match self.client.post_form::<serde_json::Value>(PASSWORDS_PATH, create) {
            Ok(_) => Ok(()),
            Err(e) if e.status() == Some(409) => {
                warn!(user, realm = %self.realm, "password exists, updating");
                let path = entity_path(&entity_name(&self.realm, user));
                let form = vec![("password".to_string(), password.to_string())];
                self.client.post_form::<serde_json::Value>(&path, form)?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn entity_path(name: &str) -> String {
    format!("{PASSWORDS_PATH}/{name}")
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(rename = "sessionKey")]
    session_key: Option<String>,
}

/// Exchanges a username/password for a session key at `auth/login`.
///
/// `client` is typically built without a session key.
///
/// # Errors
///
/// Returns [`CredentialError::InvalidCredentials`] on HTTP 401.
pub fn login(
    client: &SplunkRestClient,
    username: &str,
    password: &str,
) -> Result<SessionKey, CredentialError> {
    let form = vec![
        ("username".to_string(), username.to_string()),
        ("password".to_string(), password.to_string()),
    ];
    let client = client.with_namespace(Namespace::global());
    let response: LoginResponse = client
        .post_json("auth/login", &[], RequestBody::Form(form))
        .map_err(|e| match e.status() {
            Some(401) => CredentialError::InvalidCredentials,
            _ => CredentialError::Rest(e),
        })?;
    info!(username, "logged in");
    response
        .session_key
        .map(SessionKey::new)
        .ok_or(CredentialError::MissingSessionKey)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
