//! AclManager: reads and updates the ACL of a splunkd object.
//!
//! Each call is independent: the manager keeps no copy of any record.  An
//! update sends only the fields the caller supplied (a sparse patch) and
//! returns whatever splunkd now holds, so there is no client-side merge.

use solnlib_core::acl::{is_acl_endpoint, AclRecord, AclUpdate};
use solnlib_core::rest::EntryList;
use thiserror::Error;
use tracing::{debug, info};

use crate::application::rest_client::{RestError, SplunkRestClient};

/// Error type for ACL operations.
#[derive(Debug, Error)]
pub enum AclError {
    /// The path does not address a single object's ACL (for example a
    /// collection path, or a path without the `/acl` suffix on update).
    #[error("invalid ACL endpoint: {0}")]
    InvalidEndpoint(String),

    /// splunkd answered without any entry.
    #[error("no ACL entry returned for {0}")]
    EmptyResponse(String),

    /// Any other remote or transport failure, unchanged.
    #[error(transparent)]
    Rest(#[from] RestError),
}

/// ACL reader/updater bound to one session and namespace.
#[derive(Debug, Clone)]
pub struct AclManager {
    client: SplunkRestClient,
}

impl AclManager {
    pub fn new(client: SplunkRestClient) -> Self {
        Self { client }
    }

    /// Fetches the ACL at `path` (e.g. `data/transforms/extractions/_acl`).
    ///
    /// # Errors
    ///
    /// - [`AclError::InvalidEndpoint`] if `path` does not end in `/acl` or
    ///   `/_acl` (no request is made), or if splunkd answers 404.
    /// - [`AclError::EmptyResponse`] if the response has no entry.
    /// - [`AclError::Rest`] for any other failure.
    pub fn get(&self, path: &str) -> Result<AclRecord, AclError> {
        check_endpoint(path)?;
        let list: EntryList = self
            .client
            .get_entries(path, &[])
            .map_err(|e| not_found_as_invalid(e, path))?;
        let record = first_acl(list, path)?;
        debug!(path, sharing = %record.sharing, "fetched ACL");
        Ok(record)
    }

    /// Applies `update` to the ACL at `path` and returns the resulting record.
    ///
    /// Fields left unset in `update` are not sent and keep their server-side
    /// values.  The current record is read first because splunkd requires
    /// `sharing` on every ACL post; unless `update` sets it, the current scope
    /// is sent back unchanged.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get`], for either request.
    pub fn update(&self, path: &str, update: &AclUpdate) -> Result<AclRecord, AclError> {
        let current = self.get(path)?;
        let form = update.to_form(current.sharing);
        let list: EntryList = self
            .client
            .post_form(path, form)
            .map_err(|e| not_found_as_invalid(e, path))?;
        let record = first_acl(list, path)?;

        info!(
            path,
            sharing = %record.sharing,
            owner = %record.owner,
            "updated ACL"
        );
        Ok(record)
    }
}

/// Collection paths and other non-ACL endpoints are refused locally.
fn check_endpoint(path: &str) -> Result<(), AclError> {
    if is_acl_endpoint(path) {
        Ok(())
    } else {
        Err(AclError::InvalidEndpoint(format!(
            "{path}, must end with /acl or /_acl"
        )))
    }
}

fn not_found_as_invalid(err: RestError, path: &str) -> AclError {
    match err.status() {
        Some(404) => AclError::InvalidEndpoint(path.to_string()),
        _ => AclError::Rest(err),
    }
}

fn first_acl(list: EntryList, path: &str) -> Result<AclRecord, AclError> {
    list.into_first()
        .and_then(|entry| entry.acl)
        .ok_or_else(|| AclError::EmptyResponse(path.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
