//! Access-control list records and sparse ACL updates.
//!
//! splunkd exposes the ACL of most configuration objects at
//! `<object path>/acl` (or `/_acl` for some conf endpoints).  A GET returns the
//! full record inside `entry[0].acl`; a POST accepts a subset of fields and
//! answers with the resulting full record.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sharing scope of a knowledge object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sharing {
    User,
    App,
    Global,
    System,
}

impl Sharing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sharing::User => "user",
            Sharing::App => "app",
            Sharing::Global => "global",
            Sharing::System => "system",
        }
    }
}

impl fmt::Display for Sharing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of `user`, `app`, `global`, `system`.
#[derive(Debug, Error, PartialEq)]
#[error("unknown sharing scope: {0:?}")]
pub struct UnknownSharing(pub String);

impl FromStr for Sharing {
    type Err = UnknownSharing;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Sharing::User),
            "app" => Ok(Sharing::App),
            "global" => Ok(Sharing::Global),
            "system" => Ok(Sharing::System),
            other => Err(UnknownSharing(other.to_string())),
        }
    }
}

/// Read and write principal lists.  `"*"` means everyone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclPerms {
    #[serde(default)]
    pub read: Vec<String>,
    #[serde(default)]
    pub write: Vec<String>,
}

/// The `acl` block of a splunkd entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclRecord {
    #[serde(default)]
    pub app: String,
    #[serde(default)]
    pub owner: String,
    pub sharing: Sharing,
    /// `null` for objects that carry no explicit permissions.
    #[serde(default)]
    pub perms: Option<AclPerms>,
    #[serde(default)]
    pub modifiable: bool,
    #[serde(default)]
    pub removable: bool,
    #[serde(default)]
    pub can_write: bool,
    #[serde(default)]
    pub can_list: bool,
    #[serde(default)]
    pub can_change_perms: bool,
    #[serde(default)]
    pub can_share_user: bool,
    #[serde(default)]
    pub can_share_app: bool,
    #[serde(default)]
    pub can_share_global: bool,
}

impl AclRecord {
    /// Read principals, empty when the record has no `perms`.
    pub fn read(&self) -> &[String] {
        self.perms.as_ref().map(|p| p.read.as_slice()).unwrap_or(&[])
    }

    /// Write principals, empty when the record has no `perms`.
    pub fn write(&self) -> &[String] {
        self.perms.as_ref().map(|p| p.write.as_slice()).unwrap_or(&[])
    }
}

/// A sparse ACL patch.  Only the fields set here are sent to splunkd; every
/// other field keeps its server-side value.
///
/// ```rust
/// use solnlib_core::acl::{AclUpdate, Sharing};
///
/// let update = AclUpdate::new().perms_read(["admin"]);
/// let form = update.to_form(Sharing::Global);
/// assert_eq!(
///     form,
///     vec![
///         ("perms.read".to_string(), "admin".to_string()),
///         ("sharing".to_string(), "global".to_string()),
///     ]
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AclUpdate {
    pub owner: Option<String>,
    pub sharing: Option<Sharing>,
    pub perms_read: Option<Vec<String>>,
    pub perms_write: Option<Vec<String>>,
}

impl AclUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn sharing(mut self, sharing: Sharing) -> Self {
        self.sharing = Some(sharing);
        self
    }

    pub fn perms_read<I, S>(mut self, principals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.perms_read = Some(principals.into_iter().map(Into::into).collect());
        self
    }

    pub fn perms_write<I, S>(mut self, principals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.perms_write = Some(principals.into_iter().map(Into::into).collect());
        self
    }

    /// `true` when no field was supplied.
    pub fn is_empty(&self) -> bool {
        self.owner.is_none()
            && self.sharing.is_none()
            && self.perms_read.is_none()
            && self.perms_write.is_none()
    }

    /// Builds the POST form for this patch.
    ///
    /// splunkd rejects ACL posts without `sharing`, so the caller passes the
    /// record's current scope; an explicitly supplied scope takes precedence.
    /// Principal lists are sent comma-joined.
    pub fn to_form(&self, current_sharing: Sharing) -> Vec<(String, String)> {
        let mut form = Vec::new();
        if let Some(owner) = &self.owner {
            form.push(("owner".to_string(), owner.clone()));
        }
        if let Some(read) = &self.perms_read {
            form.push(("perms.read".to_string(), read.join(",")));
        }
        if let Some(write) = &self.perms_write {
            form.push(("perms.write".to_string(), write.join(",")));
        }
        let sharing = self.sharing.unwrap_or(current_sharing);
        form.push(("sharing".to_string(), sharing.as_str().to_string()));
        form
    }
}

/// `true` when `path` addresses an ACL endpoint (`.../acl` or `.../_acl`).
pub fn is_acl_endpoint(path: &str) -> bool {
    let path = path.trim_end_matches('/');
    path.ends_with("/acl") || path.ends_with("/_acl")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const ACL_JSON: &str = r#"{"sharing": "global", "perms": {"read": ["*"], "write": ["*"]}, "app": "unittest", "modifiable": true, "owner": "nobody", "can_change_perms": true, "can_share_global": true, "can_list": true, "can_share_user": false, "can_share_app": true, "removable": false, "can_write": true}"#;

    #[test]
    fn test_acl_record_deserializes_full_splunkd_block() {
        let record: AclRecord = serde_json::from_str(ACL_JSON).expect("deserialize");

        assert_eq!(record.sharing, Sharing::Global);
        assert_eq!(record.owner, "nobody");
        assert_eq!(record.app, "unittest");
        assert_eq!(record.read(), ["*"]);
        assert_eq!(record.write(), ["*"]);
        assert!(record.can_change_perms);
        assert!(!record.can_share_user);
    }

    #[test]
    fn test_acl_record_accepts_null_perms_and_missing_flags() {
        let record: AclRecord =
            serde_json::from_str(r#"{"sharing": "app", "perms": null, "owner": "admin"}"#)
                .expect("deserialize");

        assert_eq!(record.perms, None);
        assert!(record.read().is_empty());
        assert!(!record.modifiable);
    }

    #[test]
    fn test_empty_update_sends_only_current_sharing() {
        let form = AclUpdate::new().to_form(Sharing::App);
        assert_eq!(form, vec![("sharing".to_string(), "app".to_string())]);
    }

    #[test]
    fn test_update_form_contains_only_supplied_fields() {
        let form = AclUpdate::new().perms_write(["admin", "power"]).to_form(Sharing::Global);

        assert!(form.contains(&("perms.write".to_string(), "admin,power".to_string())));
        assert!(!form.iter().any(|(k, _)| k == "perms.read"));
        assert!(!form.iter().any(|(k, _)| k == "owner"));
    }

    #[test]
    fn test_explicit_sharing_overrides_current() {
        let form = AclUpdate::new()
            .owner("admin")
            .sharing(Sharing::User)
            .to_form(Sharing::Global);

        assert_eq!(
            form,
            vec![
                ("owner".to_string(), "admin".to_string()),
                ("sharing".to_string(), "user".to_string()),
            ]
        );
    }

    #[test]
    fn test_is_empty_tracks_supplied_fields() {
        assert!(AclUpdate::new().is_empty());
        assert!(!AclUpdate::new().perms_read(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn test_is_acl_endpoint() {
        assert!(is_acl_endpoint("data/transforms/extractions/_acl"));
        assert!(is_acl_endpoint("saved/searches/foo/acl"));
        assert!(is_acl_endpoint("saved/searches/foo/acl/"));
        assert!(!is_acl_endpoint("data/transforms/extractions"));
        assert!(!is_acl_endpoint("saved/searches/oracle"));
    }

    #[test]
    fn test_sharing_parses_and_displays() {
        assert_eq!("system".parse::<Sharing>(), Ok(Sharing::System));
        assert_eq!(Sharing::Global.to_string(), "global");
        assert!("everyone".parse::<Sharing>().is_err());
    }
}
