//! Atom-style JSON bodies returned by splunkd with `output_mode=json`.
//!
//! ```json
//! {
//!   "entry": [
//!     { "name": "transforms", "author": "nobody",
//!       "content": { ... }, "acl": { ... } }
//!   ],
//!   "paging": { "total": 1, "perPage": 30, "offset": 0 },
//!   "messages": []
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::acl::AclRecord;

/// A list response.  `content` stays generic so each resource picks its own
/// shape (or keeps the raw mapping).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EntryList<C = Map<String, Value>> {
    #[serde(default = "Vec::new")]
    pub entry: Vec<Entry<C>>,
    #[serde(default)]
    pub paging: Option<Paging>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl<C> EntryList<C> {
    pub fn first(&self) -> Option<&Entry<C>> {
        self.entry.first()
    }

    pub fn into_first(self) -> Option<Entry<C>> {
        self.entry.into_iter().next()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Entry<C = Map<String, Value>> {
    pub name: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    pub content: Option<C>,
    #[serde(default)]
    pub acl: Option<AclRecord>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Paging {
    pub total: u64,
    #[serde(rename = "perPage")]
    pub per_page: u64,
    pub offset: u64,
}

/// One item of a `messages` array.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// Error body of a failed request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ErrorMessages {
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl ErrorMessages {
    /// Best-effort decode of an error body; non-JSON bodies yield no messages.
    pub fn from_body(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    /// Message texts joined with `; `.
    pub fn joined(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.text.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::Sharing;

    const ACL_RESPONSE: &str = r#"{"entry": [{"author": "nobody", "name": "transforms", "acl": {"sharing": "global", "perms": {"read": ["*"], "write": ["*"]}, "app": "unittest", "modifiable": true, "owner": "nobody", "can_change_perms": true, "can_share_global": true, "can_list": true, "can_share_user": false, "can_share_app": true, "removable": false, "can_write": true}}]}"#;

    #[test]
    fn test_entry_list_without_content_decodes_acl() {
        let list: EntryList = serde_json::from_str(ACL_RESPONSE).expect("decode");

        let entry = list.first().expect("one entry");
        assert_eq!(entry.name, "transforms");
        assert_eq!(entry.author.as_deref(), Some("nobody"));
        assert!(entry.content.is_none());
        assert_eq!(entry.acl.as_ref().map(|a| a.sharing), Some(Sharing::Global));
    }

    #[test]
    fn test_entry_list_with_typed_content() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Info {
            version: String,
        }

        let body = r#"{"entry":[{"name":"server-info","content":{"version":"9.1.2","extra":1}}],
            "paging":{"total":1,"perPage":30,"offset":0}}"#;
        let list: EntryList<Info> = serde_json::from_str(body).expect("decode");

        assert_eq!(list.paging.as_ref().map(|p| p.per_page), Some(30));
        let entry = list.into_first().expect("entry");
        assert_eq!(entry.content, Some(Info { version: "9.1.2".into() }));
    }

    #[test]
    fn test_missing_entry_array_decodes_as_empty() {
        let list: EntryList = serde_json::from_str("{}").expect("decode");
        assert!(list.first().is_none());
    }

    #[test]
    fn test_error_messages_joined() {
        let body = r#"{"messages":[{"type":"ERROR","text":"Not Found"},{"type":"WARN","text":"again"}]}"#;
        assert_eq!(ErrorMessages::from_body(body).joined(), "Not Found; again");
    }

    #[test]
    fn test_error_messages_tolerate_non_json() {
        assert!(ErrorMessages::from_body("<html>502</html>").messages.is_empty());
    }
}
