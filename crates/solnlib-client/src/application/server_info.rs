//! ServerInfo: a snapshot of `/services/server/info`.

use serde_json::{Map, Value};
use solnlib_core::rest::{EntryList, Namespace};
use thiserror::Error;
use tracing::debug;

use crate::application::rest_client::{RestError, SplunkRestClient};

const SERVER_INFO_PATH: &str = "/services/server/info";
const CAPTAIN_INFO_PATH: &str = "/services/shcluster/captain/info";

/// Error type for server info lookups.
#[derive(Debug, Error)]
pub enum ServerInfoError {
    #[error("{path} returned no entry")]
    EmptyResponse { path: String },

    #[error(transparent)]
    Rest(#[from] RestError),
}

/// Server properties fetched once; accessors read the snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerInfo {
    content: Map<String, Value>,
}

impl ServerInfo {
    /// Fetches `server/info`.  The client's namespace is ignored: the
    /// endpoint is global.
    pub fn fetch(client: &SplunkRestClient) -> Result<Self, ServerInfoError> {
        let content = first_content(client, SERVER_INFO_PATH)?;
        let info = Self { content };
        debug!(server = info.server_name().unwrap_or("?"), "fetched server info");
        Ok(info)
    }

    /// Wraps an already-fetched `content` mapping.
    pub fn from_content(content: Map<String, Value>) -> Self {
        Self { content }
    }

    /// The raw `content` mapping.
    pub fn content(&self) -> &Map<String, Value> {
        &self.content
    }

    fn str_field(&self, name: &str) -> Option<&str> {
        self.content.get(name).and_then(Value::as_str)
    }

    pub fn server_name(&self) -> Option<&str> {
        self.str_field("serverName")
    }

    pub fn guid(&self) -> Option<&str> {
        self.str_field("guid")
    }

    pub fn version(&self) -> Option<&str> {
        self.str_field("version")
    }

    pub fn server_roles(&self) -> Vec<&str> {
        self.content
            .get("server_roles")
            .and_then(Value::as_array)
            .map(|roles| roles.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    fn has_role(&self, role: &str) -> bool {
        self.server_roles().contains(&role)
    }

    pub fn is_search_head(&self) -> bool {
        self.has_role("search_head")
    }

    /// Member (or captain) of a search head cluster.
    pub fn is_shc_member(&self) -> bool {
        self.has_role("shc_member") || self.has_role("shc_captain")
    }

    pub fn is_captain(&self) -> bool {
        self.has_role("shc_captain")
    }

    /// Splunk Cloud stacks report `instance_type = cloud`.
    pub fn is_cloud_instance(&self) -> bool {
        self.str_field("instance_type") == Some("cloud")
    }
}

/// The `content` of `shcluster/captain/info` (`label`, `mgmt_uri`, ...).
pub fn captain_info(client: &SplunkRestClient) -> Result<Map<String, Value>, ServerInfoError> {
    first_content(client, CAPTAIN_INFO_PATH)
}

fn first_content(
    client: &SplunkRestClient,
    path: &str,
) -> Result<Map<String, Value>, ServerInfoError> {
    let client = client.with_namespace(Namespace::global());
    let list: EntryList = client.get_entries(path, &[])?;
    list.into_first()
        .and_then(|e| e.content)
        .ok_or_else(|| ServerInfoError::EmptyResponse {
            path: path.to_string(),
        })
}
