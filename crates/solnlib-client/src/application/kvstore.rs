//! KV store collections: configuration and data access.
//!
//! - `storage/collections/config[/<name>]` – create, list and delete collections.
//! - `storage/collections/data/<name>[/<key>]` – JSON documents inside one.
//!
//! Data endpoints speak plain JSON (arrays of documents, `{"_key": ...}`),
//! not the Atom entry lists used by the rest of splunkd.

use serde_json::{Map, Value};
use solnlib_core::rest::EntryList;
use thiserror::Error;
use tracing::{debug, info};

use crate::application::rest_client::{RequestBody, RestError, SplunkRestClient};

const CONFIG_PATH: &str = "storage/collections/config";
const DATA_PATH: &str = "storage/collections/data";

/// Error type for KV store operations.
#[derive(Debug, Error)]
pub enum KvStoreError {
    /// No document with this `_key`.
    #[error("record {key:?} not found in collection {collection:?}")]
    RecordNotFound { collection: String, key: String },

    /// The collection does not exist.
    #[error("collection {0:?} not found")]
    CollectionNotFound(String),

    /// splunkd returned a document of an unexpected shape.
    #[error("unexpected response from {path}: {detail}")]
    UnexpectedResponse { path: String, detail: String },

    #[error(transparent)]
    Rest(#[from] RestError),
}

/// Creates, inspects and deletes collections in the client's app.
#[derive(Debug, Clone)]
pub struct KvStoreManager {
    client: SplunkRestClient,
}

impl KvStoreManager {
    pub fn new(client: SplunkRestClient) -> Self {
        Self { client }
    }

    /// `true` if a collection called `name` exists.
    pub fn collection_exists(&self, name: &str) -> Result<bool, KvStoreError> {
        let path = format!("{CONFIG_PATH}/{name}");
        match self.client.get_entries::<Value>(&path, &[]) {
            Ok(list) => Ok(!list.entry.is_empty()),
            Err(e) if e.status() == Some(404) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Names of all collections visible in this namespace.
    pub fn list_collections(&self) -> Result<Vec<String>, KvStoreError> {
        let list: EntryList<Value> = self.client.get_entries(CONFIG_PATH, &[("count", "-1")])?;
        Ok(list.entry.into_iter().map(|e| e.name).collect())
    }

    /// Creates `name` with typed `fields` (`("state", "string")`, ...).
    pub fn create_collection(&self, name: &str, fields: &[(&str, &str)]) -> Result<(), KvStoreError> {
        let mut form = vec![("name".to_string(), name.to_string())];
        form.extend(
            fields
                .iter()
                .map(|(field, kind)| (format!("field.{field}"), kind.to_string())),
        );
        self.client.post_form::<Value>(CONFIG_PATH, form)?;
        info!(collection = name, fields = fields.len(), "created KV store collection");
        Ok(())
    }

    /// Deletes collection `name`.
    pub fn delete_collection(&self, name: &str) -> Result<(), KvStoreError> {
        let path = format!("{CONFIG_PATH}/{name}");
        self.client.delete(&path, &[]).map_err(|e| match e.status() {
            Some(404) => KvStoreError::CollectionNotFound(name.to_string()),
            _ => e.into(),
        })?;
        info!(collection = name, "deleted KV store collection");
        Ok(())
    }

    /// Returns a data handle for `name`, creating the collection with
    /// `fields` first if it does not exist yet.
    pub fn get_collection_data(
        &self,
        name: &str,
        fields: &[(&str, &str)],
    ) -> Result<CollectionData, KvStoreError> {
        if !self.collection_exists(name)? {
            self.create_collection(name, fields)?;
        }
        Ok(CollectionData::new(self.client.clone(), name))
    }
}

/// Document access for one collection.
#[derive(Debug, Clone)]
pub struct CollectionData {
    client: SplunkRestClient,
    name: String,
    path: String,
}

impl CollectionData {
    pub fn new(client: SplunkRestClient, name: &str) -> Self {
        Self {
            client,
            name: name.to_string(),
            path: format!("{DATA_PATH}/{name}"),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn key_path(&self, key: &str) -> String {
        format!("{}/{key}", self.path)
    }

    /// Documents matching the Mongo-style `filter`, or all documents.
    pub fn query(&self, filter: Option<&Value>) -> Result<Vec<Value>, KvStoreError> {
        let filter_text = filter.map(Value::to_string);
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(text) = filter_text.as_deref() {
            query.push(("query", text));
        }
        let docs: Vec<Value> = self.client.get_json(&self.path, &query)?;
        debug!(collection = %self.name, count = docs.len(), "queried KV store");
        Ok(docs)
    }

    /// The document with `_key` `key`.
    pub fn query_by_id(&self, key: &str) -> Result<Value, KvStoreError> {
        self.client
            .get_json(&self.key_path(key), &[])
            .map_err(|e| match e.status() {
                Some(404) => KvStoreError::RecordNotFound {
                    collection: self.name.clone(),
                    key: key.to_string(),
                },
                _ => e.into(),
            })
    }

    /// Inserts `record` and returns its `_key` (server-generated unless the
    /// record carries one).
    pub fn insert(&self, record: &Value) -> Result<String, KvStoreError> {
        let response: Map<String, Value> =
            self.client
                .post_json(&self.path, &[], RequestBody::Json(record.clone()))?;
        key_of(&response).ok_or_else(|| KvStoreError::UnexpectedResponse {
            path: self.path.clone(),
            detail: "missing _key".to_string(),
        })
    }

    /// Replaces the document with `_key` `key`.
    pub fn update(&self, key: &str, record: &Value) -> Result<String, KvStoreError> {
        let path = self.key_path(key);
        let response: Map<String, Value> = self
            .client
            .post_json(&path, &[], RequestBody::Json(record.clone()))
            .map_err(|e| match e.status() {
                Some(404) => KvStoreError::RecordNotFound {
                    collection: self.name.clone(),
                    key: key.to_string(),
                },
                _ => e.into(),
            })?;
        Ok(key_of(&response).unwrap_or_else(|| key.to_string()))
    }

    /// Inserts or replaces `records` in one request; returns their keys.
    pub fn batch_save(&self, records: &[Value]) -> Result<Vec<String>, KvStoreError> {
        let path = format!("{}/batch_save", self.path);
        let keys: Vec<String> = self.client.post_json(
            &path,
            &[],
            RequestBody::Json(Value::Array(records.to_vec())),
        )?;
        debug!(collection = %self.name, count = keys.len(), "batch saved");
        Ok(keys)
    }

    /// Deletes documents matching `filter`, or every document when `None`.
    pub fn delete(&self, filter: Option<&Value>) -> Result<(), KvStoreError> {
        let filter_text = filter.map(Value::to_string);
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(text) = filter_text.as_deref() {
            query.push(("query", text));
        }
        self.client.delete(&self.path, &query)?;
        Ok(())
    }

    /// Deletes the document with `_key` `key`.
    pub fn delete_by_id(&self, key: &str) -> Result<(), KvStoreError> {
        self.client
            .delete(&self.key_path(key), &[])
            .map_err(|e| match e.status() {
                Some(404) => KvStoreError::RecordNotFound {
                    collection: self.name.clone(),
                    key: key.to_string(),
                },
                _ => e.into(),
            })
    }
}

fn key_of(response: &Map<String, Value>) -> Option<String> {
    response
        .get("_key")
        .and_then(Value::as_str)
        .map(str::to_string)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::rest_client::{Method, MockRestTransport, RestResponse};
    use serde_json::json;
    use solnlib_core::rest::Namespace;
    use std::sync::Arc;

    fn client(mock: MockRestTransport) -> SplunkRestClient {
        SplunkRestClient::new(
            "https://127.0.0.1:8089",
            None,
            Namespace::new("nobody", "unittest"),
            Arc::new(mock),
        )
        .expect("client")
    }

    #[test]
    fn test_collection_exists_false_on_404() {
        let mut mock = MockRestTransport::new();
        mock.expect_send()
            .returning(|_| Ok(RestResponse::new(404, "{}")));

        assert!(!KvStoreManager::new(client(mock)).collection_exists("ckpt").unwrap());
    }

    #[test]
    fn test_list_collections_returns_entry_names() {
        // Arrange
        let mut mock = MockRestTransport::new();
        mock.expect_send()
            .withf(|req| {
                req.method == Method::Get
                    && req.path == "/servicesNS/nobody/unittest/storage/collections/config"
                    && req.query_param("count") == Some("-1")
            })
            .times(1)
            .returning(|_| {
                Ok(RestResponse::ok(
                    r#"{"entry":[{"name":"ckpt","content":{}},{"name":"jobs","content":{}}]}"#,
                ))
            });

        // Act
        let names = KvStoreManager::new(client(mock)).list_collections().unwrap();

        // Assert
        assert_eq!(names, vec!["ckpt", "jobs"]);
    }

    #[test]
    fn test_get_collection_data_creates_missing_collection_with_fields() {
        let mut mock = MockRestTransport::new();
        mock.expect_send()
            .withf(|req| req.method == Method::Get)
            .times(1)
            .returning(|_| Ok(RestResponse::new(404, "{}")));
        mock.expect_send()
            .withf(|req| {
                req.method == Method::Post
                    && req.path == "/servicesNS/nobody/unittest/storage/collections/config"
                    && req.form_param("name") == Some("ckpt")
                    && req.form_param("field.state") == Some("string")
            })
            .times(1)
            .returning(|_| Ok(RestResponse::new(201, r#"{"entry":[]}"#)));

        let data = KvStoreManager::new(client(mock))
            .get_collection_data("ckpt", &[("state", "string")])
            .unwrap();

        assert_eq!(data.name(), "ckpt");
    }

    #[test]
    fn test_get_collection_data_skips_create_when_present() {
        let mut mock = MockRestTransport::new();
        mock.expect_send()
            .withf(|req| req.method == Method::Get)
            .times(1)
            .returning(|_| Ok(RestResponse::ok(r#"{"entry":[{"name":"ckpt","content":{}}]}"#)));

        KvStoreManager::new(client(mock))
            .get_collection_data("ckpt", &[])
            .unwrap();
    }

    #[test]
    fn test_query_sends_filter_as_json() {
        let mut mock = MockRestTransport::new();
        mock.expect_send()
            .withf(|req| req.query_param("query") == Some(r#"{"state":"done"}"#))
            .returning(|_| Ok(RestResponse::ok(r#"[{"_key":"a","state":"done"}]"#)));

        let docs = CollectionData::new(client(mock), "jobs")
            .query(Some(&json!({"state": "done"})))
            .unwrap();

        assert_eq!(docs, vec![json!({"_key": "a", "state": "done"})]);
    }

    #[test]
    fn test_insert_returns_generated_key() {
        let mut mock = MockRestTransport::new();
        mock.expect_send()
            .withf(|req| matches!(req.body, RequestBody::Json(ref v) if v["state"] == "new"))
            .returning(|_| Ok(RestResponse::new(201, r#"{"_key":"5f1e"}"#)));

        let key = CollectionData::new(client(mock), "jobs")
            .insert(&json!({"state": "new"}))
            .unwrap();

        assert_eq!(key, "5f1e");
    }

    #[test]
    fn test_query_by_id_404_is_record_not_found() {
        let mut mock = MockRestTransport::new();
        mock.expect_send()
            .withf(|req| req.path.ends_with("/storage/collections/data/jobs/missing"))
            .returning(|_| Ok(RestResponse::new(404, "{}")));

        let err = CollectionData::new(client(mock), "jobs")
            .query_by_id("missing")
            .unwrap_err();

        assert!(matches!(err, KvStoreError::RecordNotFound { ref key, .. } if key == "missing"));
    }

    #[test]
    fn test_document_key_is_encoded_once() {
        let mut mock = MockRestTransport::new();
        mock.expect_send()
            .withf(|req| req.path == "/servicesNS/nobody/unittest/storage/collections/data/jobs/host%20a%3F")
            .times(1)
            .returning(|_| Ok(RestResponse::ok(r#"{"_key":"host a?"}"#)));

        let doc = CollectionData::new(client(mock), "jobs")
            .query_by_id("host a?")
            .unwrap();

        assert_eq!(doc["_key"], "host a?");
    }

    #[test]
    fn test_batch_save_posts_array() {
        let mut mock = MockRestTransport::new();
        mock.expect_send()
            .withf(|req| {
                req.path.ends_with("/jobs/batch_save")
                    && matches!(req.body, RequestBody::Json(Value::Array(ref a)) if a.len() == 2)
            })
            .returning(|_| Ok(RestResponse::ok(r#"["a","b"]"#)));

        let keys = CollectionData::new(client(mock), "jobs")
            .batch_save(&[json!({"_key": "a"}), json!({"_key": "b"})])
            .unwrap();

        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_delete_without_filter_sends_no_query() {
        let mut mock = MockRestTransport::new();
        mock.expect_send()
            .withf(|req| req.method == Method::Delete && req.query_param("query").is_none())
            .times(1)
            .returning(|_| Ok(RestResponse::ok("")));

        CollectionData::new(client(mock), "jobs").delete(None).unwrap();
    }

    #[test]
    fn test_delete_collection_404_is_collection_not_found() {
        let mut mock = MockRestTransport::new();
        mock.expect_send()
            .returning(|_| Ok(RestResponse::new(404, "{}")));

        let err = KvStoreManager::new(client(mock))
            .delete_collection("gone")
            .unwrap_err();

        assert!(matches!(err, KvStoreError::CollectionNotFound(_)));
    }
}
