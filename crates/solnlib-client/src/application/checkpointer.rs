//! KvStoreCheckpointer: key/state checkpoints persisted in a KV store collection.
//!
//! Each checkpoint is one document `{"_key": <key>, "state": <json text>}`.
//! The state is stored as a JSON string so any `serde_json::Value` fits the
//! collection's single `state: string` field.

use serde_json::{json, Value};
use tracing::debug;

use crate::application::kvstore::{CollectionData, KvStoreError, KvStoreManager};
use crate::application::rest_client::SplunkRestClient;

/// Checkpoint store backed by one KV store collection.
#[derive(Debug, Clone)]
pub struct KvStoreCheckpointer {
    data: CollectionData,
}

impl KvStoreCheckpointer {
    /// Opens `collection_name`, creating it on first use.
    pub fn new(collection_name: &str, client: SplunkRestClient) -> Result<Self, KvStoreError> {
        let data = KvStoreManager::new(client)
            .get_collection_data(collection_name, &[("state", "string")])?;
        Ok(Self { data })
    }

    /// Saves `state` under `key`, replacing any previous value.
    pub fn update(&self, key: &str, state: &Value) -> Result<(), KvStoreError> {
        self.data.batch_save(&[document(key, state)])?;
        debug!(collection = %self.data.name(), key, "checkpoint updated");
        Ok(())
    }

    /// Saves several `(key, state)` pairs in one request.
    pub fn batch_update(&self, states: &[(&str, Value)]) -> Result<(), KvStoreError> {
        let docs: Vec<Value> = states.iter().map(|(k, s)| document(k, s)).collect();
        self.data.batch_save(&docs)?;
        Ok(())
    }

    /// The state saved under `key`, or `None` if there is none.
    pub fn get(&self, key: &str) -> Result<Option<Value>, KvStoreError> {
        let doc = match self.data.query_by_id(key) {
            Ok(doc) => doc,
            Err(KvStoreError::RecordNotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        let Some(text) = doc.get("state").and_then(Value::as_str) else {
            return Err(KvStoreError::UnexpectedResponse {
                path: format!("{}/{key}", self.data.name()),
                detail: "checkpoint without string state".to_string(),
            });
        };
        serde_json::from_str(text)
            .map(Some)
            .map_err(|e| KvStoreError::UnexpectedResponse {
                path: format!("{}/{key}", self.data.name()),
                detail: format!("state is not JSON: {e}"),
            })
    }

    /// Removes the checkpoint under `key`; missing keys are not an error.
    pub fn delete(&self, key: &str) -> Result<(), KvStoreError> {
        match self.data.delete_by_id(key) {
            Ok(()) | Err(KvStoreError::RecordNotFound { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

fn document(key: &str, state: &Value) -> Value {
    json!({ "_key": key, "state": state.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::rest_client::{Method, MockRestTransport, RequestBody, RestResponse};
    use solnlib_core::rest::Namespace;
    use std::sync::Arc;

    /// Mock that already knows the collection, so construction costs one GET.
    fn checkpointer(mut mock: MockRestTransport) -> KvStoreCheckpointer {
        mock.expect_send()
            .withf(|req| req.path.contains("/storage/collections/config/"))
            .times(1)
            .returning(|_| Ok(RestResponse::ok(r#"{"entry":[{"name":"ckpt"}]}"#)));
        let client = SplunkRestClient::new(
            "https://127.0.0.1:8089",
            None,
            Namespace::new("nobody", "unittest"),
            Arc::new(mock),
        )
        .expect("client");
        KvStoreCheckpointer::new("ckpt", client).expect("checkpointer")
    }

    #[test]
    fn test_update_stores_state_as_json_text() {
        let mut mock = MockRestTransport::new();
        mock.expect_send()
            .withf(|req| {
                req.method == Method::Post
                    && matches!(&req.body, RequestBody::Json(Value::Array(docs))
                        if docs[0]["_key"] == "input1" && docs[0]["state"] == r#"{"offset":42}"#)
            })
            .times(1)
            .returning(|_| Ok(RestResponse::ok(r#"["input1"]"#)));

        checkpointer(mock)
            .update("input1", &json!({"offset": 42}))
            .unwrap();
    }

    #[test]
    fn test_get_decodes_state() {
        let mut mock = MockRestTransport::new();
        mock.expect_send()
            .withf(|req| req.path.ends_with("/storage/collections/data/ckpt/input1"))
            .returning(|_| Ok(RestResponse::ok(r#"{"_key":"input1","state":"{\"offset\":42}"}"#)));

        let state = checkpointer(mock).get("input1").unwrap();

        assert_eq!(state, Some(json!({"offset": 42})));
    }

    #[test]
    fn test_get_missing_key_is_none() {
        let mut mock = MockRestTransport::new();
        mock.expect_send()
            .withf(|req| req.path.contains("/storage/collections/data/"))
            .returning(|_| Ok(RestResponse::new(404, "{}")));

        assert_eq!(checkpointer(mock).get("never").unwrap(), None);
    }

    #[test]
    fn test_delete_missing_key_is_ok() {
        let mut mock = MockRestTransport::new();
        mock.expect_send()
            .withf(|req| req.method == Method::Delete)
            .returning(|_| Ok(RestResponse::new(404, "{}")));

        checkpointer(mock).delete("never").unwrap();
    }

    #[test]
    fn test_batch_update_sends_all_documents() {
        let mut mock = MockRestTransport::new();
        mock.expect_send()
            .withf(|req| matches!(&req.body, RequestBody::Json(Value::Array(docs)) if docs.len() == 3))
            .times(1)
            .returning(|_| Ok(RestResponse::ok(r#"["a","b","c"]"#)));

        checkpointer(mock)
            .batch_update(&[("a", json!(1)), ("b", json!(2)), ("c", json!(3))])
            .unwrap();
    }
}
