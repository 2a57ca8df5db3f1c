//! SplunkRestClient: the binding every manager issues its requests through.
//!
//! The client owns the immutable parts of a session (base URL, session key,
//! namespace) and delegates the actual HTTP exchange to a [`RestTransport`]
//! trait object injected at construction time.  Production code uses the
//! reqwest-backed transport in the infrastructure layer; tests inject a mock.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use solnlib_core::rest::{encode_path, EntryList, ErrorMessages, Namespace};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Error type for REST exchanges.
#[derive(Debug, Error)]
pub enum RestError {
    /// The request never produced an HTTP response (DNS, TLS, timeout...).
    #[error("transport error: {0}")]
    Transport(String),

    /// splunkd answered with a non-success status.
    #[error("HTTP {status} from {path}: {message}")]
    Http {
        status: u16,
        path: String,
        message: String,
    },

    /// The response body was not the expected JSON.
    #[error("failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The base URL or a resolved path could not be parsed.
    #[error("invalid URL {0:?}")]
    InvalidUrl(String),
}

impl RestError {
    /// HTTP status code, if splunkd answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            RestError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// HTTP verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        })
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// `application/x-www-form-urlencoded` pairs (conf and ACL endpoints).
    Form(Vec<(String, String)>),
    /// `application/json` document (KV store endpoints).
    Json(Value),
}

/// An opaque session token returned by `auth/login`.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKey(***)")
    }
}

/// A fully resolved request handed to a [`RestTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RestRequest {
    pub method: Method,
    /// Absolute URL without the query string.
    pub url: Url,
    /// Resolved path (`/servicesNS/...`), kept for logging and test matching.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    /// Sent as `Authorization: Splunk <key>` when present.
    pub session_key: Option<SessionKey>,
}

impl RestRequest {
    /// Value of query parameter `name`, if present.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Value of form field `name`, if the body is a form.
    pub fn form_param(&self, name: &str) -> Option<&str> {
        match &self.body {
            RequestBody::Form(pairs) => pairs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }
}

/// Raw response: status code and body text.
#[derive(Debug, Clone, PartialEq)]
pub struct RestResponse {
    pub status: u16,
    pub body: String,
}

impl RestResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues one HTTP exchange.
///
/// Implementations must not retry; a failed exchange is reported as-is.
#[cfg_attr(test, mockall::automock)]
pub trait RestTransport: Send + Sync {
    /// Sends `request` and returns the response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::Transport`] when no response was received.
    fn send(&self, request: &RestRequest) -> Result<RestResponse, RestError>;
}

/// A session bound to one splunkd endpoint and namespace.
///
/// Cloning is cheap: the transport is shared through an `Arc`.
#[derive(Clone)]
pub struct SplunkRestClient {
    base: Url,
    session_key: Option<SessionKey>,
    namespace: Namespace,
    transport: Arc<dyn RestTransport>,
}

impl fmt::Debug for SplunkRestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SplunkRestClient")
            .field("base", &self.base.as_str())
            .field("session_key", &self.session_key)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl SplunkRestClient {
    /// Creates a client for `base` (e.g. `https://127.0.0.1:8089`).
    ///
    /// # Errors
    ///
    /// Returns [`RestError::InvalidUrl`] if `base` is not an absolute URL.
    pub fn new(
        base: &str,
        session_key: Option<SessionKey>,
        namespace: Namespace,
        transport: Arc<dyn RestTransport>,
    ) -> Result<Self, RestError> {
        let base = Url::parse(base).map_err(|_| RestError::InvalidUrl(base.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(RestError::InvalidUrl(base.to_string()));
        }
        Ok(Self {
            base,
            session_key,
            namespace,
            transport,
        })
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Returns a client for the same session in another namespace.
    pub fn with_namespace(&self, namespace: Namespace) -> Self {
        Self {
            namespace,
            ..self.clone()
        }
    }

    /// Builds the request for `path` without sending it.
    ///
    /// Each `/`-separated segment of `path` is percent-encoded, so object
    /// names are passed raw.  `output_mode=json` is always appended to the
    /// query.
    pub fn build_request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: RequestBody,
    ) -> Result<RestRequest, RestError> {
        let path = self.namespace.abs_path(&encode_path(path));
        let url = self
            .base
            .join(&path)
            .map_err(|_| RestError::InvalidUrl(path.clone()))?;

        let mut pairs: Vec<(String, String)> = query
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        pairs.push(("output_mode".to_string(), "json".to_string()));

        Ok(RestRequest {
            method,
            url,
            path,
            query: pairs,
            body,
            session_key: self.session_key.clone(),
        })
    }

    /// Sends a request and returns the body of a successful response.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::Http`] for any non-2xx status, carrying the
    /// splunkd message texts, and passes transport errors through.
    pub fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: RequestBody,
    ) -> Result<String, RestError> {
        let request = self.build_request(method, path, query, body)?;
        debug!(method = %request.method, path = %request.path, "splunkd request");

        let response = self.transport.send(&request)?;
        if !response.is_success() {
            let messages = ErrorMessages::from_body(&response.body);
            debug!(status = response.status, path = %request.path, "splunkd error response");
            return Err(RestError::Http {
                status: response.status,
                path: request.path,
                message: messages.joined(),
            });
        }
        Ok(response.body)
    }

    /// GET `path` and decode the body as JSON.
    pub fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, RestError> {
        let body = self.request(Method::Get, path, query, RequestBody::Empty)?;
        decode(path, &body)
    }

    /// POST `body` to `path` and decode the response as JSON.
    pub fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: RequestBody,
    ) -> Result<T, RestError> {
        let text = self.request(Method::Post, path, query, body)?;
        decode(path, &text)
    }

    /// GET `path` as an Atom entry list.
    pub fn get_entries<C: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<EntryList<C>, RestError> {
        self.get_json(path, query)
    }

    /// POST a form to `path` and decode the returned entry list.
    pub fn post_form<C: DeserializeOwned>(
        &self,
        path: &str,
        form: Vec<(String, String)>,
    ) -> Result<EntryList<C>, RestError> {
        self.post_json(path, &[], RequestBody::Form(form))
    }

    /// DELETE `path`, discarding the body.
    pub fn delete(&self, path: &str, query: &[(&str, &str)]) -> Result<(), RestError> {
        self.request(Method::Delete, path, query, RequestBody::Empty)?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(path: &str, body: &str) -> Result<T, RestError> {
    serde_json::from_str(body).map_err(|source| RestError::Decode {
        path: path.to_string(),
        source,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
