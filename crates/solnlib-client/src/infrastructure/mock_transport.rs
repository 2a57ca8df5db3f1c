//! Scripted transport for tests and offline development.
//!
//! `RecordingTransport` implements [`RestTransport`] from the public API, so
//! integration tests and downstream crates can drive any manager without a
//! splunkd.  It answers from a queue of canned responses per
//! `(method, path)` and records every request for later inspection.
//!
//! # Usage
//!
//! ```ignore
//! let transport = Arc::new(RecordingTransport::new());
//! transport.respond(Method::Get, "/servicesNS/nobody/unittest/x/_acl", 200, ACL_JSON);
//!
//! let manager = AclManager::new(client_over(transport.clone()));
//! manager.get("x/_acl")?;
//!
//! assert_eq!(transport.requests().len(), 1);
//! ```
//!
//! Unscripted requests answer `404` with a splunkd-style message body.
//! A path may be scripted several times; responses are consumed in order and
//! the last one is repeated.  Paths are matched in their percent-encoded form.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::application::rest_client::{
    Method, RestError, RestRequest, RestResponse, RestTransport,
};

type Responder = Box<dyn Fn(&RestRequest) -> RestResponse + Send + Sync>;

enum Scripted {
    Fixed(RestResponse),
    Dynamic(Responder),
    Fail(String),
}

/// A transport that replays scripted responses and records requests.
#[derive(Default)]
pub struct RecordingTransport {
    scripts: Mutex<HashMap<(String, String), VecDeque<Scripted>>>,
    requests: Mutex<Vec<RestRequest>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a fixed response for `method path`.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: impl Into<String>) {
        self.push(method, path, Scripted::Fixed(RestResponse::new(status, body)));
    }

    /// Queues a response computed from the request (e.g. echoing a form field).
    pub fn respond_with<F>(&self, method: Method, path: &str, responder: F)
    where
        F: Fn(&RestRequest) -> RestResponse + Send + Sync + 'static,
    {
        self.push(method, path, Scripted::Dynamic(Box::new(responder)));
    }

    /// Queues a transport failure for `method path`.
    pub fn fail(&self, method: Method, path: &str, reason: impl Into<String>) {
        self.push(method, path, Scripted::Fail(reason.into()));
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> Vec<RestRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests sent with `method`.
    pub fn requests_with(&self, method: Method) -> Vec<RestRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method)
            .collect()
    }

    fn push(&self, method: Method, path: &str, scripted: Scripted) {
        self.scripts
            .lock()
            .unwrap()
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back(scripted);
    }
}

impl RestTransport for RecordingTransport {
    fn send(&self, request: &RestRequest) -> Result<RestResponse, RestError> {
        self.requests.lock().unwrap().push(request.clone());

        let mut scripts = self.scripts.lock().unwrap();
        let key = (request.method.to_string(), request.path.clone());
        let Some(queue) = scripts.get_mut(&key) else {
            return Ok(RestResponse::new(
                404,
                format!(
                    r#"{{"messages":[{{"type":"ERROR","text":"Not Found: {} {}"}}]}}"#,
                    request.method, request.path
                ),
            ));
        };

        // Keep the last script so repeated calls see a stable answer.
        let scripted = if queue.len() > 1 {
            queue.pop_front()
        } else {
            None
        };
        let current = scripted.as_ref().or_else(|| queue.front());

        match current {
            Some(Scripted::Fixed(response)) => Ok(response.clone()),
            Some(Scripted::Dynamic(responder)) => Ok(responder(request)),
            Some(Scripted::Fail(reason)) => Err(RestError::Transport(reason.clone())),
            None => Ok(RestResponse::new(404, "{}")),
        }
    }
}
