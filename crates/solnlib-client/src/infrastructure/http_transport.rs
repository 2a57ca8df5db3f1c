//! reqwest-backed [`RestTransport`].
//!
//! A single blocking `reqwest::blocking::Client` is built at construction and
//! reused for every request, so connections are pooled by reqwest.  TLS
//! verification is usually disabled against splunkd, whose management port
//! ships with a self-signed certificate; [`ClientConfig::verify_tls`] turns it
//! back on.

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use tracing::{debug, trace};

use crate::application::rest_client::{
    Method, RequestBody, RestError, RestRequest, RestResponse, RestTransport, SessionKey,
    SplunkRestClient,
};
use crate::infrastructure::config::ClientConfig;

/// HTTP transport over `reqwest::blocking`.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds a transport with the timeout and TLS settings of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::Transport`] if the TLS backend cannot be
    /// initialised.
    pub fn new(config: &ClientConfig) -> Result<Self, RestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| RestError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

/// Builds a [`SplunkRestClient`] over HTTP from `config`.
///
/// Pass `None` as `session_key` to get a client suitable for
/// [`login`](crate::application::credentials::login).
pub fn connect(
    config: &ClientConfig,
    session_key: Option<SessionKey>,
) -> Result<SplunkRestClient, RestError> {
    let transport = HttpTransport::new(config)?;
    debug!(base = %config.base_url(), owner = %config.owner, app = ?config.app, "connecting to splunkd");
    SplunkRestClient::new(
        &config.base_url(),
        session_key,
        config.namespace(),
        Arc::new(transport),
    )
}

impl RestTransport for HttpTransport {
    fn send(&self, request: &RestRequest) -> Result<RestResponse, RestError> {
        let builder = match request.method {
            Method::Get => self.client.get(request.url.clone()),
            Method::Post => self.client.post(request.url.clone()),
            Method::Delete => self.client.delete(request.url.clone()),
        };

        let mut builder = builder.query(&request.query);
        if let Some(key) = &request.session_key {
            let value = HeaderValue::from_str(&format!("Splunk {}", key.as_str()))
                .map_err(|e| RestError::Transport(format!("invalid session key: {e}")))?;
            builder = builder.header(AUTHORIZATION, value);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Form(pairs) => builder.form(pairs),
            RequestBody::Json(doc) => builder.json(doc),
        };

        let response = builder
            .send()
            .map_err(|e| RestError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| RestError::Transport(e.to_string()))?;
        trace!(status, bytes = body.len(), "splunkd response");

        Ok(RestResponse { status, body })
    }
}
