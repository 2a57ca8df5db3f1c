//! solnlib-client library entry point.
//!
//! Helpers a Splunk add-on calls at run time: read its own `local.meta`,
//! change the ACL of a knowledge object, store secrets in `storage/passwords`,
//! keep checkpoints in the KV store and ask splunkd what kind of node it is.
//!
//! # How the pieces fit
//!
//! Every REST-backed manager takes a [`SplunkRestClient`], which pairs a
//! session (base URL, session key, namespace) with a [`RestTransport`].
//!
//! 1. Load a [`ClientConfig`] (or build one) and create an [`HttpTransport`].
//! 2. Log in with [`login`] or reuse the session key splunkd handed the
//!    modular input.
//! 3. Build a client in the add-on's namespace and hand clones of it to the
//!    managers.
//!
//! Tests swap the transport for a [`RecordingTransport`].
//!
//! [`SplunkRestClient`]: application::rest_client::SplunkRestClient
//! [`RestTransport`]: application::rest_client::RestTransport
//! [`ClientConfig`]: infrastructure::config::ClientConfig
//! [`HttpTransport`]: infrastructure::http_transport::HttpTransport
//! [`login`]: application::credentials::login
//! [`RecordingTransport`]: infrastructure::mock_transport::RecordingTransport

/// Application layer: REST client and the resource managers built on it.
pub mod application;

/// Infrastructure layer: HTTP, local installation, config and logging.
pub mod infrastructure;

pub use solnlib_core::{AclPerms, AclRecord, AclUpdate, Namespace, Sharing};
