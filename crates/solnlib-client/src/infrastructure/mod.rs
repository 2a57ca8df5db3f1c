//! Infrastructure layer.
//!
//! Contains the adapters the application layer is wired to: the HTTP
//! transport, the scripted transport used by tests, the local Splunk
//! installation, logging setup and the TOML client config.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `solnlib_core`, but MUST NOT be imported by the `application` layer except
//! for the environment paths the metadata reader resolves.
//!
//! # Sub-modules
//!
//! - **`http_transport`** – `RestTransport` over `reqwest::blocking`.
//! - **`mock_transport`** – `RecordingTransport`, canned responses plus a
//!   request log.
//! - **`splunkenv`** – `SPLUNK_HOME` paths and splunkd access info.
//! - **`config`** – `ClientConfig` loaded from TOML.
//! - **`logging`** – `tracing-subscriber` initialisation.

pub mod config;
pub mod http_transport;
pub mod logging;
pub mod mock_transport;
pub mod splunkenv;
