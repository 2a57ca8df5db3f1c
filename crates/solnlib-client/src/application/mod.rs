//! Application layer use cases.
//!
//! - **`rest_client`** – `SplunkRestClient` and the `RestTransport` trait it
//!   sends through.  Every manager below takes a client at construction; the
//!   transport implementation is injected, never chosen here.
//! - **`metadata`** – Typed lookups into an app's `local.meta`.
//! - **`acl`** – Read and sparse-update object ACLs.
//! - **`credentials`** – `storage/passwords` with transparent chunking, and
//!   `auth/login`.
//! - **`kvstore`** – KV store collections and documents.
//! - **`checkpointer`** – Key/state checkpoints on top of `kvstore`.
//! - **`server_info`** – `server/info` snapshot and cluster role checks.

pub mod acl;
pub mod checkpointer;
pub mod credentials;
pub mod kvstore;
pub mod metadata;
pub mod rest_client;
pub mod server_info;
