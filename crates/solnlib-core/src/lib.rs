//! # solnlib-core
//!
//! Shared types for the Splunk solution helpers.  Nothing in this crate
//! performs I/O: it parses text handed to it and shapes requests and
//! responses, so it compiles and tests without a Splunk installation.
//!
//! - **`conf`** – Parser for `.conf` / `.meta` files with relaxed section
//!   headers (`[savedsearches/My Search]`).
//! - **`acl`** – The ACL record splunkd attaches to every entry, and the
//!   sparse update that changes only the fields a caller supplies.
//! - **`rest`** – Owner/app/sharing namespaces, path resolution and the
//!   Atom-style JSON entry lists returned with `output_mode=json`.
//! - **`credential`** – Entity naming and chunking of long secrets in
//!   `storage/passwords`.

pub mod acl;
pub mod conf;
pub mod credential;
pub mod rest;

pub use acl::{AclPerms, AclRecord, AclUpdate, Sharing};
pub use conf::{ConfFile, ConfParseError, ConfSection};
pub use rest::{Entry, EntryList, ErrorMessages, Namespace};
