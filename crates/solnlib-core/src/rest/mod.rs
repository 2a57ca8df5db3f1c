//! splunkd REST conventions shared by every resource manager.

pub mod entries;
pub mod namespace;

pub use entries::{Entry, EntryList, ErrorMessages, Message, Paging};
pub use namespace::{encode_path, encode_segment, Namespace};
