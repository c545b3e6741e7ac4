//! Documents and collection handles for schemaless data access.
//!
//! This module provides the document-mapping core: a [`Document`] is a
//! mutable key-value mapping with a managed identity field, and a
//! [`Collection`] translates save/find/delete calls on documents into
//! driver operations.
//!
//! # Documents
//!
//! ```rust,ignore
//! use charm::collection::Document;
//! use charm::doc;
//!
//! // from a raw field mapping
//! let mut user = Document::from(doc! {
//!     "first_name": "Alice",
//!     "email": "alice@email.com",
//! });
//!
//! // or field by field
//! let mut user = Document::new();
//! user.put("first_name", "Alice");
//! user.put("email", "alice@email.com");
//! ```
//!
//! # Collections
//!
//! ```rust,ignore
//! let users = db.collection("users")?;
//!
//! users.save(&mut user)?;
//!
//! let hit = users.find(doc! {"first_name": "Alice"})?;
//! let alice = hit.first_or_none();
//! ```
//!
//! # Identity
//!
//! Each document carries an `_id` field. It is null until the document is
//! first persisted; the driver-generated identity is written back on
//! insert, and later saves replace the stored record under that identity.
//!
//! # Auto-increment sequences
//!
//! [`Collection::next_sequence`] and the auto-field [`SaveOptions`] emulate
//! auto-incrementing keys through a `counters` collection holding one
//! record per sequence: `{_id: <sequence name>, sequence_value: <n>}`.

#[allow(clippy::module_inception)]
mod collection;
mod document;
pub mod save_options;
mod save_result;

pub use collection::Collection;
pub use document::Document;
pub use save_options::SaveOptions;
pub use save_result::SaveResult;
