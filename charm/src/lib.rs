//! # Charm - Document Mapping for MongoDB-style Databases
//!
//! Charm is a lightweight object-document mapping layer. It lets an application
//! describe record types, bind them to named collections, and get create/read/
//! update/delete operations without touching the wire driver directly. The
//! actual database engine - replication, consistency, indexing - is delegated
//! entirely to a pluggable [`driver`] backend.
//!
//! ## Key Features
//!
//! - **Documents**: mutable field mappings with a managed `_id` identity field
//! - **Collections**: schemaless handles with save/find/delete/count operations
//! - **Repositories**: schema-validated, strongly-typed record access
//! - **Auto-increment**: sequence values emulated via an atomic counter document
//! - **Pluggable Backends**: in-memory driver in-core, MongoDB via the
//!   `charm-mongodb-adapter` crate
//! - **Clean API**: PIMPL pattern provides stable, encapsulated interface
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use charm::charm::Charm;
//! use charm::collection::Document;
//! use charm::doc;
//! use charm_mongodb_adapter::MongoDriver;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Connect to a database
//! let driver = MongoDriver::connect("mongodb://localhost:27017", "app")?;
//! let db = Charm::builder().open(driver.into_driver())?;
//!
//! // Get a collection handle
//! let users = db.collection("users")?;
//!
//! // Create and persist a document
//! let mut user = Document::from(doc! {
//!     "first_name": "Alice",
//!     "last_name": "Smith",
//!     "email": "alice@email.com",
//! });
//! users.save(&mut user)?;
//!
//! // Look it up again and mutate it
//! if let Some(mut user) = users.find(doc! {"first_name": "Alice"})?.first_or_none().cloned() {
//!     user.put("first_name", "Bob");
//!     users.save(&mut user)?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`charm`] - Core database facade
//! - [`charm_builder`] - Connection builder with retry handling
//! - [`collection`] - Documents, collection handles, and save options
//! - [`common`] - Shared types and constants
//! - [`driver`] - Backend abstraction and the in-memory driver
//! - [`errors`] - Error types and result definitions
//! - [`repository`] - Schema-validated, typed record access

pub mod charm;
pub mod charm_builder;
pub mod collection;
pub mod common;
pub mod driver;
pub mod errors;
pub mod repository;

pub use bson;
pub use bson::{doc, Bson};

#[cfg(test)]
mod tests {
    use ctor::ctor;

    #[ctor]
    fn init_test_logging() {
        colog::init();
    }
}
