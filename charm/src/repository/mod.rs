//! Schema-validated, typed record access.
//!
//! This module provides the model layer on top of schemaless collections.
//! A model binds a record type to a collection and an ordered field schema;
//! record construction is validated against the schema and query hits come
//! back as typed records.
//!
//! # Repositories vs Collections
//!
//! - **Collections** work with plain [`Document`](crate::collection::Document)
//!   values and enforce no field discipline
//! - **Repositories** validate construction against a declared schema and
//!   guard records against undeclared field assignment
//!
//! # The two model paths
//!
//! A model is declared either at compile time, by implementing [`Model`]
//! on a marker type:
//!
//! ```rust,ignore
//! struct User;
//!
//! impl Model for User {
//!     fn collection_name() -> String { "users".to_string() }
//!     fn schema() -> Schema {
//!         Schema::builder()
//!             .field("name", FieldType::String)
//!             .field("age", FieldType::Int)
//!             .build()
//!     }
//! }
//!
//! let users = db.repository::<User>()?;
//! let mut alice = users.create(doc! {"name": "Alice"})?;
//! alice.set("age", 34)?;          // declared: ok
//! alice.set("nickname", "Al")?;   // undeclared: Field error
//! ```
//!
//! or at runtime, by registering a [`ModelDef`]:
//!
//! ```rust,ignore
//! let invoices = db.register_model(ModelDef::new("Invoice", schema))?;
//! let mut invoice = invoices.create(doc! {"number": 7})?;
//! invoice.put("memo", "rush order"); // this path is not guarded
//! ```
//!
//! The paths differ on purpose: records of a registered model accept
//! assignment to any field, records of a compile-time model only to
//! declared ones.
//!
//! # Extending repositories
//!
//! Ad hoc behavior attaches through ordinary extension traits - no runtime
//! method registration:
//!
//! ```rust,ignore
//! trait UserQueries {
//!     fn find_adults(&self) -> CharmResult<ResultList<Record<User>>>;
//! }
//!
//! impl UserQueries for Repository<User> {
//!     fn find_adults(&self) -> CharmResult<ResultList<Record<User>>> {
//!         self.find_in("age_group", vec!["adult".into(), "senior".into()])
//!     }
//! }
//! ```

mod model;
mod record;
mod registered;
#[allow(clippy::module_inception)]
mod repository;
mod schema;

pub use model::Model;
pub use record::Record;
pub use registered::{ModelDef, RegisteredRepository};
pub use repository::Repository;
pub use schema::{FieldType, Schema, SchemaBuilder};
