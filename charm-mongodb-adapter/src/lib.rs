//! MongoDB adapter for the Charm document mapping layer.
//!
//! This crate binds the [`charm`] driver boundary to a real MongoDB
//! deployment through the official `mongodb` crate, using its synchronous
//! API - every operation is a blocking call delegated to the wire driver.
//!
//! # Examples
//!
//! Explicit connection:
//!
//! ```rust,ignore
//! let db = charm_mongodb_adapter::open("mongodb://localhost:27017", "app")?;
//! let users = db.collection("users")?;
//! ```
//!
//! Environment-based bootstrap, reading `MONGO_DB_CONNECTION_STRING` and
//! `MONGO_DB_NAME`:
//!
//! ```rust,ignore
//! let db = charm_mongodb_adapter::open_from_env()?;
//! ```

mod bootstrap;
mod driver;

pub use bootstrap::*;
pub use driver::MongoDriver;
