//! Backend abstraction for the mapping layer.
//!
//! Charm delegates all storage concerns to a driver. The [`DriverProvider`]
//! trait names exactly the operations the mapping layer needs; everything
//! else the underlying database can do is out of scope. The crate ships an
//! in-memory [`MemoryDriver`]; the `charm-mongodb-adapter` crate binds the
//! same trait to a real MongoDB deployment.

mod memory;

pub use memory::MemoryDriver;

use crate::errors::CharmResult;
use bson::Bson;
use std::sync::Arc;

/// The contract between the mapping layer and a database backend.
///
/// Documents and filters cross this boundary as raw [`bson::Document`]
/// values; update operators are expressed as BSON update documents
/// (`$inc`, `$unset`). Implementations are expected to be cheap to clone
/// behind the [`Driver`] facade and safe to share across threads.
///
/// All operations are synchronous and blocking. No retry is applied at this
/// level; transient failures propagate to the caller as typed errors.
pub trait DriverProvider: Send + Sync {
    /// Verifies the backend is alive and reachable.
    fn ping(&self) -> CharmResult<()>;

    /// Returns the name of the selected database.
    fn database_name(&self) -> String;

    /// Lists the names of all collections in the database.
    fn collection_names(&self) -> CharmResult<Vec<String>>;

    /// Inserts a single document and returns its generated identity.
    fn insert_one(&self, collection: &str, document: bson::Document) -> CharmResult<Bson>;

    /// Replaces the first document matching `filter` with `replacement`.
    fn replace_one(
        &self,
        collection: &str,
        filter: bson::Document,
        replacement: bson::Document,
    ) -> CharmResult<UpdateOutcome>;

    /// Applies an update document to the first document matching `filter`.
    fn update_one(
        &self,
        collection: &str,
        filter: bson::Document,
        update: bson::Document,
    ) -> CharmResult<UpdateOutcome>;

    /// Returns the first document matching `filter`, if any.
    fn find_one(
        &self,
        collection: &str,
        filter: bson::Document,
    ) -> CharmResult<Option<bson::Document>>;

    /// Returns every document matching `filter`.
    fn find(&self, collection: &str, filter: bson::Document) -> CharmResult<Vec<bson::Document>>;

    /// Atomically applies `update` to the first document matching `filter`
    /// and returns the document as it looks after the update. With `upsert`
    /// set, a missing document is created from the filter's equality fields
    /// before the update is applied.
    fn find_one_and_update(
        &self,
        collection: &str,
        filter: bson::Document,
        update: bson::Document,
        upsert: bool,
    ) -> CharmResult<Option<bson::Document>>;

    /// Deletes every document matching `filter`, returning the deleted count.
    fn delete_many(&self, collection: &str, filter: bson::Document) -> CharmResult<u64>;

    /// Returns the total number of documents in the collection.
    fn count_documents(&self, collection: &str) -> CharmResult<u64>;
}

/// Cloneable facade over a [`DriverProvider`] implementation.
///
/// `Driver` wraps the provider in an `Arc` so collection handles and the
/// database facade can share one backend without lifetime plumbing.
#[derive(Clone)]
pub struct Driver {
    provider: Arc<dyn DriverProvider>,
}

impl Driver {
    /// Wraps a provider implementation into a shareable driver handle.
    pub fn new<P: DriverProvider + 'static>(provider: P) -> Self {
        Driver {
            provider: Arc::new(provider),
        }
    }
}

impl std::fmt::Debug for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver").finish_non_exhaustive()
    }
}

impl std::ops::Deref for Driver {
    type Target = dyn DriverProvider;

    fn deref(&self) -> &Self::Target {
        self.provider.as_ref()
    }
}

/// Matched/modified counts reported by replace and update operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UpdateOutcome {
    matched_count: u64,
    modified_count: u64,
}

impl UpdateOutcome {
    /// Creates a new outcome from raw counts.
    pub fn new(matched_count: u64, modified_count: u64) -> Self {
        UpdateOutcome {
            matched_count,
            modified_count,
        }
    }

    /// Number of documents the filter matched.
    pub fn matched_count(&self) -> u64 {
        self.matched_count
    }

    /// Number of documents actually modified.
    pub fn modified_count(&self) -> u64 {
        self.modified_count
    }
}
