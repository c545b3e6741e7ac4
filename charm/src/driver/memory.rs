use crate::common::DOC_ID;
use crate::driver::{Driver, DriverProvider, UpdateOutcome};
use crate::errors::{CharmError, CharmResult, ErrorKind};
use bson::oid::ObjectId;
use bson::Bson;
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-memory implementation of a Charm database backend.
///
/// # Purpose
/// `MemoryDriver` provides a complete in-memory backend suitable for testing
/// and temporary data. Collections are plain insertion-ordered document lists
/// guarded by a read-write lock; nothing is persisted.
///
/// # Characteristics
/// - **Thread-Safe**: guarded by `parking_lot::RwLock`
/// - **Server Semantics**: equality and `$in` filters, null-matches-missing,
///   `$inc`/`$unset` updates, upsert creation from filter equality fields
/// - **Generated Identities**: documents inserted without an `_id` receive a
///   fresh [`ObjectId`]
/// - **No Persistence**: all data is lost when the driver is dropped
///
/// # Usage
/// ```rust,ignore
/// let db = Charm::builder().open(MemoryDriver::new().into_driver())?;
/// let users = db.collection("users")?;
/// ```
pub struct MemoryDriver {
    database_name: String,
    collections: RwLock<HashMap<String, Vec<bson::Document>>>,
}

impl MemoryDriver {
    /// Creates a new empty in-memory driver for a database named `memory`.
    pub fn new() -> Self {
        Self::with_database_name("memory")
    }

    /// Creates a new empty in-memory driver with the given database name.
    pub fn with_database_name(database_name: &str) -> Self {
        MemoryDriver {
            database_name: database_name.to_string(),
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Wraps this driver into a shareable [`Driver`] handle.
    pub fn into_driver(self) -> Driver {
        Driver::new(self)
    }
}

impl Default for MemoryDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl DriverProvider for MemoryDriver {
    fn ping(&self) -> CharmResult<()> {
        Ok(())
    }

    fn database_name(&self) -> String {
        self.database_name.clone()
    }

    fn collection_names(&self) -> CharmResult<Vec<String>> {
        Ok(self.collections.read().keys().cloned().collect())
    }

    fn insert_one(&self, collection: &str, mut document: bson::Document) -> CharmResult<Bson> {
        let id = match document.get(DOC_ID) {
            Some(id) if id != &Bson::Null => id.clone(),
            _ => {
                let id = Bson::ObjectId(ObjectId::new());
                document.insert(DOC_ID, id.clone());
                id
            }
        };
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(id)
    }

    fn replace_one(
        &self,
        collection: &str,
        filter: bson::Document,
        mut replacement: bson::Document,
    ) -> CharmResult<UpdateOutcome> {
        let mut collections = self.collections.write();
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(UpdateOutcome::new(0, 0));
        };
        match documents.iter_mut().find(|d| matches_filter(d, &filter)) {
            Some(existing) => {
                // replacement keeps the identity of the document it replaces
                if !replacement.contains_key(DOC_ID) {
                    if let Some(id) = existing.get(DOC_ID) {
                        replacement.insert(DOC_ID, id.clone());
                    }
                }
                let modified = if *existing == replacement { 0 } else { 1 };
                *existing = replacement;
                Ok(UpdateOutcome::new(1, modified))
            }
            None => Ok(UpdateOutcome::new(0, 0)),
        }
    }

    fn update_one(
        &self,
        collection: &str,
        filter: bson::Document,
        update: bson::Document,
    ) -> CharmResult<UpdateOutcome> {
        let mut collections = self.collections.write();
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(UpdateOutcome::new(0, 0));
        };
        match documents.iter_mut().find(|d| matches_filter(d, &filter)) {
            Some(existing) => {
                let before = existing.clone();
                apply_update(existing, &update)?;
                let modified = if *existing == before { 0 } else { 1 };
                Ok(UpdateOutcome::new(1, modified))
            }
            None => Ok(UpdateOutcome::new(0, 0)),
        }
    }

    fn find_one(
        &self,
        collection: &str,
        filter: bson::Document,
    ) -> CharmResult<Option<bson::Document>> {
        let collections = self.collections.read();
        Ok(collections.get(collection).and_then(|documents| {
            documents
                .iter()
                .find(|d| matches_filter(d, &filter))
                .cloned()
        }))
    }

    fn find(&self, collection: &str, filter: bson::Document) -> CharmResult<Vec<bson::Document>> {
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|d| matches_filter(d, &filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn find_one_and_update(
        &self,
        collection: &str,
        filter: bson::Document,
        update: bson::Document,
        upsert: bool,
    ) -> CharmResult<Option<bson::Document>> {
        let mut collections = self.collections.write();
        let documents = collections.entry(collection.to_string()).or_default();
        if let Some(existing) = documents.iter_mut().find(|d| matches_filter(d, &filter)) {
            apply_update(existing, &update)?;
            return Ok(Some(existing.clone()));
        }
        if !upsert {
            return Ok(None);
        }
        // upsert seeds the new document from the filter's equality fields
        let mut created = bson::Document::new();
        for (field, condition) in &filter {
            if !matches!(condition, Bson::Document(_)) {
                created.insert(field, condition.clone());
            }
        }
        apply_update(&mut created, &update)?;
        documents.push(created.clone());
        Ok(Some(created))
    }

    fn delete_many(&self, collection: &str, filter: bson::Document) -> CharmResult<u64> {
        let mut collections = self.collections.write();
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = documents.len();
        documents.retain(|d| !matches_filter(d, &filter));
        Ok((before - documents.len()) as u64)
    }

    fn count_documents(&self, collection: &str) -> CharmResult<u64> {
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .map(|documents| documents.len() as u64)
            .unwrap_or(0))
    }
}

/// Evaluates a filter against a document.
///
/// Supported conditions mirror what the mapping layer emits: top-level
/// equality, `{field: {"$in": [...]}}` membership, and a null condition
/// matching documents where the field is null or absent.
fn matches_filter(document: &bson::Document, filter: &bson::Document) -> bool {
    filter.iter().all(|(field, condition)| match condition {
        Bson::Document(spec) if spec.contains_key("$in") => match spec.get("$in") {
            Some(Bson::Array(values)) => document
                .get(field)
                .map(|value| values.contains(value))
                .unwrap_or(false),
            _ => false,
        },
        Bson::Null => matches!(document.get(field), None | Some(Bson::Null)),
        expected => document.get(field) == Some(expected),
    })
}

/// Applies an update document in place.
///
/// Only the operators the mapping layer issues are supported: `$inc` for
/// counter emulation and `$unset` for field removal.
fn apply_update(document: &mut bson::Document, update: &bson::Document) -> CharmResult<()> {
    for (operator, spec) in update {
        let Bson::Document(fields) = spec else {
            log::error!("malformed {} specification: {:?}", operator, spec);
            return Err(CharmError::new(
                &format!("malformed {} specification", operator),
                ErrorKind::Backend,
            ));
        };
        match operator.as_str() {
            "$inc" => {
                for (field, delta) in fields {
                    let delta = match delta {
                        Bson::Int32(value) => *value as i64,
                        Bson::Int64(value) => *value,
                        other => {
                            log::error!("non-integer $inc delta for {}: {:?}", field, other);
                            return Err(CharmError::new(
                                &format!("cannot increment {} by a non-integer value", field),
                                ErrorKind::Document,
                            ));
                        }
                    };
                    let current = match document.get(field) {
                        Some(Bson::Int32(value)) => *value as i64,
                        Some(Bson::Int64(value)) => *value,
                        None => 0,
                        Some(other) => {
                            log::error!("cannot increment non-integer field {}: {:?}", field, other);
                            return Err(CharmError::new(
                                &format!("cannot increment non-integer field {}", field),
                                ErrorKind::Document,
                            ));
                        }
                    };
                    document.insert(field.clone(), Bson::Int64(current + delta));
                }
            }
            "$unset" => {
                for (field, _) in fields {
                    document.remove(field);
                }
            }
            other => {
                log::error!("unsupported update operator {}", other);
                return Err(CharmError::new(
                    &format!("unsupported update operator {}", other),
                    ErrorKind::Backend,
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn insert_generates_identity_when_absent() {
        let driver = MemoryDriver::new();
        let id = driver
            .insert_one("users", doc! {"name": "Alice"})
            .unwrap();
        assert!(matches!(id, Bson::ObjectId(_)));
        assert_eq!(driver.count_documents("users").unwrap(), 1);
    }

    #[test]
    fn insert_keeps_caller_supplied_identity() {
        let driver = MemoryDriver::new();
        let id = driver
            .insert_one("counters", doc! {"_id": "order_seq", "sequence_value": 0})
            .unwrap();
        assert_eq!(id, Bson::String("order_seq".to_string()));
    }

    #[test]
    fn equality_filter_matches() {
        let driver = MemoryDriver::new();
        driver
            .insert_one("users", doc! {"name": "Alice", "age": 30})
            .unwrap();
        driver
            .insert_one("users", doc! {"name": "Bob", "age": 25})
            .unwrap();

        let hits = driver.find("users", doc! {"age": 30}).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].get_str("name").unwrap(), "Alice");
    }

    #[test]
    fn in_filter_matches_membership() {
        let driver = MemoryDriver::new();
        driver
            .insert_one("orders", doc! {"status": "active"})
            .unwrap();
        driver
            .insert_one("orders", doc! {"status": "pending"})
            .unwrap();
        driver
            .insert_one("orders", doc! {"status": "closed"})
            .unwrap();

        let hits = driver
            .find("orders", doc! {"status": {"$in": ["active", "pending"]}})
            .unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn null_filter_matches_missing_field() {
        let driver = MemoryDriver::new();
        driver.insert_one("users", doc! {"name": "Alice"}).unwrap();
        driver
            .insert_one("users", doc! {"name": "Bob", "email": "bob@email.com"})
            .unwrap();

        let hits = driver.find("users", doc! {"email": Bson::Null}).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].get_str("name").unwrap(), "Alice");
    }

    #[test]
    fn find_one_and_update_increments_existing_counter() {
        let driver = MemoryDriver::new();
        driver
            .insert_one("counters", doc! {"_id": "seq", "sequence_value": 4})
            .unwrap();

        let updated = driver
            .find_one_and_update(
                "counters",
                doc! {"_id": "seq"},
                doc! {"$inc": {"sequence_value": 2}},
                true,
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.get_i64("sequence_value").unwrap(), 6);
    }

    #[test]
    fn find_one_and_update_upserts_missing_counter() {
        let driver = MemoryDriver::new();
        let created = driver
            .find_one_and_update(
                "counters",
                doc! {"_id": "fresh_seq"},
                doc! {"$inc": {"sequence_value": 2}},
                true,
            )
            .unwrap()
            .unwrap();
        assert_eq!(created.get_str("_id").unwrap(), "fresh_seq");
        assert_eq!(created.get_i64("sequence_value").unwrap(), 2);
        assert_eq!(driver.count_documents("counters").unwrap(), 1);
    }

    #[test]
    fn find_one_and_update_without_upsert_returns_none() {
        let driver = MemoryDriver::new();
        let result = driver
            .find_one_and_update(
                "counters",
                doc! {"_id": "missing"},
                doc! {"$inc": {"sequence_value": 1}},
                false,
            )
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn update_one_unsets_field() {
        let driver = MemoryDriver::new();
        let id = driver
            .insert_one("users", doc! {"name": "Alice", "nickname": "Al"})
            .unwrap();

        let outcome = driver
            .update_one(
                "users",
                doc! {"_id": id},
                doc! {"$unset": {"nickname": ""}},
            )
            .unwrap();
        assert_eq!(outcome.matched_count(), 1);
        assert_eq!(outcome.modified_count(), 1);

        let hit = driver.find_one("users", doc! {"name": "Alice"}).unwrap().unwrap();
        assert!(!hit.contains_key("nickname"));
    }

    #[test]
    fn replace_one_swaps_full_document() {
        let driver = MemoryDriver::new();
        let id = driver
            .insert_one("users", doc! {"name": "Alice", "age": 30})
            .unwrap();

        let outcome = driver
            .replace_one(
                "users",
                doc! {"_id": id.clone()},
                doc! {"_id": id, "name": "Alice", "age": 31},
            )
            .unwrap();
        assert_eq!(outcome.matched_count(), 1);
        assert_eq!(outcome.modified_count(), 1);

        let hit = driver.find_one("users", doc! {"name": "Alice"}).unwrap().unwrap();
        assert_eq!(hit.get_i32("age").unwrap(), 31);
    }

    #[test]
    fn replace_one_without_match_touches_nothing() {
        let driver = MemoryDriver::new();
        let outcome = driver
            .replace_one("users", doc! {"_id": Bson::Null}, doc! {"name": "ghost"})
            .unwrap();
        assert_eq!(outcome.matched_count(), 0);
        assert_eq!(driver.count_documents("users").unwrap(), 0);
    }

    #[test]
    fn delete_many_reports_deleted_count() {
        let driver = MemoryDriver::new();
        driver.insert_one("users", doc! {"group": "a"}).unwrap();
        driver.insert_one("users", doc! {"group": "a"}).unwrap();
        driver.insert_one("users", doc! {"group": "b"}).unwrap();

        let deleted = driver.delete_many("users", doc! {"group": "a"}).unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(driver.count_documents("users").unwrap(), 1);
    }

    #[test]
    fn unsupported_update_operator_is_rejected() {
        let driver = MemoryDriver::new();
        let id = driver.insert_one("users", doc! {"name": "Alice"}).unwrap();
        let err = driver
            .update_one("users", doc! {"_id": id}, doc! {"$rename": {"name": "n"}})
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Backend);
    }

    #[test]
    fn collection_names_reflect_inserts() {
        let driver = MemoryDriver::new();
        assert!(driver.collection_names().unwrap().is_empty());
        driver.insert_one("users", doc! {"name": "Alice"}).unwrap();
        driver.insert_one("orders", doc! {"total": 10}).unwrap();
        let mut names = driver.collection_names().unwrap();
        names.sort();
        assert_eq!(names, vec!["orders", "users"]);
    }
}
