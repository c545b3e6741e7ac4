use crate::collection::{Document, SaveOptions, SaveResult};
use crate::common::{ResultList, COUNTERS_COLLECTION, DOC_ID, SEQUENCE_VALUE};
use crate::driver::Driver;
use crate::errors::{CharmError, CharmResult, ErrorKind};
use bson::oid::ObjectId;
use bson::{doc, Bson};

/// A handle to a named collection, translating document operations into
/// driver calls.
///
/// `Collection` is the schemaless access path: records are plain
/// [`Document`] values and no field declaration is enforced. The typed
/// [`Repository`](crate::repository::Repository) path layers schema
/// validation on top of the same handle.
///
/// Handles are cheap to clone; all clones share the backend through the
/// underlying [`Driver`].
///
/// # Examples
///
/// ```rust,ignore
/// let users = db.collection("users")?;
///
/// let mut user = Document::from(doc! {"name": "Alice", "status": "active"});
/// users.save(&mut user)?;
///
/// let active = users.find_in("status", vec!["active".into(), "pending".into()])?;
/// println!("{} active users", active.len());
/// ```
#[derive(Clone, Debug)]
pub struct Collection {
    driver: Driver,
    name: String,
}

impl Collection {
    pub(crate) fn new(driver: Driver, name: &str) -> Self {
        Collection {
            driver,
            name: name.to_string(),
        }
    }

    /// Returns the collection name this handle is bound to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Persists the document.
    ///
    /// A document with a null identity is inserted and receives its
    /// generated identity; a document with a non-null identity replaces the
    /// stored record with the same identity. Either way the outcome is a
    /// [`SaveResult`] and the document itself is mutated in place.
    pub fn save(&self, document: &mut Document) -> CharmResult<SaveResult> {
        self.save_with(document, &SaveOptions::default())
    }

    /// Persists the document with explicit [`SaveOptions`].
    ///
    /// When the options name an auto field, the next value of the named
    /// counter sequence is resolved first and written into the document.
    ///
    /// # Errors
    ///
    /// - `Field` if an auto field is given without an auto key
    /// - `Collection` if the auto field is used without a `counters`
    ///   collection
    /// - `Document` if the driver rejects the document as malformed
    pub fn save_with(
        &self,
        document: &mut Document,
        options: &SaveOptions,
    ) -> CharmResult<SaveResult> {
        if let Some(auto_field) = options.get_auto_field() {
            let Some(auto_key) = options.get_auto_key() else {
                log::error!("auto field {} used without an auto key", auto_field);
                return Err(CharmError::new(
                    "to use an auto field, an auto key must be provided",
                    ErrorKind::Field,
                ));
            };
            let next = self.next_sequence(auto_key, options.get_increment())?;
            document.put(auto_field, next);
        }

        match document.id().cloned() {
            // null identity marks a document that has never been persisted
            None => {
                let id = self
                    .driver
                    .insert_one(&self.name, document.fields_without_id())?;
                document.set_id(id.clone());
                log::debug!("inserted document {} into {}", id, self.name);
                Ok(SaveResult::inserted(id))
            }
            Some(id) => {
                let outcome = self.driver.replace_one(
                    &self.name,
                    doc! {DOC_ID: id},
                    document.fields().clone(),
                )?;
                Ok(SaveResult::replaced(outcome))
            }
        }
    }

    /// Removes a field from the document, both locally and in the persisted
    /// record.
    ///
    /// # Errors
    ///
    /// `Field` if the document does not carry the field.
    pub fn delete_field(&self, document: &mut Document, field: &str) -> CharmResult<()> {
        if !document.contains_field(field) {
            log::error!("field {} does not exist", field);
            return Err(CharmError::new(
                &format!("{} does not exist", field),
                ErrorKind::Field,
            ));
        }
        let id = document.id().cloned().unwrap_or(Bson::Null);
        self.driver
            .update_one(&self.name, doc! {DOC_ID: id}, doc! {"$unset": {field: ""}})?;
        document.remove(field);
        Ok(())
    }

    /// Resolves the next value of an auto-increment sequence.
    ///
    /// Sequences live in a sibling collection named `counters`, one record
    /// per sequence shaped `{_id: <sequence name>, sequence_value: <n>}`.
    /// The value is advanced and read back in a single atomic
    /// find-and-update with upsert, so concurrent callers never observe the
    /// same value.
    ///
    /// # Errors
    ///
    /// - `Collection` if no `counters` collection exists
    /// - `Document` if the counter record holds a non-integer value
    pub fn next_sequence(&self, sequence: &str, increment: i64) -> CharmResult<i64> {
        let names = self.driver.collection_names()?;
        if !names.iter().any(|name| name == COUNTERS_COLLECTION) {
            log::error!("no {} collection found", COUNTERS_COLLECTION);
            return Err(CharmError::new(
                "to use an auto increment field you need a collection called counters",
                ErrorKind::Collection,
            ));
        }

        let updated = self.driver.find_one_and_update(
            COUNTERS_COLLECTION,
            doc! {DOC_ID: sequence},
            doc! {"$inc": {SEQUENCE_VALUE: increment}},
            true,
        )?;
        let Some(counter) = updated else {
            return Err(CharmError::new(
                &format!("counter update for {} returned no document", sequence),
                ErrorKind::Document,
            ));
        };
        match counter.get(SEQUENCE_VALUE) {
            Some(Bson::Int64(value)) => Ok(*value),
            Some(Bson::Int32(value)) => Ok(*value as i64),
            other => {
                log::error!("counter {} holds a non-integer value: {:?}", sequence, other);
                Err(CharmError::new(
                    &format!("counter {} holds a non-integer sequence value", sequence),
                    ErrorKind::Document,
                ))
            }
        }
    }

    /// Looks a document up by its identity.
    ///
    /// A malformed identity string is deliberately indistinguishable from a
    /// missing document: both return `None`.
    pub fn get_by_id(&self, id: &str) -> CharmResult<Option<Document>> {
        let object_id = match ObjectId::parse_str(id) {
            Ok(object_id) => object_id,
            Err(_) => {
                log::debug!("malformed document id {}", id);
                return Ok(None);
            }
        };
        let hit = self.driver.find_one(&self.name, doc! {DOC_ID: object_id})?;
        Ok(hit.map(Document::from))
    }

    /// Persists a list of raw field mappings, one save per item.
    ///
    /// Items are saved sequentially; a failure mid-sequence leaves the
    /// already-saved items persisted.
    pub fn insert_many(&self, items: Vec<bson::Document>) -> CharmResult<()> {
        for item in items {
            let mut document = Document::from(item);
            self.save(&mut document)?;
        }
        Ok(())
    }

    /// Returns every document in the collection.
    pub fn all(&self) -> CharmResult<ResultList<Document>> {
        self.find(doc! {})
    }

    /// Returns every document matching the equality filter.
    pub fn find(&self, filter: bson::Document) -> CharmResult<ResultList<Document>> {
        let hits = self.driver.find(&self.name, filter)?;
        Ok(hits.into_iter().map(Document::from).collect())
    }

    /// Returns every document whose `field` value is one of `values`.
    pub fn find_in(&self, field: &str, values: Vec<Bson>) -> CharmResult<ResultList<Document>> {
        self.find(doc! {field: {"$in": values}})
    }

    /// Deletes every document matching the equality filter, returning the
    /// deleted count.
    pub fn delete(&self, filter: bson::Document) -> CharmResult<u64> {
        self.driver.delete_many(&self.name, filter)
    }

    /// Returns the total number of documents in the collection.
    pub fn count(&self) -> CharmResult<u64> {
        self.driver.count_documents(&self.name)
    }
}
