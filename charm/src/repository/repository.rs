use crate::collection::{Collection, Document, SaveOptions, SaveResult};
use crate::common::ResultList;
use crate::errors::CharmResult;
use crate::repository::{Model, Record, Schema};
use bson::Bson;
use std::marker::PhantomData;

/// Typed access to the collection a [`Model`] is bound to.
///
/// A repository layers the model's schema over a schemaless [`Collection`]:
/// construction is validated, every query hit comes back wrapped as a
/// [`Record<M>`], and the operations themselves delegate to the collection
/// handle underneath.
///
/// # Examples
///
/// ```rust,ignore
/// let users = db.repository::<User>()?;
///
/// let mut alice = users.create(doc! {"first_name": "Alice", "age": 34})?;
/// users.save(&mut alice)?;
///
/// let adults = users.find_in("age", vec![34.into(), 35.into()])?;
/// ```
pub struct Repository<M: Model> {
    collection: Collection,
    schema: Schema,
    _phantom: PhantomData<M>,
}

impl<M: Model> Repository<M> {
    pub(crate) fn new(collection: Collection) -> Self {
        Repository {
            collection,
            schema: M::schema(),
            _phantom: PhantomData,
        }
    }

    /// Returns the model's schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the underlying schemaless collection handle.
    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Creates a record from supplied field values.
    ///
    /// Declared fields take the supplied value or their type's zero value
    /// when omitted; wrong-typed or undeclared values are rejected.
    pub fn create(&self, fields: bson::Document) -> CharmResult<Record<M>> {
        let validated = self.schema.apply(fields)?;
        Ok(Record::wrap(Document::from(validated)))
    }

    /// Persists the record. See [`Collection::save`].
    pub fn save(&self, record: &mut Record<M>) -> CharmResult<SaveResult> {
        self.collection.save(record.document_mut())
    }

    /// Persists the record with explicit options. See
    /// [`Collection::save_with`].
    pub fn save_with(
        &self,
        record: &mut Record<M>,
        options: &SaveOptions,
    ) -> CharmResult<SaveResult> {
        self.collection.save_with(record.document_mut(), options)
    }

    /// Removes a field from the record and the persisted document. See
    /// [`Collection::delete_field`].
    pub fn delete_field(&self, record: &mut Record<M>, field: &str) -> CharmResult<()> {
        self.collection.delete_field(record.document_mut(), field)
    }

    /// Resolves the next value of an auto-increment sequence. See
    /// [`Collection::next_sequence`].
    pub fn next_sequence(&self, sequence: &str, increment: i64) -> CharmResult<i64> {
        self.collection.next_sequence(sequence, increment)
    }

    /// Looks a record up by its identity; malformed input reads as
    /// not-found.
    pub fn get_by_id(&self, id: &str) -> CharmResult<Option<Record<M>>> {
        Ok(self.collection.get_by_id(id)?.map(Record::wrap))
    }

    /// Validates and persists a list of raw field mappings, one save per
    /// item. A failure mid-sequence leaves the already-saved items
    /// persisted.
    pub fn insert_many(&self, items: Vec<bson::Document>) -> CharmResult<()> {
        for item in items {
            let mut record = self.create(item)?;
            self.save(&mut record)?;
        }
        Ok(())
    }

    /// Returns every record in the collection.
    pub fn all(&self) -> CharmResult<ResultList<Record<M>>> {
        Ok(self.collection.all()?.into_iter().map(Record::wrap).collect())
    }

    /// Returns every record matching the equality filter.
    pub fn find(&self, filter: bson::Document) -> CharmResult<ResultList<Record<M>>> {
        Ok(self
            .collection
            .find(filter)?
            .into_iter()
            .map(Record::wrap)
            .collect())
    }

    /// Returns every record whose `field` value is one of `values`.
    pub fn find_in(&self, field: &str, values: Vec<Bson>) -> CharmResult<ResultList<Record<M>>> {
        Ok(self
            .collection
            .find_in(field, values)?
            .into_iter()
            .map(Record::wrap)
            .collect())
    }

    /// Deletes every record matching the equality filter, returning the
    /// deleted count.
    pub fn delete(&self, filter: bson::Document) -> CharmResult<u64> {
        self.collection.delete(filter)
    }

    /// Returns the total number of records in the collection.
    pub fn count(&self) -> CharmResult<u64> {
        self.collection.count()
    }
}
