use crate::collection::{Collection, Document};
use crate::errors::CharmResult;
use crate::repository::Schema;
use std::ops::Deref;

/// Definition of a model registered at runtime.
///
/// Where [`Model`](crate::repository::Model) binds a schema at compile
/// time, `ModelDef` carries the same information as a value:
/// a model name, an optional collection name (defaulting to the lowercased
/// model name), and the field schema.
///
/// # Examples
///
/// ```rust,ignore
/// let def = ModelDef::new(
///     "Invoice",
///     Schema::builder()
///         .field("number", FieldType::Int)
///         .field("total", FieldType::Float)
///         .build(),
/// );
/// let invoices = db.register_model(def)?;
/// ```
#[derive(Debug, Clone)]
pub struct ModelDef {
    name: String,
    collection: Option<String>,
    schema: Schema,
}

impl ModelDef {
    /// Creates a definition for the named model with the given schema.
    pub fn new(name: &str, schema: Schema) -> Self {
        ModelDef {
            name: name.to_string(),
            collection: None,
            schema,
        }
    }

    /// Overrides the collection name; by default the lowercased model name
    /// is used.
    pub fn collection(mut self, name: &str) -> Self {
        self.collection = Some(name.to_string());
        self
    }

    /// Returns the model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the collection name the model binds to.
    pub fn collection_name(&self) -> String {
        self.collection
            .clone()
            .unwrap_or_else(|| self.name.to_lowercase())
    }

    /// Returns the field schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

/// Repository for a model registered at runtime.
///
/// Construction through [`create`](RegisteredRepository::create) is
/// validated against the registered schema, but the produced records are
/// plain [`Document`]s: unlike the compile-time
/// [`Record<M>`](crate::repository::Record) path, assignment after
/// construction is not guarded. The two paths deliberately differ in
/// strictness.
///
/// All collection operations are available directly on the repository
/// through deref.
#[derive(Clone, Debug)]
pub struct RegisteredRepository {
    name: String,
    schema: Schema,
    collection: Collection,
}

impl RegisteredRepository {
    pub(crate) fn new(name: &str, schema: Schema, collection: Collection) -> Self {
        RegisteredRepository {
            name: name.to_string(),
            schema,
            collection,
        }
    }

    /// Returns the registered model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the registered schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Creates a document from supplied field values, validated against the
    /// registered schema.
    ///
    /// The result is an ordinary [`Document`]; any field may be assigned to
    /// it afterwards.
    pub fn create(&self, fields: bson::Document) -> CharmResult<Document> {
        let validated = self.schema.apply(fields)?;
        Ok(Document::from(validated))
    }
}

impl Deref for RegisteredRepository {
    type Target = Collection;

    fn deref(&self) -> &Self::Target {
        &self.collection
    }
}
