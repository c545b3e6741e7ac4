use crate::charm_builder::CharmBuilder;
use crate::collection::Collection;
use crate::driver::Driver;
use crate::errors::{CharmError, CharmResult, ErrorKind};
use crate::repository::{Model, ModelDef, RegisteredRepository, Repository};
use dashmap::DashMap;
use std::sync::Arc;

/// The database handle for Charm.
///
/// `Charm` is the entry point for all mapping operations. It provides
/// methods for:
/// - Working with schemaless document collections
/// - Working with typed model repositories
/// - Registering runtime model definitions
///
/// `Charm` uses the PIMPL (Pointer to Implementation) design pattern
/// internally: clones are cheap and share the underlying driver and model
/// registry, so one handle created at startup can be passed to every part
/// of the application. There is deliberately no global instance - the
/// caller owns the handle and its lifetime.
///
/// The handle holds no closable resources of its own; the connection lives
/// as long as the underlying driver does.
///
/// # Examples
///
/// ```rust,ignore
/// use charm::charm::Charm;
/// use charm::driver::MemoryDriver;
/// use charm::doc;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let db = Charm::builder().open(MemoryDriver::new().into_driver())?;
///
/// let users = db.collection("users")?;
/// let mut user = charm::collection::Document::from(doc! {"name": "Alice"});
/// users.save(&mut user)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Charm {
    inner: Arc<CharmInner>,
}

impl Charm {
    /// Creates a new [`CharmBuilder`] for configuring and opening a
    /// database handle.
    pub fn builder() -> CharmBuilder {
        CharmBuilder::new()
    }

    pub(crate) fn new(driver: Driver) -> Self {
        Charm {
            inner: Arc::new(CharmInner {
                driver,
                models: DashMap::new(),
            }),
        }
    }

    /// Gets a schemaless handle to the named collection.
    ///
    /// # Errors
    ///
    /// `Collection` if the name is empty or contains whitespace.
    pub fn collection(&self, name: &str) -> CharmResult<Collection> {
        self.inner.validate_collection_name(name)?;
        Ok(Collection::new(self.inner.driver.clone(), name))
    }

    /// Gets a typed repository for the model `M`, bound to
    /// `M::collection_name()`.
    ///
    /// # Errors
    ///
    /// `Collection` if the model names an invalid collection.
    pub fn repository<M: Model>(&self) -> CharmResult<Repository<M>> {
        let name = M::collection_name();
        self.inner.validate_collection_name(&name)?;
        Ok(Repository::new(Collection::new(
            self.inner.driver.clone(),
            &name,
        )))
    }

    /// Registers a runtime model definition and returns its repository.
    ///
    /// The collection name defaults to the lowercased model name. Each
    /// model name can be registered once per handle.
    ///
    /// # Errors
    ///
    /// - `ModelExists` if the model name is already registered
    /// - `Collection` if the resolved collection name is invalid
    pub fn register_model(&self, def: ModelDef) -> CharmResult<RegisteredRepository> {
        let collection_name = def.collection_name();
        self.inner.validate_collection_name(&collection_name)?;

        match self.inner.models.entry(def.name().to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                log::error!("model {} is already registered", def.name());
                Err(CharmError::new(
                    &format!("model {} is already registered", def.name()),
                    ErrorKind::ModelExists,
                ))
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(def.schema().clone());
                log::debug!(
                    "registered model {} on collection {}",
                    def.name(),
                    collection_name
                );
                Ok(RegisteredRepository::new(
                    def.name(),
                    def.schema().clone(),
                    Collection::new(self.inner.driver.clone(), &collection_name),
                ))
            }
        }
    }

    /// Lists the names of all collections in the database.
    pub fn collection_names(&self) -> CharmResult<Vec<String>> {
        self.inner.driver.collection_names()
    }

    /// Checks whether the database holds a collection with the given name.
    pub fn has_collection(&self, name: &str) -> CharmResult<bool> {
        Ok(self
            .collection_names()?
            .iter()
            .any(|collection| collection == name))
    }

    /// Returns the name of the selected database.
    pub fn database_name(&self) -> String {
        self.inner.driver.database_name()
    }
}

#[derive(Debug)]
struct CharmInner {
    driver: Driver,
    models: DashMap<String, crate::repository::Schema>,
}

impl CharmInner {
    fn validate_collection_name(&self, name: &str) -> CharmResult<()> {
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            log::error!("invalid collection name: {:?}", name);
            return Err(CharmError::new(
                &format!("invalid collection name: {:?}", name),
                ErrorKind::Collection,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MemoryDriver;
    use crate::repository::{FieldType, Schema};
    use bson::doc;

    fn open() -> Charm {
        Charm::builder()
            .open(MemoryDriver::new().into_driver())
            .unwrap()
    }

    #[test]
    fn collection_rejects_invalid_names() {
        let db = open();
        assert_eq!(
            db.collection("").unwrap_err().kind(),
            &ErrorKind::Collection
        );
        assert_eq!(
            db.collection("has space").unwrap_err().kind(),
            &ErrorKind::Collection
        );
    }

    #[test]
    fn clones_share_the_model_registry() {
        let db = open();
        let schema = Schema::builder().field("n", FieldType::Int).build();
        db.register_model(ModelDef::new("Order", schema.clone()))
            .unwrap();

        let err = db
            .clone()
            .register_model(ModelDef::new("Order", schema))
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ModelExists);
    }

    #[test]
    fn has_collection_follows_inserts() {
        let db = open();
        assert!(!db.has_collection("users").unwrap());

        let users = db.collection("users").unwrap();
        let mut doc = crate::collection::Document::from(doc! {"name": "Alice"});
        users.save(&mut doc).unwrap();

        assert!(db.has_collection("users").unwrap());
    }

    #[test]
    fn database_name_comes_from_the_driver() {
        let db = Charm::builder()
            .open(MemoryDriver::with_database_name("app").into_driver())
            .unwrap();
        assert_eq!(db.database_name(), "app");
    }
}
