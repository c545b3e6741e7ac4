use charm::driver::{Driver, DriverProvider, UpdateOutcome};
use charm::errors::{CharmError, CharmResult, ErrorKind};
use bson::{doc, Bson};
use mongodb::options::ReturnDocument;
use mongodb::sync::{Client, Database};

/// MongoDB implementation of the Charm driver boundary.
///
/// `MongoDriver` wraps a synchronous `mongodb` client bound to one selected
/// database. Client construction is lazy on the wire: no traffic happens
/// until the first operation, which is why opening a [`charm::charm::Charm`]
/// handle runs a liveness ping with retry on top of this driver.
///
/// # Examples
///
/// ```rust,ignore
/// use charm::charm::Charm;
/// use charm_mongodb_adapter::MongoDriver;
///
/// let driver = MongoDriver::connect("mongodb://localhost:27017", "app")?;
/// let db = Charm::builder().open(driver.into_driver())?;
/// ```
#[derive(Debug)]
pub struct MongoDriver {
    database: Database,
}

impl MongoDriver {
    /// Creates a driver from a connection string and database name.
    ///
    /// # Errors
    ///
    /// `Connection` if the connection string cannot be parsed.
    pub fn connect(connection_string: &str, database: &str) -> CharmResult<MongoDriver> {
        let client = Client::with_uri_str(connection_string).map_err(|error| {
            log::error!("could not create client: {}", error);
            CharmError::new(
                &format!("could not create client: {}", error),
                ErrorKind::Connection,
            )
        })?;
        Ok(MongoDriver {
            database: client.database(database),
        })
    }

    /// Wraps this driver into a shareable [`Driver`] handle.
    pub fn into_driver(self) -> Driver {
        Driver::new(self)
    }

    fn collection(&self, name: &str) -> mongodb::sync::Collection<bson::Document> {
        self.database.collection::<bson::Document>(name)
    }
}

impl DriverProvider for MongoDriver {
    fn ping(&self) -> CharmResult<()> {
        self.database
            .run_command(doc! {"ping": 1})
            .run()
            .map_err(|error| {
                CharmError::new(
                    &format!("liveness check failed: {}", error),
                    ErrorKind::Connection,
                )
            })?;
        Ok(())
    }

    fn database_name(&self) -> String {
        self.database.name().to_string()
    }

    fn collection_names(&self) -> CharmResult<Vec<String>> {
        self.database
            .list_collection_names()
            .run()
            .map_err(translate_error)
    }

    fn insert_one(&self, collection: &str, document: bson::Document) -> CharmResult<Bson> {
        let result = self
            .collection(collection)
            .insert_one(document)
            .run()
            .map_err(translate_error)?;
        Ok(result.inserted_id)
    }

    fn replace_one(
        &self,
        collection: &str,
        filter: bson::Document,
        replacement: bson::Document,
    ) -> CharmResult<UpdateOutcome> {
        let result = self
            .collection(collection)
            .replace_one(filter, replacement)
            .run()
            .map_err(translate_error)?;
        Ok(UpdateOutcome::new(
            result.matched_count,
            result.modified_count,
        ))
    }

    fn update_one(
        &self,
        collection: &str,
        filter: bson::Document,
        update: bson::Document,
    ) -> CharmResult<UpdateOutcome> {
        let result = self
            .collection(collection)
            .update_one(filter, update)
            .run()
            .map_err(translate_error)?;
        Ok(UpdateOutcome::new(
            result.matched_count,
            result.modified_count,
        ))
    }

    fn find_one(
        &self,
        collection: &str,
        filter: bson::Document,
    ) -> CharmResult<Option<bson::Document>> {
        self.collection(collection)
            .find_one(filter)
            .run()
            .map_err(translate_error)
    }

    fn find(&self, collection: &str, filter: bson::Document) -> CharmResult<Vec<bson::Document>> {
        let cursor = self
            .collection(collection)
            .find(filter)
            .run()
            .map_err(translate_error)?;
        let mut documents = Vec::new();
        for document in cursor {
            documents.push(document.map_err(translate_error)?);
        }
        Ok(documents)
    }

    fn find_one_and_update(
        &self,
        collection: &str,
        filter: bson::Document,
        update: bson::Document,
        upsert: bool,
    ) -> CharmResult<Option<bson::Document>> {
        self.collection(collection)
            .find_one_and_update(filter, update)
            .upsert(upsert)
            .return_document(ReturnDocument::After)
            .run()
            .map_err(translate_error)
    }

    fn delete_many(&self, collection: &str, filter: bson::Document) -> CharmResult<u64> {
        let result = self
            .collection(collection)
            .delete_many(filter)
            .run()
            .map_err(translate_error)?;
        Ok(result.deleted_count)
    }

    fn count_documents(&self, collection: &str) -> CharmResult<u64> {
        self.collection(collection)
            .count_documents(doc! {})
            .run()
            .map_err(translate_error)
    }
}

/// Translates a driver-level failure into the Charm taxonomy.
///
/// BSON (de)serialization failures are the malformed-document signal and
/// map to the `Document` kind; everything else passes through as `Backend`.
fn translate_error(error: mongodb::error::Error) -> CharmError {
    use mongodb::error::ErrorKind as DriverErrorKind;

    let kind = match error.kind.as_ref() {
        DriverErrorKind::BsonSerialization(_) | DriverErrorKind::BsonDeserialization(_) => {
            ErrorKind::Document
        }
        _ => ErrorKind::Backend,
    };
    log::error!("driver error: {}", error);
    CharmError::new(&format!("driver error: {}", error), kind)
}
