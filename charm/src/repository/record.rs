use crate::collection::Document;
use crate::common::DOC_ID;
use crate::errors::{CharmError, CharmResult, ErrorKind};
use crate::repository::Model;
use bson::Bson;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;
use std::ops::Deref;

/// A document instance belonging to a model.
///
/// `Record<M>` wraps a [`Document`] and enforces the model's declaration
/// discipline: [`set`](Record::set) rejects any field the schema of `M`
/// never declared (the identity field is always allowed). Read access
/// derefs to the underlying document.
///
/// Records are created through
/// [`Repository::create`](crate::repository::Repository::create), which
/// validates supplied values against the schema, or wrapped from query
/// hits, which are trusted as stored.
pub struct Record<M: Model> {
    document: Document,
    _phantom: PhantomData<M>,
}

// manual impls: the model marker type itself carries no data to clone,
// compare, or print
impl<M: Model> Clone for Record<M> {
    fn clone(&self) -> Self {
        Record {
            document: self.document.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<M: Model> PartialEq for Record<M> {
    fn eq(&self, other: &Self) -> bool {
        self.document == other.document
    }
}

impl<M: Model> std::fmt::Debug for Record<M> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record")
            .field("document", &self.document)
            .finish()
    }
}

impl<M: Model> Record<M> {
    pub(crate) fn wrap(document: Document) -> Self {
        Record {
            document,
            _phantom: PhantomData,
        }
    }

    /// Sets a declared field to the given value.
    ///
    /// # Errors
    ///
    /// `Field` if the model's schema does not declare the field.
    pub fn set(&mut self, field: &str, value: impl Into<Bson>) -> CharmResult<()> {
        if field != DOC_ID && !M::schema().contains(field) {
            log::error!(
                "{} has no declared field {}",
                std::any::type_name::<M>(),
                field
            );
            return Err(CharmError::new(
                &format!(
                    "{} has no declared field {}",
                    std::any::type_name::<M>(),
                    field
                ),
                ErrorKind::Field,
            ));
        }
        self.document.put(field, value);
        Ok(())
    }

    /// Returns the underlying document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub(crate) fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Consumes the record, returning the underlying document.
    pub fn into_document(self) -> Document {
        self.document
    }
}

impl<M: Model> Deref for Record<M> {
    type Target = Document;

    fn deref(&self) -> &Self::Target {
        &self.document
    }
}

impl<M: Model> Display for Record<M> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.document, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{FieldType, Schema};
    use bson::doc;

    struct Book;

    impl Model for Book {
        fn collection_name() -> String {
            "books".to_string()
        }

        fn schema() -> Schema {
            Schema::builder()
                .field("title", FieldType::String)
                .field("pages", FieldType::Int)
                .build()
        }
    }

    #[test]
    fn set_declared_field_succeeds() {
        let mut record: Record<Book> =
            Record::wrap(Document::from(doc! {"title": "Dune", "pages": 412}));
        record.set("pages", 500).unwrap();
        assert_eq!(record.get("pages"), Some(&Bson::Int32(500)));
    }

    #[test]
    fn set_undeclared_field_fails() {
        let mut record: Record<Book> = Record::wrap(Document::from(doc! {"title": "Dune"}));
        let err = record.set("publisher", "Chilton").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Field);
        assert!(!record.contains_field("publisher"));
    }

    #[test]
    fn identity_field_is_always_assignable() {
        let mut record: Record<Book> = Record::wrap(Document::from(doc! {"title": "Dune"}));
        record.set("_id", "abc").unwrap();
        assert_eq!(record.id(), Some(&Bson::String("abc".to_string())));
    }

    #[test]
    fn deref_gives_read_access() {
        let record: Record<Book> = Record::wrap(Document::from(doc! {"title": "Dune"}));
        assert!(record.contains_field("title"));
        assert!(record.id().is_none());
    }
}
