use crate::common::DOC_ID;
use bson::Bson;
use std::fmt::{Display, Formatter};

/// Represents a single record of a collection as a mutable field mapping.
///
/// A document is composed of key-value pairs backed by an ordered
/// [`bson::Document`]. Every document carries an identity field (`_id`)
/// which stays null until the document is first persisted; after a
/// successful save the generated identity is written back into the
/// document. This is the invariant the mapping layer is built on: a null
/// identity means "never persisted", a non-null identity means "replace on
/// save".
///
/// Documents may embed other documents as values. Embedding flattens the
/// embedded wrapper to its raw field mapping - one level only; values
/// already inside it are taken as-is.
///
/// # Examples
///
/// ```rust,ignore
/// use charm::collection::Document;
/// use charm::doc;
///
/// let mut address = Document::from(doc! {"city": "Malmö", "zip": "21145"});
/// let mut user = Document::from(doc! {"name": "Alice", "address": address});
/// assert!(user.id().is_none());
///
/// users.save(&mut user)?;
/// assert!(user.id().is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    fields: bson::Document,
}

impl Document {
    /// Creates a new empty document with a null identity.
    pub fn new() -> Self {
        let mut fields = bson::Document::new();
        fields.insert(DOC_ID, Bson::Null);
        Document { fields }
    }

    /// Creates a document from a raw field mapping.
    ///
    /// The mapping is taken over as-is; if it carries no identity field, a
    /// null one is added.
    pub fn from_fields(mut fields: bson::Document) -> Self {
        if !fields.contains_key(DOC_ID) {
            fields.insert(DOC_ID, Bson::Null);
        }
        Document { fields }
    }

    /// Returns the value of a field, or `None` if the field is absent.
    pub fn get(&self, field: &str) -> Option<&Bson> {
        self.fields.get(field)
    }

    /// Sets a field to the given value, replacing any previous value.
    ///
    /// Embedded [`Document`] values are flattened to their raw field
    /// mapping (one level).
    pub fn put(&mut self, field: &str, value: impl Into<Bson>) {
        self.fields.insert(field, value.into());
    }

    /// Removes a field from the document, returning its value if present.
    pub fn remove(&mut self, field: &str) -> Option<Bson> {
        self.fields.remove(field)
    }

    /// Checks whether the document carries the given field.
    pub fn contains_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns the document's identity, or `None` while it has never been
    /// persisted.
    pub fn id(&self) -> Option<&Bson> {
        match self.fields.get(DOC_ID) {
            Some(Bson::Null) | None => None,
            Some(id) => Some(id),
        }
    }

    /// Sets the document's identity.
    pub(crate) fn set_id(&mut self, id: Bson) {
        self.fields.insert(DOC_ID, id);
    }

    /// Returns the number of fields, including the identity field.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Checks whether the document holds no fields at all.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the raw field mapping.
    pub fn fields(&self) -> &bson::Document {
        &self.fields
    }

    /// Consumes the document, returning the raw field mapping.
    pub fn into_fields(self) -> bson::Document {
        self.fields
    }

    /// Returns a copy of the raw field mapping with the identity field
    /// stripped, the shape handed to the driver on first insert.
    pub(crate) fn fields_without_id(&self) -> bson::Document {
        let mut fields = self.fields.clone();
        fields.remove(DOC_ID);
        fields
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl From<bson::Document> for Document {
    fn from(fields: bson::Document) -> Self {
        Document::from_fields(fields)
    }
}

// Embedding a document flattens it to its raw field mapping, one level deep.
impl From<Document> for Bson {
    fn from(document: Document) -> Self {
        Bson::Document(document.fields)
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, value) in &self.fields {
            if !first {
                writeln!(f)?;
            }
            write!(f, "{} = {}", field, value)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn new_document_has_null_identity() {
        let document = Document::new();
        assert!(document.id().is_none());
        assert!(document.contains_field(DOC_ID));
    }

    #[test]
    fn from_fields_adds_missing_identity() {
        let document = Document::from(doc! {"name": "Alice"});
        assert!(document.id().is_none());
        assert_eq!(document.len(), 2);
    }

    #[test]
    fn from_fields_keeps_existing_identity() {
        let document = Document::from(doc! {"_id": "abc", "name": "Alice"});
        assert_eq!(document.id(), Some(&Bson::String("abc".to_string())));
    }

    #[test]
    fn put_get_remove_roundtrip() {
        let mut document = Document::new();
        document.put("name", "Alice");
        assert_eq!(document.get("name"), Some(&Bson::String("Alice".to_string())));
        assert!(document.contains_field("name"));

        let removed = document.remove("name");
        assert_eq!(removed, Some(Bson::String("Alice".to_string())));
        assert!(!document.contains_field("name"));
    }

    #[test]
    fn embedded_document_is_flattened_to_fields() {
        let address = Document::from(doc! {"city": "Malmö"});
        let mut user = Document::from(doc! {"name": "Alice"});
        user.put("address", address);

        match user.get("address") {
            Some(Bson::Document(fields)) => {
                assert_eq!(fields.get_str("city").unwrap(), "Malmö");
                // the embedded wrapper carried its own null identity along
                assert_eq!(fields.get(DOC_ID), Some(&Bson::Null));
            }
            other => panic!("expected embedded fields, got {:?}", other),
        }
    }

    #[test]
    fn fields_without_id_strips_identity_only() {
        let document = Document::from(doc! {"name": "Alice", "age": 30});
        let raw = document.fields_without_id();
        assert!(!raw.contains_key(DOC_ID));
        assert_eq!(raw.len(), 2);
        // the document itself is untouched
        assert!(document.contains_field(DOC_ID));
    }

    #[test]
    fn display_renders_field_per_line() {
        let document = Document::from(doc! {"_id": "x", "name": "Alice"});
        let rendered = document.to_string();
        assert!(rendered.contains("_id = \"x\""));
        assert!(rendered.contains("name = \"Alice\""));
        assert_eq!(rendered.lines().count(), 2);
    }
}
