use crate::common::DOC_ID;
use crate::errors::{CharmError, CharmResult, ErrorKind};
use bson::Bson;
use indexmap::IndexMap;

/// Declared type of a schema field.
///
/// Each variant knows its zero value - what a field defaults to when a
/// validated construction omits it - and which BSON shapes satisfy it.
/// Integer widths are not distinguished: both 32-bit and 64-bit values
/// satisfy [`FieldType::Int`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldType {
    String,
    Int,
    Float,
    Bool,
    List,
    Map,
    DateTime,
}

impl FieldType {
    /// Returns the zero value for this field type.
    pub fn zero(&self) -> Bson {
        match self {
            FieldType::String => Bson::String(String::new()),
            FieldType::Int => Bson::Int64(0),
            FieldType::Float => Bson::Double(0.0),
            FieldType::Bool => Bson::Boolean(false),
            FieldType::List => Bson::Array(Vec::new()),
            FieldType::Map => Bson::Document(bson::Document::new()),
            FieldType::DateTime => Bson::DateTime(bson::DateTime::from_millis(0)),
        }
    }

    /// Checks whether a value satisfies this field type.
    pub fn matches(&self, value: &Bson) -> bool {
        matches!(
            (self, value),
            (FieldType::String, Bson::String(_))
                | (FieldType::Int, Bson::Int32(_))
                | (FieldType::Int, Bson::Int64(_))
                | (FieldType::Float, Bson::Double(_))
                | (FieldType::Bool, Bson::Boolean(_))
                | (FieldType::List, Bson::Array(_))
                | (FieldType::Map, Bson::Document(_))
                | (FieldType::DateTime, Bson::DateTime(_))
        )
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Int => write!(f, "int"),
            FieldType::Float => write!(f, "float"),
            FieldType::Bool => write!(f, "bool"),
            FieldType::List => write!(f, "list"),
            FieldType::Map => write!(f, "map"),
            FieldType::DateTime => write!(f, "datetime"),
        }
    }
}

/// Ordered field descriptor for a model.
///
/// A schema maps declared field names to their [`FieldType`], in
/// declaration order. It is supplied once per record type and drives
/// validated construction: declared fields take the supplied value or the
/// type's zero value when omitted, wrong-typed values are rejected, and so
/// are supplied fields the schema never declared.
///
/// # Examples
///
/// ```rust,ignore
/// use charm::repository::{FieldType, Schema};
///
/// let schema = Schema::builder()
///     .field("first_name", FieldType::String)
///     .field("age", FieldType::Int)
///     .build();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    fields: IndexMap<String, FieldType>,
}

impl Schema {
    /// Creates a new builder for declaring fields.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Checks whether the schema declares the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns the declared type of a field, if declared.
    pub fn field_type(&self, field: &str) -> Option<FieldType> {
        self.fields.get(field).copied()
    }

    /// Returns the number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Checks whether no fields are declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over the declared fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, FieldType)> {
        self.fields.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    /// Validates supplied values against the schema, producing a complete
    /// field mapping in declaration order.
    ///
    /// Every declared field lands in the output: with the supplied value
    /// when given, with the type's zero value otherwise. An `_id` entry is
    /// passed through untouched.
    ///
    /// # Errors
    ///
    /// - `TypeMismatch` if a supplied value does not satisfy the declared
    ///   type
    /// - `Field` if a supplied field is not declared by the schema
    pub fn apply(&self, mut supplied: bson::Document) -> CharmResult<bson::Document> {
        let id = supplied.remove(DOC_ID);
        let mut output = bson::Document::new();
        for (name, field_type) in &self.fields {
            match supplied.remove(name) {
                Some(value) => {
                    if !field_type.matches(&value) {
                        log::error!(
                            "expected {} to be of type {}, got {:?}",
                            name,
                            field_type,
                            value
                        );
                        return Err(CharmError::new(
                            &format!("expected {} to be of type {}", name, field_type),
                            ErrorKind::TypeMismatch,
                        ));
                    }
                    output.insert(name.clone(), value);
                }
                None => {
                    output.insert(name.clone(), field_type.zero());
                }
            }
        }
        if let Some((name, _)) = supplied.iter().next() {
            log::error!("field {} is not declared by the schema", name);
            return Err(CharmError::new(
                &format!("field {} is not declared by the schema", name),
                ErrorKind::Field,
            ));
        }
        if let Some(id) = id {
            output.insert(DOC_ID, id);
        }
        Ok(output)
    }
}

/// Fluent builder for [`Schema`] values.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: IndexMap<String, FieldType>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        SchemaBuilder {
            fields: IndexMap::new(),
        }
    }

    /// Declares a field with its type. Redeclaring a field keeps its
    /// original position and overwrites its type.
    pub fn field(mut self, name: &str, field_type: FieldType) -> Self {
        self.fields.insert(name.to_string(), field_type);
        self
    }

    pub fn build(self) -> Schema {
        Schema {
            fields: self.fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn user_schema() -> Schema {
        Schema::builder()
            .field("name", FieldType::String)
            .field("age", FieldType::Int)
            .field("active", FieldType::Bool)
            .build()
    }

    #[test]
    fn apply_keeps_supplied_values() {
        let validated = user_schema()
            .apply(doc! {"name": "Alice", "age": 30, "active": true})
            .unwrap();
        assert_eq!(validated.get_str("name").unwrap(), "Alice");
        assert_eq!(validated.get_i32("age").unwrap(), 30);
        assert!(validated.get_bool("active").unwrap());
    }

    #[test]
    fn apply_fills_omitted_fields_with_zero_values() {
        let validated = user_schema().apply(doc! {"name": "Alice"}).unwrap();
        assert_eq!(validated.get_i64("age").unwrap(), 0);
        assert!(!validated.get_bool("active").unwrap());
    }

    #[test]
    fn apply_rejects_wrong_type() {
        let err = user_schema()
            .apply(doc! {"name": "Alice", "age": "thirty"})
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::TypeMismatch);
    }

    #[test]
    fn apply_rejects_undeclared_field() {
        let err = user_schema()
            .apply(doc! {"name": "Alice", "shoe_size": 42})
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Field);
    }

    #[test]
    fn apply_passes_identity_through() {
        let validated = user_schema()
            .apply(doc! {"_id": "abc", "name": "Alice"})
            .unwrap();
        assert_eq!(validated.get_str("_id").unwrap(), "abc");
    }

    #[test]
    fn apply_emits_fields_in_declaration_order() {
        let validated = user_schema().apply(doc! {"active": true}).unwrap();
        let names: Vec<&str> = validated.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["name", "age", "active"]);
    }

    #[test]
    fn int_accepts_both_widths() {
        assert!(FieldType::Int.matches(&Bson::Int32(1)));
        assert!(FieldType::Int.matches(&Bson::Int64(1)));
        assert!(!FieldType::Int.matches(&Bson::Double(1.0)));
    }

    #[test]
    fn zero_values_match_their_own_type() {
        for field_type in [
            FieldType::String,
            FieldType::Int,
            FieldType::Float,
            FieldType::Bool,
            FieldType::List,
            FieldType::Map,
            FieldType::DateTime,
        ] {
            assert!(field_type.matches(&field_type.zero()));
        }
    }
}
