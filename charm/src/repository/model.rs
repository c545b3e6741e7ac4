use crate::repository::Schema;

/// Trait that binds a record type to its collection and field schema.
///
/// # Purpose
/// A model declares, once per record type, the metadata the mapping layer
/// needs: the collection the records live in and the ordered field schema
/// their construction is validated against. Records of the type are
/// handled as [`Record<M>`](crate::repository::Record) instances through a
/// [`Repository<M>`](crate::repository::Repository).
///
/// # Characteristics
/// - Implemented on a marker type; no instance is ever needed
/// - The schema drives zero-value defaults and type checks at construction
/// - Records of a model enforce the strict assignment guard: only declared
///   fields can be set
///
/// # Usage
/// ```ignore
/// use charm::repository::{FieldType, Model, Schema};
///
/// pub struct User;
///
/// impl Model for User {
///     fn collection_name() -> String {
///         "users".to_string()
///     }
///
///     fn schema() -> Schema {
///         Schema::builder()
///             .field("first_name", FieldType::String)
///             .field("last_name", FieldType::String)
///             .field("age", FieldType::Int)
///             .build()
///     }
/// }
///
/// let users = db.repository::<User>()?;
/// let mut alice = users.create(doc! {"first_name": "Alice"})?;
/// ```
pub trait Model {
    /// Returns the name of the collection this model is bound to.
    fn collection_name() -> String;

    /// Returns the ordered field schema for this model.
    ///
    /// Called when a repository is opened; the repository caches the result
    /// for its lifetime.
    fn schema() -> Schema;
}
