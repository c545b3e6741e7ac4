use crate::common::DEFAULT_AUTO_INCREMENT;

/// Options controlling how a document is persisted.
///
/// The auto field support emulates auto-incrementing keys: when
/// `auto_field` is set, the save resolves the next value of the named
/// counter sequence (`auto_key`) and writes it into the document before
/// persisting. Using an auto field without naming its counter sequence is
/// a field error.
///
/// # Examples
///
/// ```rust,ignore
/// use charm::collection::SaveOptions;
///
/// let options = SaveOptions::new()
///     .auto_field("order_no")
///     .auto_key("order_seq");
/// orders.save_with(&mut order, &options)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOptions {
    auto_field: Option<String>,
    auto_key: Option<String>,
    increment: i64,
}

impl SaveOptions {
    /// Creates save options with no auto field and the default increment.
    pub fn new() -> Self {
        SaveOptions {
            auto_field: None,
            auto_key: None,
            increment: DEFAULT_AUTO_INCREMENT,
        }
    }

    /// Names the document field that receives the next sequence value.
    pub fn auto_field(mut self, field: &str) -> Self {
        self.auto_field = Some(field.to_string());
        self
    }

    /// Names the counter sequence to resolve the value from.
    pub fn auto_key(mut self, key: &str) -> Self {
        self.auto_key = Some(key.to_string());
        self
    }

    /// Overrides how much the sequence advances per save.
    pub fn increment(mut self, increment: i64) -> Self {
        self.increment = increment;
        self
    }

    pub fn get_auto_field(&self) -> Option<&str> {
        self.auto_field.as_deref()
    }

    pub fn get_auto_key(&self) -> Option<&str> {
        self.auto_key.as_deref()
    }

    pub fn get_increment(&self) -> i64 {
        self.increment
    }
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Shorthand for options using an auto-incremented field.
///
/// Equivalent to `SaveOptions::new().auto_field(field).auto_key(key)`.
pub fn auto(field: &str, key: &str) -> SaveOptions {
    SaveOptions::new().auto_field(field).auto_key(key)
}
