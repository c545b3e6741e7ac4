use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;
use std::sync::Arc;

/// Error kinds for Charm operations.
///
/// This enum represents all possible error categories that can occur while
/// mapping documents onto a database. Each kind describes a specific category
/// of failure, enabling precise error handling.
///
/// # Examples
///
/// ```rust,ignore
/// use charm::errors::{CharmError, ErrorKind, CharmResult};
///
/// fn example() -> CharmResult<()> {
///     Err(CharmError::new("no connection", ErrorKind::Connection))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// No connection, failed connection, or exhausted connection retries
    Connection,
    /// Missing or invalid collection binding (e.g. absent `counters` collection)
    Collection,
    /// Field-level failure: missing field on removal, missing auto key on save,
    /// or assignment to an undeclared field
    Field,
    /// A model with the same name is already registered
    ModelExists,
    /// Malformed document content rejected during persistence
    Document,
    /// A supplied value does not match the field's declared type
    TypeMismatch,
    /// Any other failure reported by the underlying driver
    Backend,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Connection => write!(f, "Connection error"),
            ErrorKind::Collection => write!(f, "Collection error"),
            ErrorKind::Field => write!(f, "Field error"),
            ErrorKind::ModelExists => write!(f, "Model exists error"),
            ErrorKind::Document => write!(f, "Document error"),
            ErrorKind::TypeMismatch => write!(f, "Type mismatch error"),
            ErrorKind::Backend => write!(f, "Backend error"),
        }
    }
}

/// Custom Charm error type.
///
/// `CharmError` encapsulates error information including the error message,
/// kind, and optional cause. It supports error chaining and backtraces for
/// debugging.
///
/// # Examples
///
/// ```rust,ignore
/// use charm::errors::{CharmError, ErrorKind};
///
/// // Create a simple error
/// let err = CharmError::new("collection does not exist", ErrorKind::Collection);
///
/// // Create an error with a cause
/// let cause = CharmError::new("ping failed", ErrorKind::Backend);
/// let err = CharmError::new_with_cause("could not connect to database", ErrorKind::Connection, cause);
/// ```
///
/// # Type alias
///
/// The `CharmResult<T>` type alias is equivalent to `Result<T, CharmError>`
/// and is used throughout the codebase for operations that can fail.
#[derive(Clone)]
pub struct CharmError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<CharmError>>,
    backtrace: Arc<Backtrace>,
}

impl CharmError {
    /// Creates a new `CharmError` with the specified message and error kind.
    ///
    /// # Arguments
    ///
    /// * `message` - A description of the error
    /// * `error_kind` - The category of error
    ///
    /// # Returns
    ///
    /// A new `CharmError` instance.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        CharmError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    /// Creates a new `CharmError` with a cause error.
    ///
    /// This creates an error chain where the cause error is preserved for
    /// debugging.
    ///
    /// # Arguments
    ///
    /// * `message` - A description of the error
    /// * `error_kind` - The category of error
    /// * `cause` - The underlying error that caused this error
    ///
    /// # Returns
    ///
    /// A new `CharmError` instance with the cause error attached.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: CharmError) -> Self {
        CharmError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&CharmError> {
        self.cause.as_deref()
    }
}

impl Display for CharmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for CharmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace),
        }
    }
}

impl Error for CharmError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for Charm operations.
///
/// `CharmResult<T>` is shorthand for `Result<T, CharmError>`.
/// All fallible Charm operations return this type.
pub type CharmResult<T> = Result<T, CharmError>;
