// doc constants
pub const DOC_ID: &str = "_id";

// counter constants
pub const COUNTERS_COLLECTION: &str = "counters";
pub const SEQUENCE_VALUE: &str = "sequence_value";
pub const DEFAULT_AUTO_INCREMENT: i64 = 2;

// connection constants
pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: u64 = 2;
