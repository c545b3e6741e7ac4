//! Shared helpers for the Charm integration tests.

pub mod test_util {
    use charm::charm::Charm;
    use charm::common::{COUNTERS_COLLECTION, SEQUENCE_VALUE};
    use charm::doc;
    use charm::driver::{DriverProvider, MemoryDriver};

    /// Opens a database handle over a fresh in-memory driver.
    pub fn open_db() -> Charm {
        Charm::builder()
            .open(MemoryDriver::new().into_driver())
            .expect("failed to open in-memory database")
    }

    /// Opens a database handle with a seeded `counters` collection.
    pub fn open_db_with_counter(sequence: &str) -> Charm {
        let driver = MemoryDriver::new();
        driver
            .insert_one(
                COUNTERS_COLLECTION,
                doc! {"_id": sequence, SEQUENCE_VALUE: 0},
            )
            .expect("failed to seed counters collection");
        Charm::builder()
            .open(driver.into_driver())
            .expect("failed to open in-memory database")
    }
}
