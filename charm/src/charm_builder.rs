use crate::charm::Charm;
use crate::common::{DEFAULT_RETRIES, DEFAULT_RETRY_DELAY};
use crate::driver::Driver;
use crate::errors::{CharmError, CharmResult, ErrorKind};
use std::thread;
use std::time::Duration;

/// Builder for configuring and opening a [`Charm`] database handle.
///
/// `CharmBuilder` provides a fluent API for connection options and captures
/// configuration errors so they are propagated when opening. Opening runs
/// the liveness check against the driver and retries with exponential
/// backoff: after a failed attempt the builder sleeps
/// `retry_delay ^ attempt` seconds before the next one, up to `retries`
/// attempts in total. A first-attempt success incurs no delay.
///
/// Retries apply to connection establishment only; once open, no operation
/// is retried by the mapping layer.
///
/// # Examples
///
/// ```rust,ignore
/// use charm::charm::Charm;
///
/// let db = Charm::builder()
///     .retries(5)
///     .retry_delay(1)
///     .open(driver)?;
/// ```
pub struct CharmBuilder {
    error: Option<CharmError>,
    retries: u32,
    retry_delay: u64,
}

impl CharmBuilder {
    /// Creates a new builder with default configuration: 3 attempts, a
    /// 2-second backoff base.
    pub fn new() -> Self {
        CharmBuilder {
            error: None,
            retries: DEFAULT_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Sets the total number of connection attempts.
    ///
    /// Must be at least 1; a zero value is captured as an error and
    /// returned when calling [`open`](CharmBuilder::open).
    pub fn retries(mut self, retries: u32) -> Self {
        if self.error.is_none() && retries == 0 {
            self.error = Some(CharmError::new(
                "retries must be at least 1",
                ErrorKind::Connection,
            ));
        }
        self.retries = retries;
        self
    }

    /// Sets the backoff base in seconds between failed connection attempts.
    pub fn retry_delay(mut self, retry_delay: u64) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Opens a database handle over the given driver, verifying liveness
    /// with retry.
    ///
    /// # Errors
    ///
    /// `Connection` once all attempts are exhausted; the last ping failure
    /// is preserved as the error's cause.
    pub fn open(self, driver: Driver) -> CharmResult<Charm> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let mut attempt = 0;
        loop {
            match driver.ping() {
                Ok(()) => {
                    log::debug!("connected to database {}", driver.database_name());
                    break;
                }
                Err(cause) => {
                    attempt += 1;
                    if attempt >= self.retries {
                        log::error!(
                            "could not connect to database after {} attempts",
                            attempt
                        );
                        return Err(CharmError::new_with_cause(
                            "could not connect to database",
                            ErrorKind::Connection,
                            cause,
                        ));
                    }
                    let delay = self.retry_delay.pow(attempt - 1);
                    log::warn!(
                        "connection attempt {} failed, retrying in {}s: {}",
                        attempt,
                        delay,
                        cause
                    );
                    thread::sleep(Duration::from_secs(delay));
                }
            }
        }
        Ok(Charm::new(driver))
    }
}

impl Default for CharmBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{DriverProvider, MemoryDriver, UpdateOutcome};
    use bson::Bson;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    /// Driver whose pings always fail, counting the attempts.
    struct UnreachableDriver {
        pings: Arc<AtomicU32>,
    }

    impl DriverProvider for UnreachableDriver {
        fn ping(&self) -> CharmResult<()> {
            self.pings.fetch_add(1, Ordering::SeqCst);
            Err(CharmError::new("connection refused", ErrorKind::Backend))
        }

        fn database_name(&self) -> String {
            "unreachable".to_string()
        }

        fn collection_names(&self) -> CharmResult<Vec<String>> {
            unimplemented!()
        }

        fn insert_one(&self, _: &str, _: bson::Document) -> CharmResult<Bson> {
            unimplemented!()
        }

        fn replace_one(
            &self,
            _: &str,
            _: bson::Document,
            _: bson::Document,
        ) -> CharmResult<UpdateOutcome> {
            unimplemented!()
        }

        fn update_one(
            &self,
            _: &str,
            _: bson::Document,
            _: bson::Document,
        ) -> CharmResult<UpdateOutcome> {
            unimplemented!()
        }

        fn find_one(&self, _: &str, _: bson::Document) -> CharmResult<Option<bson::Document>> {
            unimplemented!()
        }

        fn find(&self, _: &str, _: bson::Document) -> CharmResult<Vec<bson::Document>> {
            unimplemented!()
        }

        fn find_one_and_update(
            &self,
            _: &str,
            _: bson::Document,
            _: bson::Document,
            _: bool,
        ) -> CharmResult<Option<bson::Document>> {
            unimplemented!()
        }

        fn delete_many(&self, _: &str, _: bson::Document) -> CharmResult<u64> {
            unimplemented!()
        }

        fn count_documents(&self, _: &str) -> CharmResult<u64> {
            unimplemented!()
        }
    }

    #[test]
    fn open_succeeds_on_first_attempt_without_delay() {
        let started = Instant::now();
        let db = CharmBuilder::new()
            .open(MemoryDriver::new().into_driver())
            .unwrap();
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(db.database_name(), "memory");
    }

    #[test]
    fn open_exhausts_exactly_the_configured_attempts() {
        let pings = Arc::new(AtomicU32::new(0));
        let driver = Driver::new(UnreachableDriver {
            pings: pings.clone(),
        });

        let err = CharmBuilder::new()
            .retries(3)
            .retry_delay(0)
            .open(driver)
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Connection);
        assert_eq!(pings.load(Ordering::SeqCst), 3);
        assert_eq!(err.cause().unwrap().message(), "connection refused");
    }

    #[test]
    fn single_attempt_fails_without_sleeping() {
        let pings = Arc::new(AtomicU32::new(0));
        let driver = Driver::new(UnreachableDriver {
            pings: pings.clone(),
        });

        let started = Instant::now();
        let err = CharmBuilder::new().retries(1).open(driver).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Connection);
        assert_eq!(pings.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn zero_retries_is_a_captured_configuration_error() {
        let err = CharmBuilder::new()
            .retries(0)
            .open(MemoryDriver::new().into_driver())
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Connection);
        assert_eq!(err.message(), "retries must be at least 1");
    }
}
