use crate::driver::MongoDriver;
use charm::charm::Charm;
use charm::errors::{CharmError, CharmResult, ErrorKind};
use std::env;

/// Environment variable holding the connection string.
pub const ENV_CONNECTION_STRING: &str = "MONGO_DB_CONNECTION_STRING";

/// Environment variable holding the database name.
pub const ENV_DATABASE_NAME: &str = "MONGO_DB_NAME";

/// Opens a [`Charm`] handle against the given deployment.
///
/// Connection establishment uses the builder defaults: 3 attempts with a
/// 2-second backoff base. For other settings, build the driver yourself
/// and configure [`Charm::builder`].
pub fn open(connection_string: &str, database: &str) -> CharmResult<Charm> {
    let driver = MongoDriver::connect(connection_string, database)?;
    Charm::builder().open(driver.into_driver())
}

/// Opens a [`Charm`] handle from the environment.
///
/// Reads [`ENV_CONNECTION_STRING`] and [`ENV_DATABASE_NAME`]; both must be
/// set.
///
/// # Errors
///
/// `Connection` if either variable is absent, with a message pointing at
/// the explicit [`open`] call as the alternative.
pub fn open_from_env() -> CharmResult<Charm> {
    let driver = driver_from_env()?;
    Charm::builder().open(driver.into_driver())
}

/// Builds a [`MongoDriver`] from the environment without opening a handle.
pub fn driver_from_env() -> CharmResult<MongoDriver> {
    match (
        env::var(ENV_CONNECTION_STRING),
        env::var(ENV_DATABASE_NAME),
    ) {
        (Ok(connection_string), Ok(database)) => {
            MongoDriver::connect(&connection_string, &database)
        }
        _ => {
            log::error!("no connection configured in the environment");
            Err(CharmError::new(
                &format!(
                    "no connection configured; call open with a connection string \
                     or set the {} and {} environment variables",
                    ENV_CONNECTION_STRING, ENV_DATABASE_NAME
                ),
                ErrorKind::Connection,
            ))
        }
    }
}
