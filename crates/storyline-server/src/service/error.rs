use storyline_postgres::PgError;
use thiserror::Error;

/// Result type of service initialization.
pub type ServiceResult<T, E = ServiceError> = std::result::Result<T, E>;

/// Failures while building the [`ServiceState`].
///
/// [`ServiceState`]: crate::service::ServiceState
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A configuration value is missing or out of range.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The database could not be reached or migrated.
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: PgError,
    },
}

impl ServiceError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn database(message: impl Into<String>, source: PgError) -> Self {
        Self::Database {
            message: message.into(),
            source,
        }
    }
}
