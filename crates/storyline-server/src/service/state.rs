use storyline_postgres::PgClient;

use crate::TRACING_TARGET_SERVICE;
use crate::service::{ServiceConfig, ServiceResult, SessionKeys};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    pub postgres: PgClient,
    pub session_keys: SessionKeys,
}

impl ServiceState {
    #[inline]
    pub fn new(postgres: PgClient, session_keys: SessionKeys) -> Self {
        Self {
            postgres,
            session_keys,
        }
    }

    /// Validates the configuration, connects to the database and derives the
    /// session keys.
    pub async fn from_config(config: &ServiceConfig) -> ServiceResult<Self> {
        config.validate()?;

        let session_keys = config.load_session_keys()?;
        let postgres = config.connect_postgres().await?;

        tracing::info!(
            target: TRACING_TARGET_SERVICE,
            database_url = %config.postgres.database_url_masked(),
            "Service state initialized"
        );

        Ok(Self::new(postgres, session_keys))
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(postgres: PgClient);
impl_di!(session_keys: SessionKeys);
