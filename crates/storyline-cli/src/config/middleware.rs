//! Middleware configuration for the HTTP server.
//!
//! ```bash
//! storyline --request-timeout 60 --open-api-json /docs/openapi.json
//! ```

use anyhow::{Result as AnyhowResult, anyhow};
use clap::Args;
use storyline_server::middleware::{OpenApiConfig, RecoveryConfig};

use super::TRACING_TARGET_CONFIG;

/// Longest accepted request deadline, in seconds.
const MAX_REQUEST_TIMEOUT: u64 = 300;

/// OpenAPI and recovery settings.
#[derive(Debug, Clone, Args)]
pub struct MiddlewareConfig {
    /// Paths of the OpenAPI document and the Scalar UI.
    #[clap(flatten)]
    pub openapi: OpenApiConfig,

    /// Request timeout and panic recovery.
    #[clap(flatten)]
    pub recovery: RecoveryConfig,
}

impl MiddlewareConfig {
    pub fn validate(&self) -> AnyhowResult<()> {
        let timeout = self.recovery.request_timeout;
        if timeout == 0 || timeout > MAX_REQUEST_TIMEOUT {
            return Err(anyhow!(
                "Request timeout {timeout} seconds is invalid. Must be between 1 and {MAX_REQUEST_TIMEOUT} seconds."
            ));
        }

        for path in [&self.openapi.open_api_json, &self.openapi.scalar_ui] {
            if !path.starts_with('/') {
                return Err(anyhow!("Documentation path '{path}' must start with '/'."));
            }
        }

        Ok(())
    }

    /// Logs middleware configuration at info level.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            openapi_path = %self.openapi.open_api_json,
            scalar_path = %self.openapi.scalar_ui,
            "OpenAPI configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            request_timeout_secs = self.recovery.request_timeout,
            "Recovery configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn middleware() -> MiddlewareConfig {
        MiddlewareConfig {
            openapi: OpenApiConfig::default(),
            recovery: RecoveryConfig::default(),
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(middleware().validate().is_ok());
    }

    #[test]
    fn reject_out_of_range_request_timeouts() {
        let mut config = middleware();

        config.recovery = RecoveryConfig::with_timeout_secs(0);
        assert!(config.validate().is_err());

        config.recovery = RecoveryConfig::with_timeout_secs(301);
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_relative_documentation_paths() {
        let mut config = middleware();
        config.openapi.scalar_ui = "scalar".to_owned();
        assert!(config.validate().is_err());
    }
}
