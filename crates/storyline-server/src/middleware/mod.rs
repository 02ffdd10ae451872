//! Router extensions layering cross-cutting behavior onto the API.
//!
//! Apply them outermost last: observability wraps recovery, so timeouts and
//! panics are traced like any other response.

mod observability;
mod recovery;
mod specification;

pub use observability::{RouterObservabilityExt, log_request};
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use specification::{OpenApiConfig, RouterOpenApiExt};

/// Tracing target for completed requests.
pub const TRACING_TARGET_REQUEST: &str = "storyline_server::middleware::request";
