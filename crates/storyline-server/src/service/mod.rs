//! Application state and dependency injection.

mod config;
mod error;
mod session_keys;
mod state;

pub use crate::service::config::{ServiceConfig, SessionConfig};
pub use crate::service::error::{ServiceError, ServiceResult};
pub use crate::service::session_keys::SessionKeys;
pub use crate::service::state::ServiceState;
