#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! HTTP API for story comments.
//!
//! [`handler::routes`] builds the aide [`ApiRouter`] with every comment
//! route. [`middleware`] layers recovery, observability and the OpenAPI
//! documentation on top, and [`service::ServiceState`] carries the database
//! pool and session keys the handlers extract.
//!
//! [`ApiRouter`]: aide::axum::ApiRouter

pub mod extract;
pub mod handler;
pub mod middleware;
pub mod service;

pub use crate::handler::{Error, ErrorKind, Result};

// Tracing target constants for consistent logging.

/// Bearer token validation.
pub const TRACING_TARGET_AUTHENTICATION: &str = "storyline_server::authentication";

/// Request extraction failures.
pub const TRACING_TARGET_EXTRACT: &str = "storyline_server::extract";

/// Conversions of database errors into HTTP errors.
pub const TRACING_TARGET_POSTGRES: &str = "storyline_server::postgres";

/// Service state initialization.
pub const TRACING_TARGET_SERVICE: &str = "storyline_server::service";
