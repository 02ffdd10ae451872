//! Request extractors.
//!
//! - [`AuthState`] verifies the bearer session token and yields its
//!   [`AuthClaims`].
//! - [`Json`], [`Path`] and [`Query`] replace axum's extractors so every
//!   rejection renders as the crate's error body.
//! - [`ValidateJson`] and [`ValidateQuery`] additionally run `validator`
//!   rules.

pub mod auth;
pub mod reject;

pub use crate::extract::auth::{AuthClaims, AuthState};
pub use crate::extract::reject::{Json, Path, Query, ValidateJson, ValidateQuery};
