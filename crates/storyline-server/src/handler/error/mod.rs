//! [`Error`], [`ErrorKind`] and [`Result`].

mod http_error;
mod pg_error;
mod validation;

pub use http_error::{Error, ErrorKind, Result};
