//! Response types for HTTP handlers.

mod comments;
mod errors;

pub use comments::*;
pub use errors::*;
