//! Database query repositories for all entities in the system.
//!
//! Repositories are traits implemented for [`PgConnection`], so they apply to
//! any pooled [`PgConn`] through deref.
//!
//! [`PgConnection`]: crate::PgConnection
//! [`PgConn`]: crate::PgConn

pub mod comment;

pub use comment::CommentRepository;
