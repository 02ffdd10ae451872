//! Bidirectional cursor pagination.
//!
//! [`paginate`] turns a [`PageRequest`] into one [`RangeQuery`], runs it
//! against a [`RangeStore`] and trims the result into a [`Page`] with
//! accurate `has_next`/`has_prev` flags. Cursors travel as opaque tokens
//! produced by [`Cursor::encode`].

mod cursor;
mod engine;
mod memory;
mod page;
mod request;
mod store;

pub use cursor::{Cursor, CursorError, HasCursor};
pub use engine::{PageError, paginate};
pub use memory::MemoryStore;
pub use page::Page;
pub use request::{DEFAULT_LIMIT, Direction, MAX_LIMIT, PageRequest, ResolvedRequest};
pub use store::{RangeFilter, RangeQuery, RangeRecord, RangeStore, SortOrder};
