//! Contains constraints, pagination and other custom types.

mod constraints;
pub mod pagination;

pub use constraints::{CommentConstraints, ConstraintCategory};
pub use pagination::{
    Cursor, CursorError, DEFAULT_LIMIT, Direction, HasCursor, MAX_LIMIT, MemoryStore, Page,
    PageError, PageRequest, RangeFilter, RangeQuery, RangeRecord, RangeStore, ResolvedRequest,
    SortOrder, paginate,
};
