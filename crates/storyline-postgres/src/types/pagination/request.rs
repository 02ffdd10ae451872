//! Page requests and their resolution into a single range query.

use uuid::Uuid;

use super::{Cursor, PageError, RangeFilter, RangeQuery, SortOrder};

/// Page size used when the request names neither `first` nor `last`.
pub const DEFAULT_LIMIT: i64 = 10;

/// Maximum number of items per page.
pub const MAX_LIMIT: i64 = 100;

/// Extra rows fetched beyond the page size: one for the boundary record
/// reappearing, one for detecting a further page.
const OVER_FETCH: i64 = 2;

/// Direction a page is read in, relative to the boundary cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Records after the boundary, read in ascending order.
    Forward,
    /// Records before the boundary, read in descending order.
    Backward,
}

impl Direction {
    /// Returns the order the range store is asked to read in.
    #[inline]
    pub fn sort_order(self) -> SortOrder {
        match self {
            Direction::Forward => SortOrder::Ascending,
            Direction::Backward => SortOrder::Descending,
        }
    }
}

/// Caller-facing pagination arguments.
///
/// Follows the connection argument convention: `first` with `after` reads
/// forward, `last` with `before` reads backward. Cursors are kept as the raw
/// tokens the caller sent and are decoded during [`PageRequest::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Restricts the listing to these ids. Empty means no restriction.
    pub ids: Vec<Uuid>,
    /// Restricts the listing to a single story.
    pub story_id: Option<Uuid>,
    /// Token of the record the forward page starts after.
    pub after: Option<String>,
    /// Token of the record the backward page ends before.
    pub before: Option<String>,
    /// Forward page size.
    pub first: Option<i64>,
    /// Backward page size.
    pub last: Option<i64>,
}

impl PageRequest {
    /// Creates a forward request for the first `n` records.
    pub fn first(n: i64) -> Self {
        Self {
            first: Some(n),
            ..Self::default()
        }
    }

    /// Creates a backward request for the last `n` records.
    pub fn last(n: i64) -> Self {
        Self {
            last: Some(n),
            ..Self::default()
        }
    }

    /// Sets the forward boundary token.
    pub fn after(mut self, token: impl Into<String>) -> Self {
        self.after = Some(token.into());
        self
    }

    /// Sets the backward boundary token.
    pub fn before(mut self, token: impl Into<String>) -> Self {
        self.before = Some(token.into());
        self
    }

    /// Restricts the request to one story.
    pub fn with_story_id(mut self, story_id: Uuid) -> Self {
        self.story_id = Some(story_id);
        self
    }

    /// Restricts the request to the given ids.
    pub fn with_ids(mut self, ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.ids = ids.into_iter().collect();
        self
    }

    /// Validates the arguments and fixes direction, limit and boundary.
    ///
    /// # Errors
    ///
    /// - [`PageError::InvalidArguments`] when both page sizes or both
    ///   boundaries are given, or a boundary points the other way than the
    ///   page size.
    /// - [`PageError::InvalidCursor`] when the boundary token does not decode.
    pub fn resolve<E>(&self) -> Result<ResolvedRequest, PageError<E>> {
        let (direction, size) = match (self.first, self.last) {
            (Some(_), Some(_)) => {
                return Err(PageError::InvalidArguments(
                    "`first` and `last` cannot be combined",
                ));
            }
            (Some(first), None) => (Direction::Forward, first),
            (None, Some(last)) => (Direction::Backward, last),
            (None, None) if self.before.is_some() && self.after.is_none() => {
                (Direction::Backward, DEFAULT_LIMIT)
            }
            (None, None) => (Direction::Forward, DEFAULT_LIMIT),
        };

        let token = match (direction, &self.after, &self.before) {
            (_, Some(_), Some(_)) => {
                return Err(PageError::InvalidArguments(
                    "`after` and `before` cannot be combined",
                ));
            }
            (Direction::Forward, None, Some(_)) => {
                return Err(PageError::InvalidArguments(
                    "`before` requires `last`",
                ));
            }
            (Direction::Backward, Some(_), None) => {
                return Err(PageError::InvalidArguments(
                    "`after` requires `first`",
                ));
            }
            (Direction::Forward, after, None) => after.as_deref(),
            (Direction::Backward, None, before) => before.as_deref(),
        };

        let boundary = token.map(Cursor::decode).transpose()?;

        Ok(ResolvedRequest {
            direction,
            limit: size.clamp(1, MAX_LIMIT),
            boundary,
            filter: RangeFilter {
                ids: self.ids.clone(),
                story_id: self.story_id,
            },
        })
    }
}

/// A validated [`PageRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    /// Reading direction.
    pub direction: Direction,
    /// Page size, within `1..=MAX_LIMIT`.
    pub limit: i64,
    /// Decoded boundary cursor, if any.
    pub boundary: Option<Cursor>,
    /// Equality filters applied verbatim.
    pub filter: RangeFilter,
}

impl ResolvedRequest {
    /// Number of rows requested from the store.
    #[inline]
    pub fn fetch_limit(&self) -> i64 {
        self.limit + OVER_FETCH
    }

    /// Builds the single range read for this request.
    pub fn range_query(&self) -> RangeQuery {
        RangeQuery {
            filter: self.filter.clone(),
            boundary: self.boundary,
            order: self.direction.sort_order(),
            limit: self.fetch_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use jiff::Timestamp;

    use super::*;
    use crate::types::CursorError;

    fn resolve(request: &PageRequest) -> Result<ResolvedRequest, PageError<Infallible>> {
        request.resolve()
    }

    fn token() -> String {
        Cursor::new(Timestamp::from_second(100).unwrap(), Uuid::from_u128(7)).encode()
    }

    #[test]
    fn defaults_to_forward_page() {
        let resolved = resolve(&PageRequest::default()).unwrap();
        assert_eq!(resolved.direction, Direction::Forward);
        assert_eq!(resolved.limit, DEFAULT_LIMIT);
        assert_eq!(resolved.boundary, None);
    }

    #[test]
    fn before_without_size_reads_backward() {
        let request = PageRequest::default().before(token());
        let resolved = resolve(&request).unwrap();
        assert_eq!(resolved.direction, Direction::Backward);
        assert_eq!(resolved.limit, DEFAULT_LIMIT);
        assert!(resolved.boundary.is_some());
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(resolve(&PageRequest::first(0)).unwrap().limit, 1);
        assert_eq!(resolve(&PageRequest::first(-5)).unwrap().limit, 1);
        assert_eq!(resolve(&PageRequest::last(500)).unwrap().limit, MAX_LIMIT);
    }

    #[test]
    fn fetch_limit_over_fetches_by_two() {
        let resolved = resolve(&PageRequest::first(25)).unwrap();
        assert_eq!(resolved.fetch_limit(), 27);

        let query = resolved.range_query();
        assert_eq!(query.limit, 27);
        assert_eq!(query.order, SortOrder::Ascending);
    }

    #[test]
    fn backward_reads_descending() {
        let query = resolve(&PageRequest::last(3)).unwrap().range_query();
        assert_eq!(query.order, SortOrder::Descending);
    }

    #[test]
    fn rejects_conflicting_arguments() {
        let both_sizes = PageRequest {
            first: Some(1),
            last: Some(1),
            ..PageRequest::default()
        };
        let both_cursors = PageRequest::default().after(token()).before(token());
        let first_before = PageRequest::first(2).before(token());
        let last_after = PageRequest::last(2).after(token());

        for request in [both_sizes, both_cursors, first_before, last_after] {
            assert!(
                matches!(resolve(&request), Err(PageError::InvalidArguments(_))),
                "{request:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_malformed_cursor() {
        let request = PageRequest::first(2).after("definitely-not-a-cursor");
        assert!(matches!(
            resolve(&request),
            Err(PageError::InvalidCursor(CursorError::Encoding))
        ));
    }

    #[test]
    fn filters_are_carried_verbatim() {
        let story_id = Uuid::from_u128(42);
        let ids = [Uuid::from_u128(1), Uuid::from_u128(2)];
        let request = PageRequest::first(5).with_story_id(story_id).with_ids(ids);

        let query = resolve(&request).unwrap().range_query();
        assert_eq!(query.filter.story_id, Some(story_id));
        assert_eq!(query.filter.ids, ids.to_vec());
    }
}
