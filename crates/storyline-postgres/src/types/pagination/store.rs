//! The range read the pagination engine issues against a store.

use std::future::Future;

use uuid::Uuid;

use super::{Cursor, HasCursor};

/// Sort order of a range read over `(timestamp, id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Equality constraints of a range read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeFilter {
    /// Only records with one of these ids. Empty means any id.
    pub ids: Vec<Uuid>,
    /// Only records of this story.
    pub story_id: Option<Uuid>,
}

impl RangeFilter {
    /// Returns whether the record satisfies every constraint.
    pub fn matches<T: RangeRecord>(&self, record: &T) -> bool {
        let id_matches = self.ids.is_empty() || self.ids.contains(&record.cursor().id);
        let story_matches = self.story_id.is_none_or(|story_id| record.story_id() == story_id);
        id_matches && story_matches
    }
}

/// A filtered, sorted and limited read over the cursor order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeQuery {
    /// Equality constraints.
    pub filter: RangeFilter,
    /// Inclusive bound in the direction of `order`.
    ///
    /// Ascending reads admit `(timestamp, id) >= boundary`, descending reads
    /// admit `(timestamp, id) <= boundary`.
    pub boundary: Option<Cursor>,
    /// Order records are returned in.
    pub order: SortOrder,
    /// Maximum number of records returned.
    pub limit: i64,
}

impl RangeQuery {
    /// Returns whether a position lies on the admitted side of the boundary.
    pub fn admits(&self, cursor: &Cursor) -> bool {
        match (self.boundary, self.order) {
            (None, _) => true,
            (Some(boundary), SortOrder::Ascending) => *cursor >= boundary,
            (Some(boundary), SortOrder::Descending) => *cursor <= boundary,
        }
    }
}

/// Records a [`RangeStore`] can filter.
pub trait RangeRecord: HasCursor {
    /// Story the record belongs to.
    fn story_id(&self) -> Uuid;
}

/// A collection ordered by `(timestamp, id)` that answers range reads.
///
/// Implementations return records in exactly the requested order, honor the
/// filter and limit exactly, and never deduplicate.
pub trait RangeStore<T: HasCursor> {
    /// Error reported when the read fails.
    type Error;

    /// Executes one range read.
    fn range_query(
        &mut self,
        query: &RangeQuery,
    ) -> impl Future<Output = Result<Vec<T>, Self::Error>> + Send;
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;

    fn at(second: i64, id: u128) -> Cursor {
        Cursor::new(Timestamp::from_second(second).unwrap(), Uuid::from_u128(id))
    }

    fn query(boundary: Option<Cursor>, order: SortOrder) -> RangeQuery {
        RangeQuery {
            filter: RangeFilter::default(),
            boundary,
            order,
            limit: 10,
        }
    }

    #[test]
    fn ascending_bound_is_inclusive_tuple() {
        let query = query(Some(at(10, 5)), SortOrder::Ascending);
        assert!(query.admits(&at(10, 5)));
        assert!(query.admits(&at(10, 6)));
        assert!(query.admits(&at(11, 1)));
        assert!(!query.admits(&at(10, 4)));
        assert!(!query.admits(&at(9, 9)));
    }

    #[test]
    fn descending_bound_is_inclusive_tuple() {
        let query = query(Some(at(10, 5)), SortOrder::Descending);
        assert!(query.admits(&at(10, 5)));
        assert!(query.admits(&at(10, 4)));
        assert!(query.admits(&at(9, 9)));
        assert!(!query.admits(&at(10, 6)));
        assert!(!query.admits(&at(11, 1)));
    }

    #[test]
    fn unbounded_query_admits_everything() {
        let query = query(None, SortOrder::Descending);
        assert!(query.admits(&at(i32::MAX as i64, u128::MAX)));
    }
}
