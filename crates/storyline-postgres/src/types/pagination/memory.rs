use std::convert::Infallible;

use super::{HasCursor, RangeQuery, RangeRecord, RangeStore, SortOrder};

/// A [`RangeStore`] over an in-memory vector.
///
/// Evaluates the same tuple bound as the Postgres store, so the pagination
/// engine behaves identically against both.
#[derive(Debug, Clone)]
pub struct MemoryStore<T> {
    records: Vec<T>,
    queries: usize,
}

impl<T: RangeRecord> MemoryStore<T> {
    /// Creates a store holding the given records, in any order.
    pub fn new(records: impl IntoIterator<Item = T>) -> Self {
        Self {
            records: records.into_iter().collect(),
            queries: 0,
        }
    }

    /// Adds a record.
    pub fn insert(&mut self, record: T) {
        self.records.push(record);
    }

    /// Removes every record at the given position, returning how many were removed.
    pub fn remove(&mut self, record: &impl HasCursor) -> usize {
        let cursor = record.cursor();
        let before = self.records.len();
        self.records.retain(|r| r.cursor() != cursor);
        before - self.records.len()
    }

    /// Number of range reads served so far.
    #[inline]
    pub fn query_count(&self) -> usize {
        self.queries
    }
}

impl<T> RangeStore<T> for MemoryStore<T>
where
    T: RangeRecord + Clone + Send + Sync,
{
    type Error = Infallible;

    async fn range_query(&mut self, query: &RangeQuery) -> Result<Vec<T>, Self::Error> {
        self.queries += 1;

        let mut matched: Vec<T> = self
            .records
            .iter()
            .filter(|record| query.filter.matches(*record) && query.admits(&record.cursor()))
            .cloned()
            .collect();

        matched.sort_by_key(|record| record.cursor());
        if query.order == SortOrder::Descending {
            matched.reverse();
        }

        matched.truncate(usize::try_from(query.limit).unwrap_or_default());
        Ok(matched)
    }
}
