//! Bidirectional keyset pagination over a [`RangeStore`].
//!
//! Every page costs exactly one range read. The read is bounded inclusively
//! by the boundary cursor and over-fetches by two: if the boundary record
//! comes back first it proves a page exists behind the boundary and is
//! dropped, and any row beyond the page size proves a page exists ahead.

use super::{CursorError, Direction, HasCursor, Page, PageRequest, RangeStore, ResolvedRequest};
use crate::TRACING_TARGET_PAGINATION;

/// Errors returned by [`paginate`].
#[derive(Debug, thiserror::Error)]
pub enum PageError<E> {
    /// A boundary token was not a valid cursor.
    #[error("invalid cursor: {0}")]
    InvalidCursor(#[from] CursorError),

    /// The page arguments contradict each other.
    #[error("invalid page arguments: {0}")]
    InvalidArguments(&'static str),

    /// The range read failed.
    #[error("range read failed")]
    Store(#[source] E),
}

impl<E> PageError<E> {
    /// Returns whether the error was caused by the caller's arguments.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidCursor(_) | Self::InvalidArguments(_))
    }
}

/// Reads one page from `store`.
///
/// # Errors
///
/// Returns [`PageError::InvalidArguments`] or [`PageError::InvalidCursor`]
/// before touching the store, and [`PageError::Store`] with the store's own
/// error when the read fails. No partial page is ever returned.
pub async fn paginate<T, S>(
    store: &mut S,
    request: &PageRequest,
) -> Result<Page<T>, PageError<S::Error>>
where
    T: HasCursor,
    S: RangeStore<T> + ?Sized,
{
    let resolved = request.resolve()?;
    let query = resolved.range_query();

    tracing::trace!(
        target: TRACING_TARGET_PAGINATION,
        direction = ?resolved.direction,
        limit = resolved.limit,
        has_boundary = resolved.boundary.is_some(),
        "Reading page"
    );

    let records = store.range_query(&query).await.map_err(PageError::Store)?;
    let fetched = records.len();
    let page = trim(records, &resolved);

    tracing::debug!(
        target: TRACING_TARGET_PAGINATION,
        direction = ?resolved.direction,
        fetched,
        returned = page.len(),
        has_next = page.has_next,
        has_prev = page.has_prev,
        "Page read"
    );

    Ok(page)
}

/// Turns an over-fetched range read into a page.
fn trim<T: HasCursor>(mut records: Vec<T>, resolved: &ResolvedRequest) -> Page<T> {
    let behind = resolved
        .boundary
        .is_some_and(|boundary| records.first().is_some_and(|r| r.cursor() == boundary));
    if behind {
        records.remove(0);
    }

    let limit = usize::try_from(resolved.limit).unwrap_or(usize::MAX);
    let ahead = records.len() > limit;
    records.truncate(limit);

    if records.is_empty() {
        return Page::empty();
    }

    let (has_prev, has_next) = match resolved.direction {
        Direction::Forward => (behind, ahead),
        Direction::Backward => {
            records.reverse();
            (ahead, behind)
        }
    };

    Page {
        start_cursor: records.first().map(HasCursor::cursor),
        end_cursor: records.last().map(HasCursor::cursor),
        records,
        has_next,
        has_prev,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use jiff::Timestamp;
    use uuid::Uuid;

    use super::*;
    use crate::types::{Cursor, MemoryStore, RangeQuery, RangeRecord};

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: Uuid,
        story_id: Uuid,
        created_at: Timestamp,
        label: &'static str,
    }

    impl HasCursor for Note {
        fn cursor(&self) -> Cursor {
            Cursor::new(self.created_at, self.id)
        }
    }

    impl RangeRecord for Note {
        fn story_id(&self) -> Uuid {
            self.story_id
        }
    }

    fn story() -> Uuid {
        Uuid::from_u128(0xA)
    }

    fn note(label: &'static str, second: i64, id: u128) -> Note {
        Note {
            id: Uuid::from_u128(id),
            story_id: story(),
            created_at: Timestamp::from_second(second).unwrap(),
            label,
        }
    }

    /// Records `a..e` at `t1 < .. < t5`.
    fn scenario() -> MemoryStore<Note> {
        MemoryStore::new([
            note("c", 3, 3),
            note("a", 1, 1),
            note("e", 5, 5),
            note("b", 2, 2),
            note("d", 4, 4),
        ])
    }

    fn labels(page: &Page<Note>) -> Vec<&'static str> {
        page.records.iter().map(|n| n.label).collect()
    }

    fn token(label: &'static str, second: i64, id: u128) -> String {
        note(label, second, id).cursor().encode()
    }

    async fn read(store: &mut MemoryStore<Note>, request: PageRequest) -> Page<Note> {
        paginate(store, &request).await.expect("page should be read")
    }

    #[tokio::test]
    async fn first_page_of_scenario() {
        let mut store = scenario();
        let page = read(&mut store, PageRequest::first(2)).await;

        assert_eq!(labels(&page), ["a", "b"]);
        assert!(page.has_next);
        assert!(!page.has_prev);
        assert_eq!(page.start_cursor, Some(note("a", 1, 1).cursor()));
        assert_eq!(page.end_cursor, Some(note("b", 2, 2).cursor()));
    }

    #[tokio::test]
    async fn middle_page_of_scenario() {
        let mut store = scenario();
        let page = read(&mut store, PageRequest::first(2).after(token("b", 2, 2))).await;

        assert_eq!(labels(&page), ["c", "d"]);
        assert!(page.has_next);
        assert!(page.has_prev);
    }

    #[tokio::test]
    async fn last_page_of_scenario() {
        let mut store = scenario();
        let page = read(&mut store, PageRequest::first(2).after(token("d", 4, 4))).await;

        assert_eq!(labels(&page), ["e"]);
        assert!(!page.has_next);
        assert!(page.has_prev);
        assert_eq!(page.start_cursor, page.end_cursor);
    }

    #[tokio::test]
    async fn after_final_record_is_empty() {
        let mut store = scenario();
        let page = read(&mut store, PageRequest::first(2).after(token("e", 5, 5))).await;

        assert!(page.is_empty());
        assert!(!page.has_next);
        assert!(!page.has_prev);
        assert_eq!(page.start_cursor, None);
    }

    #[tokio::test]
    async fn backward_page_is_ascending() {
        let mut store = scenario();
        let page = read(&mut store, PageRequest::last(2).before(token("d", 4, 4))).await;

        assert_eq!(labels(&page), ["b", "c"]);
        assert!(page.has_prev);
        assert!(page.has_next);
        assert_eq!(page.start_cursor, Some(note("b", 2, 2).cursor()));
        assert_eq!(page.end_cursor, Some(note("c", 3, 3).cursor()));
    }

    #[tokio::test]
    async fn backward_without_cursor_reads_tail() {
        let mut store = scenario();
        let page = read(&mut store, PageRequest::last(2)).await;

        assert_eq!(labels(&page), ["d", "e"]);
        assert!(page.has_prev);
        assert!(!page.has_next);
    }

    #[tokio::test]
    async fn backward_reaches_the_head() {
        let mut store = scenario();
        let page = read(&mut store, PageRequest::last(2).before(token("c", 3, 3))).await;

        assert_eq!(labels(&page), ["a", "b"]);
        assert!(!page.has_prev);
        assert!(page.has_next);
    }

    #[tokio::test]
    async fn exact_fit_sets_no_flags() {
        let mut store = scenario();
        let page = read(&mut store, PageRequest::first(5)).await;
        assert_eq!(page.len(), 5);
        assert!(!page.has_next);
        assert!(!page.has_prev);

        let page = read(&mut store, PageRequest::last(5)).await;
        assert_eq!(labels(&page), ["a", "b", "c", "d", "e"]);
        assert!(!page.has_next);
        assert!(!page.has_prev);
    }

    #[tokio::test]
    async fn empty_store_gives_empty_page() {
        let mut store = MemoryStore::<Note>::new([]);
        for request in [PageRequest::first(3), PageRequest::last(3), PageRequest::default()] {
            assert_eq!(read(&mut store, request).await, Page::empty());
        }
    }

    #[tokio::test]
    async fn page_never_exceeds_limit() {
        let mut store = MemoryStore::new((0..40).map(|i| note("n", i, i as u128)));
        for n in 1..=12 {
            assert!(read(&mut store, PageRequest::first(n)).await.len() <= n as usize);
            assert!(read(&mut store, PageRequest::last(n)).await.len() <= n as usize);
        }
    }

    #[tokio::test]
    async fn forward_walk_visits_every_record_once() {
        // Pairs of records share a timestamp and differ only by id.
        let mut store = MemoryStore::new((0..23).map(|i| note("n", i / 2, 100 - i as u128)));

        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut request = PageRequest::first(5);
        loop {
            let page = read(&mut store, request.clone()).await;
            for record in &page.records {
                assert!(seen.insert(record.id), "record returned twice");
                order.push(record.cursor());
            }
            if !page.has_next {
                break;
            }
            let end = page.end_cursor.expect("non-empty page has an end cursor");
            request = PageRequest::first(5).after(end.encode());
        }

        assert_eq!(seen.len(), 23);
        assert!(order.is_sorted());
    }

    #[tokio::test]
    async fn backward_walk_visits_every_record_once() {
        let mut store = MemoryStore::new((0..17).map(|i| note("n", i / 3, i as u128)));

        let mut seen = HashSet::new();
        let mut pages = 0;
        let mut request = PageRequest::last(4);
        loop {
            let page = read(&mut store, request.clone()).await;
            pages += 1;
            for record in &page.records {
                assert!(seen.insert(record.id), "record returned twice");
            }
            if !page.has_prev {
                break;
            }
            let start = page.start_cursor.expect("non-empty page has a start cursor");
            request = PageRequest::last(4).before(start.encode());
        }

        assert_eq!(seen.len(), 17);
        assert_eq!(pages, 5);
    }

    #[tokio::test]
    async fn reversing_direction_returns_to_adjacent_records() {
        let mut store = scenario();
        let middle = read(&mut store, PageRequest::first(2).after(token("b", 2, 2))).await;
        assert_eq!(labels(&middle), ["c", "d"]);

        let start = middle.start_cursor.unwrap().encode();
        let behind = read(&mut store, PageRequest::last(2).before(start)).await;
        assert_eq!(labels(&behind), ["a", "b"]);
        assert!(behind.has_next);

        let end = behind.end_cursor.unwrap().encode();
        let again = read(&mut store, PageRequest::first(2).after(end)).await;
        assert_eq!(again, middle);
    }

    #[tokio::test]
    async fn small_pages_from_every_boundary() {
        // Triples share a timestamp, and ids run against insertion order.
        let records: Vec<Note> = (0..8).map(|i| note("n", i / 3, 50 - i as u128)).collect();
        let mut sorted: Vec<Cursor> = records.iter().map(HasCursor::cursor).collect();
        sorted.sort();
        let mut store = MemoryStore::new(records);

        for n in [1_usize, 2] {
            for (i, boundary) in sorted.iter().enumerate() {
                let limit = n as i64;

                let forward = PageRequest::first(limit).after(boundary.encode());
                let page = read(&mut store, forward).await;
                let expected = &sorted[i + 1..(i + 1 + n).min(sorted.len())];
                let cursors: Vec<Cursor> = page.records.iter().map(HasCursor::cursor).collect();
                assert_eq!(cursors, expected, "first {n} after #{i}");
                if expected.is_empty() {
                    assert!(!page.has_prev && !page.has_next, "first {n} after #{i}");
                } else {
                    assert!(page.has_prev, "first {n} after #{i}");
                    assert_eq!(page.has_next, i + 1 + n < sorted.len(), "first {n} after #{i}");
                }

                let backward = PageRequest::last(limit).before(boundary.encode());
                let page = read(&mut store, backward).await;
                let expected = &sorted[i.saturating_sub(n)..i];
                let cursors: Vec<Cursor> = page.records.iter().map(HasCursor::cursor).collect();
                assert_eq!(cursors, expected, "last {n} before #{i}");
                if expected.is_empty() {
                    assert!(!page.has_prev && !page.has_next, "last {n} before #{i}");
                } else {
                    assert!(page.has_next, "last {n} before #{i}");
                    assert_eq!(page.has_prev, i > n, "last {n} before #{i}");
                }
            }
        }
    }

    #[tokio::test]
    async fn stale_boundary_under_reports_previous_page() {
        let mut store = scenario();
        assert_eq!(store.remove(&note("b", 2, 2)), 1);

        let page = read(&mut store, PageRequest::first(2).after(token("b", 2, 2))).await;
        assert_eq!(labels(&page), ["c", "d"]);
        assert!(page.has_next);
        assert!(!page.has_prev);
    }

    #[tokio::test]
    async fn filters_restrict_the_range() {
        let mut store = scenario();
        let mut other = note("x", 3, 99);
        other.story_id = Uuid::from_u128(0xB);
        store.insert(other);

        let page = read(&mut store, PageRequest::first(10).with_story_id(story())).await;
        assert_eq!(labels(&page), ["a", "b", "c", "d", "e"]);

        let ids = [Uuid::from_u128(2), Uuid::from_u128(99), Uuid::from_u128(5)];
        let page = read(&mut store, PageRequest::first(2).with_ids(ids)).await;
        assert_eq!(labels(&page), ["b", "x"]);
        assert!(page.has_next);
    }

    #[tokio::test]
    async fn one_read_per_page() {
        let mut store = scenario();
        read(&mut store, PageRequest::first(2)).await;
        read(&mut store, PageRequest::last(2).before(token("e", 5, 5))).await;
        assert_eq!(store.query_count(), 2);
    }

    #[tokio::test]
    async fn invalid_arguments_skip_the_store() {
        let mut store = scenario();

        let err = paginate(&mut store, &PageRequest::first(2).after("%%%"))
            .await
            .unwrap_err();
        assert!(matches!(err, PageError::InvalidCursor(_)));
        assert!(err.is_invalid_input());

        let err = paginate(&mut store, &PageRequest::last(2).after(token("a", 1, 1)))
            .await
            .unwrap_err();
        assert!(matches!(err, PageError::InvalidArguments(_)));

        assert_eq!(store.query_count(), 0);
    }

    #[derive(Debug, PartialEq)]
    struct Unavailable;

    struct FailingStore;

    impl RangeStore<Note> for FailingStore {
        type Error = Unavailable;

        async fn range_query(&mut self, _query: &RangeQuery) -> Result<Vec<Note>, Self::Error> {
            Err(Unavailable)
        }
    }

    #[tokio::test]
    async fn store_errors_propagate_unchanged() {
        let err = paginate(&mut FailingStore, &PageRequest::first(2))
            .await
            .unwrap_err();
        assert!(matches!(err, PageError::Store(Unavailable)));
        assert!(!err.is_invalid_input());
    }
}
