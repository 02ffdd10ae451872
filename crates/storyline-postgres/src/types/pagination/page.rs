use super::Cursor;

/// One page of a cursor-paginated listing.
///
/// Records are always in ascending `(timestamp, id)` order, whichever
/// direction the page was read in. The cursors are taken from the first and
/// last record and are absent for an empty page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// The records in this page.
    pub records: Vec<T>,
    /// Whether more records follow the last one.
    pub has_next: bool,
    /// Whether more records precede the first one.
    pub has_prev: bool,
    /// Position of the first record.
    pub start_cursor: Option<Cursor>,
    /// Position of the last record.
    pub end_cursor: Option<Cursor>,
}

impl<T> Page<T> {
    /// Creates an empty page with both flags cleared.
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            has_next: false,
            has_prev: false,
            start_cursor: None,
            end_cursor: None,
        }
    }

    /// Returns the number of records in this page.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether the page holds no records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Maps the records to a different type, keeping flags and cursors.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            records: self.records.into_iter().map(f).collect(),
            has_next: self.has_next,
            has_prev: self.has_prev,
            start_cursor: self.start_cursor,
            end_cursor: self.end_cursor,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}
