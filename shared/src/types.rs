//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Default number of ledger entries per page
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Largest page a client may request; bigger limits are clamped
pub const MAX_PAGE_SIZE: u32 = 200;

/// Cursor pagination parameters for the movement ledger
///
/// Pages are ordered newest first by id; `cursor` is the id of the last
/// entry the client has seen and the next page starts strictly below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub limit: u32,
    pub cursor: Option<i64>,
}

impl PageRequest {
    /// Build a request, clamping the limit into `1..=MAX_PAGE_SIZE`
    pub fn new(limit: Option<u32>, cursor: Option<i64>) -> Self {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        Self { limit, cursor }
    }

    /// Number of rows to fetch to know whether another page exists
    pub fn fetch_limit(&self) -> i64 {
        i64::from(self.limit) + 1
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of a cursor-paginated listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CursorPage<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<i64>,
}

impl<T> CursorPage<T> {
    /// Build a page from up to `limit + 1` fetched rows
    ///
    /// The extra row only signals that more data exists; it is dropped and
    /// the cursor points at the last returned item.
    pub fn from_overfetch(mut rows: Vec<T>, page: PageRequest, id_of: impl Fn(&T) -> i64) -> Self {
        let limit = page.limit as usize;
        let has_more = rows.len() > limit;
        rows.truncate(limit);
        let next_cursor = if has_more { rows.last().map(id_of) } else { None };
        Self {
            items: rows,
            next_cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults() {
        let page = PageRequest::default();
        assert_eq!(page.limit, 50);
        assert_eq!(page.cursor, None);
    }

    #[test]
    fn test_page_request_clamps_limit() {
        assert_eq!(PageRequest::new(Some(1000), None).limit, 200);
        assert_eq!(PageRequest::new(Some(0), None).limit, 1);
        assert_eq!(PageRequest::new(Some(20), Some(9)).fetch_limit(), 21);
    }

    #[test]
    fn test_cursor_page_from_overfetch() {
        let page = PageRequest::new(Some(2), None);
        let full = CursorPage::from_overfetch(vec![5_i64, 4, 3], page, |id| *id);
        assert_eq!(full.items, vec![5, 4]);
        assert_eq!(full.next_cursor, Some(4));

        let last = CursorPage::from_overfetch(vec![1_i64], page, |id| *id);
        assert_eq!(last.items, vec![1]);
        assert_eq!(last.next_cursor, None);
    }
}
