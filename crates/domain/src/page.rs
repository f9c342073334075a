use serde::{Deserialize, Serialize};

/// Number of items per page when the caller does not choose one.
pub const DEFAULT_LIMIT: u32 = 10;

/// Largest page size a caller may request.
pub const MAX_LIMIT: u32 = 20;

/// A window into a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    /// Creates a page with the given limit and offset, as-is.
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }

    /// Builds a page from raw query values.
    ///
    /// Out-of-range values are replaced rather than rejected: a limit
    /// outside `1..=MAX_LIMIT` becomes [`DEFAULT_LIMIT`] and a negative
    /// offset becomes zero. `None` means the caller sent nothing usable.
    pub fn clamped(limit: Option<i64>, offset: Option<i64>) -> Self {
        let limit = match limit {
            Some(l) if l > 0 && l <= MAX_LIMIT as i64 => l as u32,
            _ => DEFAULT_LIMIT,
        };
        let offset = match offset {
            Some(o) if o >= 0 => o.min(u32::MAX as i64) as u32,
            _ => 0,
        };
        Self { limit, offset }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_passes_values_in_range() {
        let page = Page::clamped(Some(15), Some(30));
        assert_eq!(page.limit, 15);
        assert_eq!(page.offset, 30);
    }

    #[test]
    fn test_clamped_defaults_when_missing() {
        let page = Page::clamped(None, None);
        assert_eq!(page.limit, DEFAULT_LIMIT);
        assert_eq!(page.offset, 0);
    }

    #[test]
    fn test_clamped_replaces_out_of_range_limit() {
        assert_eq!(Page::clamped(Some(0), None).limit, DEFAULT_LIMIT);
        assert_eq!(Page::clamped(Some(-3), None).limit, DEFAULT_LIMIT);
        assert_eq!(Page::clamped(Some(100), None).limit, DEFAULT_LIMIT);
        assert_eq!(Page::clamped(Some(MAX_LIMIT as i64), None).limit, MAX_LIMIT);
    }

    #[test]
    fn test_clamped_replaces_negative_offset() {
        assert_eq!(Page::clamped(None, Some(-1)).offset, 0);
        assert_eq!(Page::clamped(None, Some(0)).offset, 0);
    }
}
