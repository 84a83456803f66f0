use serde::Serialize;

/// A normalized page request: `page` starts at 1, `per_page` is clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    pub const MAX_PER_PAGE: i64 = 500;

    pub fn new(page: Option<i64>, per_page: Option<i64>, default_per_page: i64) -> Self {
        let page = match page {
            Some(p) if p >= 1 => p,
            _ => 1,
        };
        let per_page = match per_page {
            Some(n) if n < 1 => default_per_page,
            Some(n) if n > Self::MAX_PER_PAGE => Self::MAX_PER_PAGE,
            Some(n) => n,
            None => default_per_page,
        };

        Self { page, per_page }
    }

    /// Saturates, so an absurd page number just reads past the last row.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PaginationMetadata {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMetadata {
    pub fn new(request: PageRequest, total: i64) -> Self {
        let pages = (total + request.per_page - 1) / request.per_page;
        Self {
            page: request.page,
            per_page: request.per_page,
            total,
            pages,
            has_next: request.page < pages,
            has_prev: request.page > 1,
        }
    }
}

/// List envelope shared by every paginated endpoint.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMetadata,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, request: PageRequest, total: i64) -> Self {
        Self {
            data,
            pagination: PaginationMetadata::new(request, total),
        }
    }
}

/// One bucket of a `GROUP BY` count.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GroupCount {
    pub key: Option<String>,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_normalizes_bad_input() {
        let req = PageRequest::new(Some(0), Some(-3), 50);
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, 50);
        assert_eq!(req.offset(), 0);

        let req = PageRequest::new(Some(3), Some(10_000), 20);
        assert_eq!(req.per_page, PageRequest::MAX_PER_PAGE);
        assert_eq!(req.offset(), 2 * PageRequest::MAX_PER_PAGE);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let req = PageRequest::new(Some(i64::MAX), Some(50), 50);
        assert_eq!(req.offset(), i64::MAX);

        let meta = PaginationMetadata::new(req, 3);
        assert!(!meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn test_pagination_metadata_flags() {
        let meta = PaginationMetadata::new(PageRequest::new(Some(2), Some(10), 20), 25);
        assert_eq!(meta.pages, 3);
        assert!(meta.has_next);
        assert!(meta.has_prev);

        let meta = PaginationMetadata::new(PageRequest::new(None, None, 20), 0);
        assert_eq!(meta.pages, 0);
        assert!(!meta.has_next);
        assert!(!meta.has_prev);
    }
}
