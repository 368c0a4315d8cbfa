// Paging arithmetic and lenient query-parameter coercion
use serde::Serialize;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_LIMIT: u64 = 50;
pub const DEFAULT_TOP_LIMIT: u64 = 10;
pub const DEFAULT_CRITICAL_THRESHOLD: u64 = 3;
pub const DEFAULT_AGGREGATED_LIMIT: u64 = 50;

/// Reads a positive integer out of a raw query value, falling back to `default`.
///
/// Only the leading sign and digits are considered, so `"12abc"` is 12 and
/// `"2.7"` is 2. Missing, unparsable, zero or negative input yields `default`;
/// a stray query string never turns into an error.
pub fn positive_or(raw: Option<&str>, default: u64) -> u64 {
    let Some(raw) = raw else {
        return default;
    };

    let trimmed = raw.trim();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    match digits[..end].parse::<u64>() {
        Ok(value) if value > 0 && !negative => value,
        _ => default,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: positive_or(page, DEFAULT_PAGE),
            limit: positive_or(limit, DEFAULT_PAGE_LIMIT),
        }
    }

    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: u64) -> Self {
        Self {
            page: request.page,
            limit: request.limit,
            total,
            pages: total.div_ceil(request.limit.max(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_or() {
        assert_eq!(positive_or(None, 50), 50);
        assert_eq!(positive_or(Some("20"), 50), 20);
        assert_eq!(positive_or(Some(" 7 "), 50), 7);
        assert_eq!(positive_or(Some("12abc"), 50), 12);
        assert_eq!(positive_or(Some("2.7"), 50), 2);
        assert_eq!(positive_or(Some("+4"), 50), 4);
        assert_eq!(positive_or(Some("abc"), 50), 50);
        assert_eq!(positive_or(Some(""), 50), 50);
        assert_eq!(positive_or(Some("0"), 50), 50);
        assert_eq!(positive_or(Some("-3"), 50), 50);
        assert_eq!(positive_or(Some("99999999999999999999999"), 50), 50);
    }

    #[test]
    fn test_page_request_skip() {
        let request = PageRequest::from_query(Some("3"), Some("20"));
        assert_eq!(request.skip(), 40);

        let fallback = PageRequest::from_query(Some("nope"), Some("-1"));
        assert_eq!(fallback, PageRequest::default());
        assert_eq!(fallback.skip(), 0);
    }

    #[test]
    fn test_pages_is_ceiling() {
        let request = PageRequest { page: 1, limit: 50 };
        assert_eq!(Pagination::new(request, 0).pages, 0);
        assert_eq!(Pagination::new(request, 1).pages, 1);
        assert_eq!(Pagination::new(request, 50).pages, 1);
        assert_eq!(Pagination::new(request, 51).pages, 2);
        assert_eq!(Pagination::new(request, 1450).pages, 29);
    }
}
