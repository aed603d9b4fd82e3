//! Page bounds and page metadata

use serde::Serialize;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 12;
pub const MAX_LIMIT: u64 = 24;

/// Validated page request. `page >= 1`, `1 <= limit <= MAX_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl PageRequest {
    /// Clamp arbitrary integers into bounds.
    ///
    /// A zero `page` or `limit` means "not given" and falls back to the
    /// default before clamping, so `limit=0` yields 12 while `limit=-3`
    /// yields 1.
    pub fn new(page: i64, limit: i64) -> Self {
        let page = if page == 0 { DEFAULT_PAGE as i64 } else { page };
        let limit = if limit == 0 { DEFAULT_LIMIT as i64 } else { limit };
        Self {
            page: page.max(1) as u64,
            limit: limit.clamp(1, MAX_LIMIT as i64) as u64,
        }
    }

    /// Build from raw query values. Missing or non-numeric values use the
    /// defaults; fractional values are floored.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        Self::new(
            page.and_then(parse_floored).unwrap_or(0),
            limit.and_then(parse_floored).unwrap_or(0),
        )
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

fn parse_floored(raw: &str) -> Option<i64> {
    let n = raw.trim().parse::<f64>().ok()?;
    if !n.is_finite() {
        return None;
    }
    // saturating float → int cast
    Some(n.floor() as i64)
}

/// Metadata returned alongside every paginated list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total_docs: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub page: u64,
    pub limit: u64,
}

impl PageMeta {
    pub fn new(request: PageRequest, total_docs: u64) -> Self {
        let total_pages = total_docs.div_ceil(request.limit);
        Self {
            total_docs,
            total_pages,
            has_next_page: request.page < total_pages,
            has_prev_page: request.page > 1,
            page: request.page,
            limit: request.limit,
        }
    }
}

/// One page of items plus its metadata.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_docs: u64) -> Self {
        Self {
            items,
            meta: PageMeta::new(request, total_docs),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}
