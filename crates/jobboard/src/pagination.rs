use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 50;

/// Raw `?page=&limit=` query values. Unparseable numbers fall back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

impl PageQuery {
    pub fn request(&self) -> PageRequest {
        let parse = |raw: &Option<String>| raw.as_deref().and_then(|v| v.trim().parse::<i64>().ok());
        PageRequest::normalize(parse(&self.page), parse(&self.limit))
    }
}

/// A validated page window, always at least page 1 with a bounded size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    pub fn normalize(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = match page {
            Some(value) if value >= 1 => u32::try_from(value).unwrap_or(u32::MAX),
            _ => DEFAULT_PAGE,
        };
        let limit = match limit {
            Some(value) if value < 1 => DEFAULT_PAGE_SIZE,
            Some(value) if value > i64::from(MAX_PAGE_SIZE) => MAX_PAGE_SIZE,
            Some(value) => value as u32,
            None => DEFAULT_PAGE_SIZE,
        };
        Self { page, limit }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.limit as usize)
    }

    /// Slice an already ordered result set into this window.
    pub fn slice<T>(&self, items: Vec<T>) -> Page<T> {
        let total = items.len() as u64;
        let items = items
            .into_iter()
            .skip(self.offset())
            .take(self.limit as usize)
            .collect();
        Page { items, total }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::normalize(None, None)
    }
}

/// One window of results plus the size of the full result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Pagination block attached to list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total_items: u64,
    pub total_pages: u64,
}

impl PageMeta {
    pub fn new(request: PageRequest, total_items: u64) -> Self {
        let limit = u64::from(request.limit.max(1));
        Self {
            page: request.page,
            limit: request.limit,
            total_items,
            total_pages: total_items.div_ceil(limit),
        }
    }
}
