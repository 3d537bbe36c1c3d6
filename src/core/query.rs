//! Request and response DTOs for pagination, filtering, and sorting

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// Maximum page size accepted from clients
pub const MAX_PAGE_SIZE: u64 = 100;

/// Pagination parameters supplied by clients
///
/// Both fields default when absent and are clamped through the accessor
/// methods, so handlers can consume malformed input without branching.
///
/// # Example
/// ```rust,ignore
/// GET /users?page=2&pageSize=10
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct Pagination {
    /// Page number (starts at 1)
    #[validate(range(min = 1))]
    pub page: u64,

    /// Number of items per page
    #[validate(range(min = 1))]
    pub page_size: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
        }
    }
}

impl Pagination {
    /// Get page number, ensuring minimum of 1
    pub fn page(&self) -> u64 {
        self.page.max(1)
    }

    /// Get page size, clamped to `1..=MAX_PAGE_SIZE`
    pub fn page_size(&self) -> u64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// Number of items to skip for this page
    pub fn offset(&self) -> u64 {
        (self.page() - 1) * self.page_size()
    }
}

/// Client-supplied filter payload
///
/// `filters` maps dotted field names to either a scalar/array value
/// (implicit equality) or an operator map like `{"gte": 18, "lt": 65}`.
/// `search` is a free-text term matched across all searchable fields.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FilterPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<IndexMap<String, Value>>,
}

impl FilterPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: Value) -> Self {
        self.filters
            .get_or_insert_with(IndexMap::new)
            .insert(key.into(), value);
        self
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

/// A single sort instruction
///
/// The field name is validated against the sortable capability tree by the
/// caller; this type only carries the request shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortItem {
    pub field: String,
    pub order: SortOrder,
}

impl SortItem {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    /// Parse the `field:asc` / `field:desc` query-string form
    ///
    /// A missing or unrecognized direction means ascending. Returns `None`
    /// for an empty field name.
    pub fn parse(raw: &str) -> Option<Self> {
        let (field, order) = match raw.split_once(':') {
            Some((field, dir)) if dir.eq_ignore_ascii_case("desc") => (field, SortOrder::Desc),
            Some((field, _)) => (field, SortOrder::Asc),
            None => (raw, SortOrder::Asc),
        };
        if field.is_empty() {
            return None;
        }
        Some(Self::new(field, order))
    }
}

/// Alternate single-filter shape used by some callers
///
/// Unlike [`FilterPayload`], the operator here is wired in by the caller, so
/// an unknown name is a programmer error
/// ([`SiftError::UnsupportedOperator`](crate::core::error::SiftError)), not
/// bad client input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterItem {
    pub field: String,
    pub operator: String,
    pub value: Value,
}

impl FilterItem {
    pub fn new(field: impl Into<String>, operator: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value,
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize)]
pub struct Page<T> {
    /// The page of items
    pub items: Vec<T>,

    /// Pagination metadata
    pub meta: PageMeta,
}

impl<T> Page<T> {
    /// Build a page from the request pagination and the filtered total
    pub fn new(items: Vec<T>, pagination: &Pagination, total: u64) -> Self {
        Self {
            meta: PageMeta::new(pagination.page(), pagination.page_size(), total),
            items,
        }
    }
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Current page number (starts at 1)
    pub page: u64,

    /// Number of items per page
    pub page_size: u64,

    /// Total number of items (after filters)
    pub total: u64,

    /// Total number of pages
    pub total_pages: u64,

    /// Whether there is a next page
    pub has_next: bool,

    /// Whether there is a previous page
    pub has_prev: bool,
}

impl PageMeta {
    pub fn new(page: u64, page_size: u64, total: u64) -> Self {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let total_pages = if total == 0 {
            0
        } else {
            total.div_ceil(page_size)
        };
        let start = (page - 1) * page_size;

        Self {
            page,
            page_size,
            total,
            total_pages,
            has_next: start + page_size < total,
            has_prev: page > 1,
        }
    }
}
