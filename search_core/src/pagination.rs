//! Pagination strategies
//!
//! Clients express paging either as "which page of what size" or as "how many
//! rows starting where". Both are normalized into a [`PagingSpec`] before any
//! dialect-specific SQL is generated. Out-of-range input is clamped, never
//! rejected.

use config::{PaginationConfig, PAGINATION_TYPE_OFFSET, PAGINATION_TYPE_PAGE};

use crate::errors::SearchError;
use crate::param::SearchParams;

/// Normalized paging window: `offset >= 0`, `1 <= limit <= max allowed size`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingSpec {
    offset: i64,
    limit: i64,
}

impl PagingSpec {
    /// Window of `limit` rows starting at `offset`, clamped to the invariants
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset: offset.max(0),
            limit: limit.max(1),
        }
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Exclusive upper row bound, used by row-number based dialects
    pub fn end(&self) -> i64 {
        self.offset.saturating_add(self.limit)
    }
}

/// Page-number pagination: `offset = (page - start) * size`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageNumPagination {
    pub page_param: String,
    pub size_param: String,
    pub start_page: i64,
    pub default_size: i64,
    pub max_allowed_size: i64,
}

/// Max-offset pagination: the offset is taken as given
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaxOffsetPagination {
    pub offset_param: String,
    pub max_param: String,
    pub start_offset: i64,
    pub default_size: i64,
    pub max_allowed_size: i64,
}

/// Configured paging strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pagination {
    PageNum(PageNumPagination),
    MaxOffset(MaxOffsetPagination),
}

impl Pagination {
    /// Build the strategy named by `config.pagination_type`
    pub fn from_config(config: &PaginationConfig) -> Result<Self, SearchError> {
        let start = config.effective_start();
        let max_allowed_size = config.max_allowed_size.max(1);
        let default_size = config.default_size.clamp(1, max_allowed_size);

        match config.pagination_type.trim().to_ascii_lowercase().as_str() {
            PAGINATION_TYPE_PAGE => Ok(Pagination::PageNum(PageNumPagination {
                page_param: config.page.clone(),
                size_param: config.size.clone(),
                start_page: start,
                default_size,
                max_allowed_size,
            })),
            PAGINATION_TYPE_OFFSET => Ok(Pagination::MaxOffset(MaxOffsetPagination {
                offset_param: config.offset.clone(),
                max_param: config.max.clone(),
                start_offset: start,
                default_size,
                max_allowed_size,
            })),
            other => Err(SearchError::Config(format!(
                "pagination type must be '{}' or '{}', got '{}'",
                PAGINATION_TYPE_PAGE, PAGINATION_TYPE_OFFSET, other
            ))),
        }
    }

    /// Names of the two request parameters this strategy consumes
    pub fn param_names(&self) -> [&str; 2] {
        match self {
            Pagination::PageNum(p) => [p.page_param.as_str(), p.size_param.as_str()],
            Pagination::MaxOffset(p) => [p.offset_param.as_str(), p.max_param.as_str()],
        }
    }

    pub fn is_paging_param(&self, key: &str) -> bool {
        self.param_names().contains(&key)
    }

    pub fn max_allowed_size(&self) -> i64 {
        match self {
            Pagination::PageNum(p) => p.max_allowed_size,
            Pagination::MaxOffset(p) => p.max_allowed_size,
        }
    }

    /// Read the paging parameters out of `params`
    pub fn paginate(&self, params: &SearchParams) -> PagingSpec {
        match self {
            Pagination::PageNum(p) => {
                let size = read_int(params, &p.size_param)
                    .unwrap_or(p.default_size)
                    .clamp(1, p.max_allowed_size);
                let page = read_int(params, &p.page_param)
                    .unwrap_or(p.start_page)
                    .max(p.start_page);
                PagingSpec::new(page.saturating_sub(p.start_page).saturating_mul(size), size)
            }
            Pagination::MaxOffset(p) => {
                let size = read_int(params, &p.max_param)
                    .unwrap_or(p.default_size)
                    .clamp(1, p.max_allowed_size);
                let offset = read_int(params, &p.offset_param)
                    .unwrap_or(p.start_offset)
                    .max(p.start_offset);
                PagingSpec::new(offset, size)
            }
        }
    }
}

fn read_int(params: &SearchParams, key: &str) -> Option<i64> {
    params.first(key).and_then(|v| v.trim().parse::<i64>().ok())
}
