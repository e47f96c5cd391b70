//! # Pipeline Composer
//!
//! Assembles stages in a fixed order:
//!
//! 1. search (if text given)
//! 2. match (if any filters given)
//! 3. sort (if a sort spec given)
//! 4. page-and-count fan-out (always, always last)
//!
//! The order is a contract, not a planning decision. It never changes
//! based on which pieces are present or how selective they are.

use super::search::SearchClause;
use super::stage::{PageWindow, Pipeline, SortSpec, Stage};
use crate::filter::{CompileResult, FilterCompiler, FilterDescriptor};

/// Default zero-based page
pub const DEFAULT_PAGE: u64 = 0;

/// Default page size
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Zero-based page and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page,
            page_size: if page_size == 0 {
                DEFAULT_PAGE_SIZE
            } else {
                page_size
            },
        }
    }

    /// Parse raw parameters, falling back to defaults instead of failing.
    ///
    /// Only the leading digits count, so `"2abc"` is page 2 and `"1.5"` is 1.
    /// A zero page size also falls back, since the store rejects a zero limit.
    pub fn parse(page: Option<&str>, page_size: Option<&str>) -> Self {
        let page = page.and_then(leading_u64).unwrap_or(DEFAULT_PAGE);
        let page_size = page_size
            .and_then(leading_u64)
            .filter(|p| *p > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE);

        Self { page, page_size }
    }

    /// `skip = page * pageSize`, `limit = pageSize`, both capped to the
    /// store's signed 64-bit range
    pub fn window(&self) -> PageWindow {
        const MAX: u64 = i64::MAX as u64;
        PageWindow {
            skip: self.page.saturating_mul(self.page_size).min(MAX),
            limit: self.page_size.min(MAX),
        }
    }
}

/// Everything a caller can ask of one query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryRequest {
    pub search: Option<String>,
    pub filters: Vec<FilterDescriptor>,
    pub sort: Option<SortSpec>,
    pub pagination: Pagination,
}

impl QueryRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn filter(mut self, descriptor: FilterDescriptor) -> Self {
        self.filters.push(descriptor);
        self
    }

    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn page(mut self, page: u64, page_size: u64) -> Self {
        self.pagination = Pagination::new(page, page_size);
        self
    }
}

/// Raw query-string parameters, before defaults are applied
#[derive(Debug, Clone, Default)]
pub struct RawQueryParams {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl RawQueryParams {
    /// Collect from decoded query-string pairs.
    ///
    /// The first occurrence of a repeated key wins; unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "search" => &mut params.search,
                "sort" => &mut params.sort,
                "page" => &mut params.page,
                "pageSize" => &mut params.page_size,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        params
    }

    /// Combine with the filter body into a request
    pub fn into_request(self, filters: Vec<FilterDescriptor>) -> QueryRequest {
        QueryRequest {
            search: self.search.filter(|s| !s.trim().is_empty()),
            filters,
            sort: self.sort.as_deref().and_then(SortSpec::parse),
            pagination: Pagination::parse(self.page.as_deref(), self.page_size.as_deref()),
        }
    }
}

/// Leading decimal digits of a value, after trimming and an optional `+`
fn leading_u64(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}

/// Orders stages into a pipeline
pub struct PipelineComposer;

impl PipelineComposer {
    /// Compose the pipeline for a request.
    ///
    /// Filter compilation happens here, so any `InvalidOperator` or
    /// `InvalidValue` is returned before a pipeline exists.
    pub fn compose(request: &QueryRequest) -> CompileResult<Pipeline> {
        let mut stages = Vec::with_capacity(4);

        if let Some(search) = SearchClause::build(request.search.as_deref()) {
            stages.push(search);
        }

        if let Some(matcher) = FilterCompiler::compile(&request.filters)? {
            stages.push(matcher);
        }

        if let Some(sort) = &request.sort {
            stages.push(Stage::Sort(sort.clone()));
        }

        stages.push(Stage::PageAndCount(request.pagination.window()));

        Ok(Pipeline::from_stages(stages))
    }
}
