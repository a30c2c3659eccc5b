//! Paging and ordering for supplier listings.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_NUMBER: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 50;

/// Raw listing parameters as received on the query string.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    #[serde(default = "default_page_number")]
    pub page_number: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    #[serde(default)]
    pub search_term: Option<String>,
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default = "default_sort_order")]
    pub sort_order: String,
}

fn default_page_number() -> i64 {
    DEFAULT_PAGE_NUMBER
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

fn default_sort_by() -> String {
    "FechaCreacion".to_string()
}

fn default_sort_order() -> String {
    "desc".to_string()
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page_number: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
            search_term: None,
            sort_by: default_sort_by(),
            sort_order: default_sort_order(),
        }
    }
}

/// Sortable supplier columns. Anything else falls back to `UpdatedAt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    UpdatedAt,
    TradeName,
    LegalName,
}

impl SortField {
    pub fn parse(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "nombrecomercial" => SortField::TradeName,
            "razonsocial" => SortField::LegalName,
            _ => SortField::UpdatedAt,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortField::UpdatedAt => "updated_utc",
            SortField::TradeName => "trade_name",
            SortField::LegalName => "legal_name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Descending only when the caller asked for `desc` (any casing).
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Listing request after clamping and allow-listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page_number: i64,
    pub page_size: i64,
    pub search_term: Option<String>,
    pub sort_field: SortField,
    pub direction: SortDirection,
}

impl ListQuery {
    /// Saturates instead of overflowing; a far page is simply empty.
    pub fn offset(&self) -> i64 {
        (self.page_number - 1).saturating_mul(self.page_size)
    }
}

impl From<PaginationParams> for ListQuery {
    fn from(params: PaginationParams) -> Self {
        Self {
            page_number: params.page_number.max(1),
            page_size: params.page_size.clamp(1, MAX_PAGE_SIZE),
            search_term: params
                .search_term
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            sort_field: SortField::parse(&params.sort_by),
            direction: SortDirection::parse(&params.sort_order),
        }
    }
}

/// One page of results plus the totals needed to navigate the rest.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub page_number: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total_count: i64, page_number: i64, page_size: i64) -> Self {
        let total_pages = if page_size > 0 {
            (total_count + page_size - 1) / page_size
        } else {
            0
        };

        Self {
            items,
            total_count,
            page_number,
            page_size,
            total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedResult<U> {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page_number: self.page_number,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_sort_by_update_time_descending() {
        let query = ListQuery::from(PaginationParams::default());
        assert_eq!(query.page_number, 1);
        assert_eq!(query.page_size, 10);
        assert_eq!(query.sort_field, SortField::UpdatedAt);
        assert_eq!(query.direction, SortDirection::Desc);
    }

    #[test]
    fn test_page_size_is_capped() {
        let query = ListQuery::from(PaginationParams {
            page_size: 500,
            ..Default::default()
        });
        assert_eq!(query.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_offset_saturates_for_huge_page_numbers() {
        let query = ListQuery::from(PaginationParams {
            page_number: i64::MAX,
            page_size: 500,
            ..Default::default()
        });
        assert_eq!(query.offset(), i64::MAX);

        let query = ListQuery::from(PaginationParams {
            page_number: 3,
            page_size: 20,
            ..Default::default()
        });
        assert_eq!(query.offset(), 40);
    }

    #[test]
    fn test_non_positive_paging_is_clamped() {
        let query = ListQuery::from(PaginationParams {
            page_number: 0,
            page_size: -3,
            ..Default::default()
        });
        assert_eq!(query.page_number, 1);
        assert_eq!(query.page_size, 1);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn test_sort_field_allow_list() {
        assert_eq!(SortField::parse("NombreComercial"), SortField::TradeName);
        assert_eq!(SortField::parse("razonsocial"), SortField::LegalName);
        assert_eq!(SortField::parse("FechaActualizacion"), SortField::UpdatedAt);
        assert_eq!(SortField::parse("ruc; DROP TABLE suppliers"), SortField::UpdatedAt);
    }

    #[test]
    fn test_direction_is_ascending_unless_desc() {
        assert_eq!(SortDirection::parse("DESC"), SortDirection::Desc);
        assert_eq!(SortDirection::parse("asc"), SortDirection::Asc);
        assert_eq!(SortDirection::parse("sideways"), SortDirection::Asc);
    }

    #[test]
    fn test_blank_search_term_is_ignored() {
        let query = ListQuery::from(PaginationParams {
            search_term: Some("   ".to_string()),
            ..Default::default()
        });
        assert!(query.search_term.is_none());
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(PagedResult::new(vec![1, 2], 12, 2, 5).total_pages, 3);
        assert_eq!(PagedResult::new(vec![1], 10, 1, 10).total_pages, 1);

        let empty: PagedResult<i32> = PagedResult::new(vec![], 0, 1, 10);
        assert_eq!(empty.total_pages, 0);
    }
}
