//! Listing filter, rows and pagination

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Column the listing is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Title,
    ContentType,
    #[default]
    Date,
}

impl SortField {
    /// SQL column for this field
    pub fn column(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::ContentType => "content_type",
            Self::Date => "created_at",
        }
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Title => write!(f, "title"),
            Self::ContentType => write!(f, "post_type"),
            Self::Date => write!(f, "date"),
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "post_type" | "content_type" | "type" => Ok(Self::ContentType),
            "date" | "created_at" => Ok(Self::Date),
            _ => Err(anyhow::anyhow!("Invalid sort field: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    pub fn reversed(&self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(anyhow::anyhow!("Invalid sort direction: {}", s)),
        }
    }
}

/// Which content types a listing covers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContentTypeFilter {
    /// Every known, non-excluded type
    #[default]
    All,
    /// Only these keys (still subject to exclusion)
    Only(BTreeSet<String>),
}

impl ContentTypeFilter {
    pub fn only<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Only(keys.into_iter().map(Into::into).collect())
    }

    /// Parse a request value: empty or `all` means [`ContentTypeFilter::All`]
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some("all") => Self::All,
            Some(key) => Self::only([key]),
        }
    }
}

/// Criteria for one listing request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilter {
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    pub content_types: ContentTypeFilter,
    /// Restrict to a single shortcode tag
    pub tag: Option<String>,
}

/// One row of the listing table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingRow {
    pub id: i64,
    pub title: String,
    pub content_type: String,
    pub content_type_label: String,
    /// Verbatim occurrence texts, in order of appearance
    pub shortcodes: Vec<String>,
}

/// Largest accepted page size
pub const MAX_PER_PAGE: u32 = 100;

/// Pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 25,
        }
    }
}

impl ListParams {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// Offset for database queries
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }
}

/// Paginated result container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
        }
    }

    pub fn empty(params: &ListParams) -> Self {
        Self::new(Vec::new(), 0, params)
    }

    pub fn total_pages(&self) -> u32 {
        if self.per_page == 0 || self.total <= 0 {
            return 0;
        }
        let per_page = i64::from(self.per_page);
        u32::try_from((self.total + per_page - 1) / per_page).unwrap_or(u32::MAX)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_clamping() {
        let params = ListParams::new(0, 0);
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 1);

        let params = ListParams::new(3, 500);
        assert_eq!(params.per_page, MAX_PER_PAGE);
        assert_eq!(params.offset(), 200);
    }

    #[test]
    fn test_total_pages() {
        let params = ListParams::new(1, 25);
        assert_eq!(PagedResult::<()>::new(vec![], 0, &params).total_pages(), 0);
        assert_eq!(PagedResult::<()>::new(vec![], 25, &params).total_pages(), 1);
        assert_eq!(PagedResult::<()>::new(vec![], 26, &params).total_pages(), 2);
    }

    #[test]
    fn test_sort_field_parsing() {
        assert_eq!("title".parse::<SortField>().unwrap(), SortField::Title);
        assert_eq!("post_type".parse::<SortField>().unwrap(), SortField::ContentType);
        assert!("ASC".parse::<SortField>().is_err());
        assert_eq!("DESC".parse::<SortDirection>().unwrap(), SortDirection::Desc);
    }

    #[test]
    fn test_content_type_filter_from_param() {
        assert_eq!(ContentTypeFilter::from_param(None), ContentTypeFilter::All);
        assert_eq!(ContentTypeFilter::from_param(Some("")), ContentTypeFilter::All);
        assert_eq!(
            ContentTypeFilter::from_param(Some("page")),
            ContentTypeFilter::only(["page"])
        );
    }
}
