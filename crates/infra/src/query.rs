//! Shared query building blocks: pagination, sort direction, literal search.

use core::str::FromStr;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::stock_store::StoreError;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PaginationParams")]
pub struct Pagination {
    page: u32,
    page_size: u32,
}

/// Wire form of [`Pagination`]; decoded values pass through the same clamp as [`Pagination::new`].
#[derive(Deserialize)]
struct PaginationParams {
    page: Option<u32>,
    page_size: Option<u32>,
}

impl From<PaginationParams> for Pagination {
    fn from(params: PaginationParams) -> Self {
        Pagination::new(params.page, params.page_size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self::with_limits(page, page_size, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)
    }

    /// Page numbers below 1 become 1; sizes are clamped to `1..=max_page_size`.
    pub fn with_limits(page: Option<u32>, page_size: Option<u32>, default_page_size: u32, max_page_size: u32) -> Self {
        let max_page_size = max_page_size.max(1);
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.unwrap_or(default_page_size).clamp(1, max_page_size),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.page_size as usize)
    }

    /// `ceil(total / page_size)`.
    pub fn pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.page_size))
    }

    /// The slice of `items` this page covers.
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset())
            .take(self.page_size as usize)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn apply(self, ordering: core::cmp::Ordering) -> core::cmp::Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortDirection {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" | "1" => Ok(SortDirection::Asc),
            "desc" | "descending" | "-1" => Ok(SortDirection::Desc),
            other => Err(StoreError::InvalidQuery(format!("unknown sort direction '{other}'"))),
        }
    }
}

/// Case-insensitive literal text search.
///
/// User input is escaped before it becomes a pattern, so `a+b` matches the
/// three characters `a+b` and nothing else.
#[derive(Debug, Clone)]
pub struct SearchPattern(Regex);

impl SearchPattern {
    /// `None` for blank input (no search requested).
    pub fn new(input: &str) -> Result<Option<Self>, StoreError> {
        let needle = input.trim();
        if needle.is_empty() {
            return Ok(None);
        }
        let regex = RegexBuilder::new(&regex::escape(needle))
            .case_insensitive(true)
            .build()
            .map_err(|e| StoreError::InvalidQuery(format!("search: {e}")))?;
        Ok(Some(Self(regex)))
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.0.is_match(haystack)
    }

    /// True if any of the given fields matches.
    pub fn matches_any<'a>(&self, fields: impl IntoIterator<Item = Option<&'a str>>) -> bool {
        fields.into_iter().flatten().any(|f| self.is_match(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoded_pagination_is_clamped() {
        let p: Pagination = serde_json::from_str(r#"{"page":0,"page_size":0}"#).unwrap();
        assert_eq!(p.page(), 1);
        assert_eq!(p.page_size(), 1);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.pages(5), 5);

        let p: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(p, Pagination::default());
    }

    #[test]
    fn pagination_clamps_and_counts_pages() {
        let p = Pagination::new(Some(0), Some(10_000));
        assert_eq!(p.page(), 1);
        assert_eq!(p.page_size(), MAX_PAGE_SIZE);

        let p = Pagination::new(Some(3), Some(10));
        assert_eq!(p.offset(), 20);
        assert_eq!(p.pages(0), 0);
        assert_eq!(p.pages(21), 3);
        assert_eq!(p.pages(30), 3);
    }

    #[test]
    fn slice_past_the_end_is_empty() {
        let p = Pagination::new(Some(5), Some(2));
        assert!(p.slice(vec![1, 2, 3]).is_empty());
        assert_eq!(Pagination::new(Some(2), Some(2)).slice(vec![1, 2, 3]), vec![3]);
    }

    #[test]
    fn search_escapes_metacharacters() {
        let p = SearchPattern::new("a+b").unwrap().unwrap();
        assert!(p.is_match("Part A+B rev2"));
        assert!(!p.is_match("aab"));
        assert!(!p.is_match("ab"));

        let p = SearchPattern::new("(x").unwrap().unwrap();
        assert!(p.is_match("bracket (X"));
    }

    #[test]
    fn blank_search_is_no_search() {
        assert!(SearchPattern::new("   ").unwrap().is_none());
    }

    #[test]
    fn sort_direction_parses() {
        assert_eq!("ASC".parse::<SortDirection>().unwrap(), SortDirection::Asc);
        assert_eq!("-1".parse::<SortDirection>().unwrap(), SortDirection::Desc);
        assert!("sideways".parse::<SortDirection>().is_err());
    }
}
