//! Listing query parameters and their normalized form.

use serde::Deserialize;
use utoipa::IntoParams;

pub const DEFAULT_PAGE_NUMBER: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Raw listing parameters as they arrive on the query string.
///
/// Every field is kept as an unparsed string so that malformed values can
/// fall back to defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Page to return, starting at 1 (default 1)
    #[param(example = "1")]
    pub page_number: Option<String>,
    /// Records per page (default 10)
    #[param(example = "10")]
    pub page_size: Option<String>,
    /// Ordering as `field:asc` or `field:desc`
    #[param(example = "price:desc")]
    pub sort: Option<String>,
    /// Filter as `field:value`
    #[param(example = "name:shirt")]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub field: String,
    pub direction: Direction,
}

impl SortOrder {
    pub fn is_descending(&self) -> bool {
        self.direction == Direction::Descending
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    pub field: String,
    pub value: String,
}

/// Normalized listing query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub sort: Option<SortOrder>,
    pub search: Option<SearchTerm>,
    pub page_number: u64,
    pub page_size: u64,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            sort: None,
            search: None,
            page_number: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListQuery {
    /// Apply paging defaults and parse the sort and search specs.
    pub fn normalize(&self) -> Query {
        Query {
            sort: self.sort.as_deref().and_then(parse_sort),
            search: self.search.as_deref().and_then(parse_search),
            page_number: parse_positive(self.page_number.as_deref(), DEFAULT_PAGE_NUMBER),
            page_size: parse_positive(self.page_size.as_deref(), DEFAULT_PAGE_SIZE),
        }
    }
}

// Absent, non-numeric and zero values all collapse to the default.
fn parse_positive(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value >= 1)
        .unwrap_or(default)
}

/// Parse `field:asc|desc`. Anything else yields no ordering.
pub fn parse_sort(spec: &str) -> Option<SortOrder> {
    let (field, order) = spec.split_once(':')?;
    let field = field.trim();
    if field.is_empty() {
        return None;
    }

    let direction = match order.trim().to_ascii_lowercase().as_str() {
        "asc" => Direction::Ascending,
        "desc" => Direction::Descending,
        _ => return None,
    };

    Some(SortOrder {
        field: field.to_string(),
        direction,
    })
}

/// Parse `field:value`, splitting at the first colon so values such as
/// timestamps keep theirs.
pub fn parse_search(spec: &str) -> Option<SearchTerm> {
    let (field, value) = spec.split_once(':')?;
    let field = field.trim();
    if field.is_empty() || value.is_empty() {
        return None;
    }

    Some(SearchTerm {
        field: field.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(page_number: Option<&str>, page_size: Option<&str>) -> ListQuery {
        ListQuery {
            page_number: page_number.map(String::from),
            page_size: page_size.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_paging_defaults_when_absent() {
        let query = ListQuery::default().normalize();
        assert_eq!(query.page_number, 1);
        assert_eq!(query.page_size, 10);
        assert!(query.sort.is_none());
        assert!(query.search.is_none());
    }

    #[test]
    fn test_paging_defaults_when_malformed() {
        let query = raw(Some("abc"), Some("-4")).normalize();
        assert_eq!(query.page_number, 1);
        assert_eq!(query.page_size, 10);

        let query = raw(Some("0"), Some("")).normalize();
        assert_eq!(query.page_number, 1);
        assert_eq!(query.page_size, 10);
    }

    #[test]
    fn test_paging_parsed() {
        let query = raw(Some("3"), Some(" 25 ")).normalize();
        assert_eq!(query.page_number, 3);
        assert_eq!(query.page_size, 25);
    }

    #[test]
    fn test_parse_sort() {
        let order = parse_sort("price:desc").unwrap();
        assert_eq!(order.field, "price");
        assert!(order.is_descending());

        let order = parse_sort("name:ASC").unwrap();
        assert_eq!(order.direction, Direction::Ascending);
    }

    #[test]
    fn test_parse_sort_unrecognized() {
        assert!(parse_sort("bogus").is_none());
        assert!(parse_sort("price:sideways").is_none());
        assert!(parse_sort(":desc").is_none());
    }

    #[test]
    fn test_parse_search_keeps_colons_in_value() {
        let term = parse_search("date:2024-01-15T10:00:00Z").unwrap();
        assert_eq!(term.field, "date");
        assert_eq!(term.value, "2024-01-15T10:00:00Z");
    }

    #[test]
    fn test_parse_search_empty_value() {
        assert!(parse_search("name:").is_none());
        assert!(parse_search("name").is_none());
        assert!(parse_search(":abc").is_none());
    }
}
