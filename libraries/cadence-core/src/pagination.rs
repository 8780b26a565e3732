/// Page/limit pagination shared by every list endpoint
use crate::error::{CadenceError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Validated 1-based page number and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageParams {
    pub fn new(page: u32, limit: u32) -> Result<Self> {
        if page == 0 {
            return Err(CadenceError::invalid_input("Page must be at least 1"));
        }
        if limit == 0 || limit > MAX_LIMIT {
            return Err(CadenceError::invalid_input(format!(
                "Limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        Ok(Self { page, limit })
    }

    /// Parse raw query-string values, falling back to the defaults when absent
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Result<Self> {
        let page = parse_number(page, DEFAULT_PAGE, "page")?;
        let limit = parse_number(limit, DEFAULT_LIMIT, "limit")?;
        Self::new(page, limit)
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }
}

fn parse_number(raw: Option<&str>, default: u32, name: &str) -> Result<u32> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value
            .parse::<u32>()
            .map_err(|_| CadenceError::invalid_input(format!("Invalid {name} parameter"))),
    }
}

/// One page of results plus the size of the full result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        (self.page as usize) * (self.limit as usize) < self.total
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }
}

/// Slice `[(page-1)*limit, page*limit)` out of a fully fetched list
pub fn paginate<T>(items: Vec<T>, params: PageParams) -> Page<T> {
    let total = items.len();
    let items = items
        .into_iter()
        .skip(params.offset())
        .take(params.limit as usize)
        .collect();

    Page {
        items,
        total,
        page: params.page,
        limit: params.limit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_parameters_are_missing() {
        let params = PageParams::from_query(None, None).unwrap();
        assert_eq!(params, PageParams::default());
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(PageParams::from_query(Some("0"), None).is_err());
        assert!(PageParams::from_query(None, Some("0")).is_err());
        assert!(PageParams::from_query(None, Some("101")).is_err());
        assert!(PageParams::from_query(Some("abc"), None).is_err());
        assert!(PageParams::from_query(Some("-1"), None).is_err());
    }

    #[test]
    fn paginate_slices_and_reports_total() {
        let items: Vec<u32> = (1..=25).collect();

        let first = paginate(items.clone(), PageParams::new(1, 10).unwrap());
        assert_eq!(first.items, (1..=10).collect::<Vec<_>>());
        assert_eq!(first.total, 25);
        assert!(first.has_next());
        assert!(!first.has_prev());

        let last = paginate(items.clone(), PageParams::new(3, 10).unwrap());
        assert_eq!(last.items, vec![21, 22, 23, 24, 25]);
        assert!(!last.has_next());
        assert!(last.has_prev());

        let beyond = paginate(items, PageParams::new(9, 10).unwrap());
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 25);
    }
}
