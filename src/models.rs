use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use std::collections::HashSet;

/// Page sizes the pagination control may request
pub const PAGE_SIZES: [usize; 3] = [25, 50, 100];

/// Rows per page before the user picks anything else
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Raw drug record as returned by the catalog API
#[derive(Debug, Clone, Deserialize)]
pub struct DrugRecord {
    pub code: String,
    #[serde(rename = "genericName")]
    pub generic_name: String,
    #[serde(rename = "brandName")]
    pub brand_name: String,
    pub company: String,
    /// Launch date as sent by the API; parsed only when rendered
    #[serde(rename = "launchDate")]
    pub launch_date: String,
}

/// One table row derived from a [`DrugRecord`].
///
/// `id` is a row number local to the current page, not a stable identifier:
/// it restarts from `page * page_size + 1` on every page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub id: usize,
    pub code: String,
    pub name: String,
    pub company: String,
    pub launch_date: String,
}

impl DisplayRow {
    /// Build the row for `record` at `index` within the page described by `query`
    pub fn from_record(record: &DrugRecord, query: &QueryState, index: usize) -> Self {
        Self {
            id: 1 + index + query.page * query.page_size,
            code: record.code.clone(),
            name: compose_name(&record.generic_name, &record.brand_name),
            company: record.company.clone(),
            launch_date: record.launch_date.clone(),
        }
    }
}

/// Pagination and filter state driving every page fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    /// Zero-based page number
    pub page: usize,
    /// Rows per page, one of [`PAGE_SIZES`]
    pub page_size: usize,
    /// Company filter; `None` requests the unfiltered set
    pub company: Option<String>,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            company: None,
        }
    }
}

/// User intents that may mutate the query state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryIntent {
    SetPage(usize),
    SetPageSize(usize),
    SetCompany(Option<String>),
}

impl QueryState {
    /// Apply an intent, returning the next state and whether it warrants a refetch.
    ///
    /// Changing the page size or the company filter resets the page to 0 so the
    /// next request cannot land past the end of a smaller filtered set. Intents
    /// that leave the state unchanged (or request a page size outside
    /// [`PAGE_SIZES`]) do not trigger a refetch.
    pub fn apply(&self, intent: QueryIntent) -> (QueryState, bool) {
        let mut next = self.clone();
        match intent {
            QueryIntent::SetPage(page) => {
                if page == self.page {
                    return (next, false);
                }
                next.page = page;
            }
            QueryIntent::SetPageSize(size) => {
                if !PAGE_SIZES.contains(&size) || size == self.page_size {
                    return (next, false);
                }
                next.page_size = size;
                next.page = 0;
            }
            QueryIntent::SetCompany(company) => {
                if company == self.company {
                    return (next, false);
                }
                next.company = company;
                next.page = 0;
            }
        }
        (next, true)
    }
}

/// Compose the display name shown in the Name column
pub fn compose_name(generic: &str, brand: &str) -> String {
    format!("{} ({})", generic, brand)
}

/// Format a launch date for display as `DD.MM.YYYY`.
///
/// Accepts `YYYY-MM-DD` or an RFC 3339 date-time; anything else renders as
/// the sentinel `--`.
pub fn format_launch_date(raw: &str) -> String {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        });

    match date {
        Some(date) => date.format("%d.%m.%Y").to_string(),
        None => "--".to_string(),
    }
}

/// Distinct company names in first-occurrence order
pub fn derive_distinct_companies(records: &[DrugRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut companies = Vec::new();
    for record in records {
        if seen.insert(record.company.clone()) {
            companies.push(record.company.clone());
        }
    }
    companies
}
