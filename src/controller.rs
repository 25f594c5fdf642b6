//! Table controller: query state, fetch orchestration and row bookkeeping

use tracing::{debug, warn};

use crate::api::client::DrugsClient;
use crate::api::errors::ApiError;
use crate::api::types::DrugsPage;
use crate::models::{derive_distinct_companies, DisplayRow, QueryIntent, QueryState};

/// Ticket identifying one load cycle.
///
/// Carries the query snapshot the request was issued with, so rows are mapped
/// against the page/size the response actually belongs to.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    seq: u64,
    pub query: QueryState,
}

/// Owns the table state and drives fetches against the catalog API.
///
/// Rows, total and companies always reflect the newest load that completed;
/// an outcome arriving for a superseded ticket is discarded, and a failed
/// load keeps the previous page on screen.
pub struct TableController {
    query: QueryState,
    rows: Vec<DisplayRow>,
    companies: Vec<String>,
    total: u64,
    loading: bool,
    load_seq: u64,
}

impl TableController {
    pub fn new() -> Self {
        Self {
            query: QueryState::default(),
            rows: Vec::new(),
            companies: Vec::new(),
            total: 0,
            loading: false,
            load_seq: 0,
        }
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn rows(&self) -> &[DisplayRow] {
        &self.rows
    }

    pub fn companies(&self) -> &[String] {
        &self.companies
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Total number of pages under the current page size
    pub fn page_count(&self) -> usize {
        if self.total == 0 {
            1
        } else {
            (self.total as usize + self.query.page_size - 1) / self.query.page_size
        }
    }

    /// Apply a user intent; returns whether the caller should reload the page
    pub fn dispatch(&mut self, intent: QueryIntent) -> bool {
        let (next, refetch) = self.query.apply(intent);
        self.query = next;
        refetch
    }

    /// Start a load cycle for the current query state
    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_seq += 1;
        self.loading = true;
        LoadTicket {
            seq: self.load_seq,
            query: self.query.clone(),
        }
    }

    /// Record the outcome of a load cycle.
    ///
    /// An outcome for a ticket that is no longer the newest is discarded
    /// outright: the newer in-flight request owns the loading flag and will
    /// overwrite the rows itself. For the newest ticket the loading flag
    /// clears whether the fetch succeeded or failed.
    pub fn finish_load(&mut self, ticket: LoadTicket, outcome: Result<DrugsPage, ApiError>) {
        if ticket.seq != self.load_seq {
            debug!(
                "Discarding stale page load (request {} superseded by {})",
                ticket.seq, self.load_seq
            );
            return;
        }

        match outcome {
            Ok(page) => {
                self.rows = page
                    .records
                    .iter()
                    .enumerate()
                    .map(|(index, record)| DisplayRow::from_record(record, &ticket.query, index))
                    .collect();
                self.total = page.total;
            }
            Err(e) => {
                warn!("Failed to fetch drugs page: {}", e);
            }
        }

        self.loading = false;
    }

    /// Fetch the page for the current query state and apply the outcome
    pub async fn load_page(&mut self, client: &DrugsClient) {
        let ticket = self.begin_load();
        let outcome = client.fetch_page(&ticket.query).await;
        self.finish_load(ticket, outcome);
    }

    /// Refresh the distinct company list from a bulk catalog fetch.
    ///
    /// `scan_limit` caps how many records the derivation sees. On failure the
    /// previous list is kept.
    pub async fn load_companies(&mut self, client: &DrugsClient, scan_limit: usize) {
        match client.fetch_catalog(scan_limit).await {
            Ok(page) => {
                self.companies = derive_distinct_companies(&page.records);
                debug!("Derived {} distinct companies", self.companies.len());
            }
            Err(e) => {
                warn!("Failed to fetch companies: {}", e);
            }
        }
    }
}

impl Default for TableController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DrugRecord;

    fn record(code: &str, company: &str) -> DrugRecord {
        DrugRecord {
            code: code.to_string(),
            generic_name: "Paracetamol".to_string(),
            brand_name: "Tylenol".to_string(),
            company: company.to_string(),
            launch_date: "2024-02-10".to_string(),
        }
    }

    fn page(records: Vec<DrugRecord>, total: u64) -> DrugsPage {
        DrugsPage { records, total }
    }

    fn fetch_error() -> ApiError {
        serde_json::from_str::<serde_json::Value>("not json")
            .unwrap_err()
            .into()
    }

    #[test]
    fn test_successful_load_replaces_rows_and_total() {
        let mut controller = TableController::new();

        let ticket = controller.begin_load();
        assert!(controller.is_loading());

        controller.finish_load(
            ticket,
            Ok(page(
                vec![record("D001", "ABC Pharma"), record("D002", "XYZ Labs")],
                142,
            )),
        );

        assert!(!controller.is_loading());
        assert_eq!(controller.total(), 142);
        assert_eq!(controller.rows().len(), 2);
        assert_eq!(controller.rows()[0].id, 1);
        assert_eq!(controller.rows()[1].id, 2);
    }

    #[test]
    fn test_row_ids_follow_ticket_page_offset() {
        let mut controller = TableController::new();
        controller.dispatch(QueryIntent::SetPageSize(50));
        controller.dispatch(QueryIntent::SetPage(2));

        let ticket = controller.begin_load();
        controller.finish_load(ticket, Ok(page(vec![record("D101", "ABC Pharma")], 200)));

        // 1 + index + page * page_size
        assert_eq!(controller.rows()[0].id, 101);
    }

    #[test]
    fn test_failed_load_keeps_previous_rows_and_clears_loading() {
        let mut controller = TableController::new();

        let ticket = controller.begin_load();
        controller.finish_load(
            ticket,
            Ok(page(
                vec![record("D001", "ABC Pharma"), record("D002", "XYZ Labs")],
                2,
            )),
        );

        let ticket = controller.begin_load();
        assert!(controller.is_loading());
        controller.finish_load(ticket, Err(fetch_error()));

        assert!(!controller.is_loading());
        assert_eq!(controller.rows().len(), 2);
        assert_eq!(controller.total(), 2);
    }

    #[test]
    fn test_stale_outcome_is_discarded() {
        let mut controller = TableController::new();

        let first = controller.begin_load();
        let second = controller.begin_load();

        // The newer request resolves first
        controller.finish_load(second, Ok(page(vec![record("D002", "XYZ Labs")], 1)));
        assert!(!controller.is_loading());

        // The older one resolves late and must not win
        controller.finish_load(first, Ok(page(vec![record("D001", "ABC Pharma")], 99)));

        assert_eq!(controller.rows().len(), 1);
        assert_eq!(controller.rows()[0].company, "XYZ Labs");
        assert_eq!(controller.total(), 1);
        assert!(!controller.is_loading());
    }

    #[test]
    fn test_stale_failure_does_not_clear_loading_of_newer_request() {
        let mut controller = TableController::new();

        let first = controller.begin_load();
        let _second = controller.begin_load();

        controller.finish_load(first, Err(fetch_error()));

        // The second request is still in flight
        assert!(controller.is_loading());
    }

    #[test]
    fn test_dispatch_filter_resets_page() {
        let mut controller = TableController::new();
        controller.dispatch(QueryIntent::SetPage(5));

        let refetch = controller.dispatch(QueryIntent::SetCompany(Some("ABC Pharma".to_string())));
        assert!(refetch);
        assert_eq!(controller.query().page, 0);
        assert_eq!(controller.query().company.as_deref(), Some("ABC Pharma"));
    }

    #[test]
    fn test_dispatch_same_filter_does_not_refetch() {
        let mut controller = TableController::new();
        controller.dispatch(QueryIntent::SetCompany(Some("ABC Pharma".to_string())));

        let refetch = controller.dispatch(QueryIntent::SetCompany(Some("ABC Pharma".to_string())));
        assert!(!refetch);
    }

    #[test]
    fn test_missing_meta_yields_zero_total() {
        let mut controller = TableController::new();

        let ticket = controller.begin_load();
        let outcome = crate::api::types::decode_drugs_response(
            r#"[{"code":"D001","genericName":"Paracetamol","brandName":"Tylenol","company":"ABC Pharma","launchDate":"2024-02-10"}]"#,
        )
        .map_err(ApiError::from);
        controller.finish_load(ticket, outcome);

        assert_eq!(controller.total(), 0);
        assert_eq!(controller.rows().len(), 1);
    }

    #[test]
    fn test_filter_scenario_shows_only_matching_rows() {
        let mut controller = TableController::new();

        // Unfiltered load surfaces both companies
        let ticket = controller.begin_load();
        controller.finish_load(
            ticket,
            Ok(page(
                vec![record("D001", "ABC Pharma"), record("D002", "XYZ Labs")],
                2,
            )),
        );

        // Filtering by one company reloads with only its rows
        assert!(controller.dispatch(QueryIntent::SetCompany(Some("ABC Pharma".to_string()))));
        let ticket = controller.begin_load();
        controller.finish_load(ticket, Ok(page(vec![record("D001", "ABC Pharma")], 1)));

        assert_eq!(controller.rows().len(), 1);
        assert!(controller.rows().iter().all(|row| row.company == "ABC Pharma"));

        // Clearing the filter restores the full set on the next load
        assert!(controller.dispatch(QueryIntent::SetCompany(None)));
        let ticket = controller.begin_load();
        controller.finish_load(
            ticket,
            Ok(page(
                vec![record("D001", "ABC Pharma"), record("D002", "XYZ Labs")],
                2,
            )),
        );
        assert_eq!(controller.rows().len(), 2);
    }

    #[test]
    fn test_page_count() {
        let mut controller = TableController::new();
        assert_eq!(controller.page_count(), 1);

        let ticket = controller.begin_load();
        controller.finish_load(ticket, Ok(page(vec![], 101)));
        assert_eq!(controller.page_count(), 5);

        let ticket = controller.begin_load();
        controller.finish_load(ticket, Ok(page(vec![], 100)));
        assert_eq!(controller.page_count(), 4);
    }
}
