//! HTTP client for the drug catalog API

use reqwest::Client;
use tracing::debug;

use crate::api::errors::ApiError;
use crate::api::types::{decode_drugs_response, DrugsApi, DrugsPage};
use crate::config::Config;
use crate::models::QueryState;

/// Client for the drug catalog REST endpoint
#[derive(Debug, Clone)]
pub struct DrugsClient {
    http: Client,
    base_url: String,
}

impl DrugsClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(&config.http.user_agent)
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch one page of records for the given query state
    pub async fn fetch_page(&self, query: &QueryState) -> Result<DrugsPage, ApiError> {
        let url = self.drugs_url();
        let params = page_params(query);
        debug!("Fetching drugs page from {} with {:?}", url, params);

        let response = self.http.get(&url).query(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { status });
        }

        let body = response.text().await?;
        Ok(decode_drugs_response(&body)?)
    }

    /// Bulk fetch used to derive the distinct company list.
    ///
    /// `limit` is a scan window, not a completeness guarantee: companies that
    /// only appear beyond the first `limit` records never show up.
    pub async fn fetch_catalog(&self, limit: usize) -> Result<DrugsPage, ApiError> {
        let url = self.drugs_url();
        debug!("Fetching drug catalog from {} (limit {})", url, limit);

        let response = self
            .http
            .get(&url)
            .query(&[("limit", limit.to_string())])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { status });
        }

        let body = response.text().await?;
        Ok(decode_drugs_response(&body)?)
    }

    fn drugs_url(&self) -> String {
        format!("{}{}", self.base_url, DrugsApi::DRUGS_ENDPOINT)
    }
}

/// Query parameters for a page fetch. The API counts pages from 1, and the
/// company parameter is omitted entirely when no filter is set.
pub(crate) fn page_params(query: &QueryState) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("page", (query.page + 1).to_string()),
        ("limit", query.page_size.to_string()),
    ];
    if let Some(company) = &query.company {
        params.push(("company", company.clone()));
    }
    params
}
