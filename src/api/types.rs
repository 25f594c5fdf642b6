//! Wire types for the drug catalog API

use serde::Deserialize;

use crate::models::DrugRecord;

/// Drug catalog API endpoints
pub struct DrugsApi;

impl DrugsApi {
    /// Records listing endpoint, relative to the configured base URL
    pub const DRUGS_ENDPOINT: &'static str = "/api/drugs";
}

/// Metadata block of an envelope response
#[derive(Debug, Deserialize)]
pub struct ResponseMeta {
    /// Total number of records matching the query
    #[serde(default)]
    pub total: u64,
}

/// Raw response body. The API historically returned either a bare record
/// array or a `{data, meta}` envelope; both shapes decode, anything else is
/// a decode error.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDrugsResponse {
    Envelope {
        data: Vec<DrugRecord>,
        #[serde(default)]
        meta: Option<ResponseMeta>,
    },
    Bare(Vec<DrugRecord>),
}

/// One decoded page of records in canonical form
#[derive(Debug)]
pub struct DrugsPage {
    pub records: Vec<DrugRecord>,
    /// Total matching record count; 0 when the response carried no metadata
    pub total: u64,
}

impl From<RawDrugsResponse> for DrugsPage {
    fn from(raw: RawDrugsResponse) -> Self {
        match raw {
            RawDrugsResponse::Envelope { data, meta } => DrugsPage {
                records: data,
                total: meta.map(|m| m.total).unwrap_or(0),
            },
            RawDrugsResponse::Bare(records) => DrugsPage { records, total: 0 },
        }
    }
}

/// Decode a response body into a canonical page
pub fn decode_drugs_response(body: &str) -> Result<DrugsPage, serde_json::Error> {
    serde_json::from_str::<RawDrugsResponse>(body).map(DrugsPage::from)
}
