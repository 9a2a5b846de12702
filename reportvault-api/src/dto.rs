//! Request and response bodies.

use serde::{Deserialize, Serialize};

use reportvault_core::types::ReportRecord;

/// `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// `POST /api/v1/reports`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReportResponse {
    pub cid: String,
    pub session_id: String,
    pub owner_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    pub gateway_url: String,
}

/// `POST /api/v1/pins`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinResponse {
    pub cid: String,
    pub gateway_url: String,
}

/// Query for `GET /api/v1/reports`.
#[derive(Debug, Default, Deserialize)]
pub struct ListReportsQuery {
    pub owner: Option<String>,
}

/// `GET /api/v1/reports`
#[derive(Debug, Serialize)]
pub struct ListReportsResponse {
    pub reports: Vec<ReportRecord>,
    pub total: usize,
}
