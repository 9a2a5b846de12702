//! API route handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use tracing::{debug, info};

use reportvault_core::error::ReportError;
use reportvault_core::types::{ReportFile, UploadRequest, UploaderRole};

use crate::dto::*;
use crate::error::ApiError;
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Fields of the report upload form. Unknown fields are ignored.
#[derive(Default)]
struct ReportForm {
    file: Option<ReportFile>,
    session_id: Option<String>,
    owner_address: Option<String>,
    role: Option<UploaderRole>,
}

impl ReportForm {
    async fn read(multipart: &mut Multipart) -> Result<Self> {
        let mut form = ReportForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let content_type = field.content_type().map(str::to_string);
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("Failed to read file: {}", e)))?;
                    form.file = form_file(file_name, content_type, data);
                }
                "sessionId" => form.session_id = Some(read_text(field).await?),
                "ownerAddress" | "patientAddress" => form.owner_address = Some(read_text(field).await?),
                "uploadedBy" => {
                    let role = read_text(field).await?;
                    form.role = Some(role.parse()?);
                }
                other => debug!(field = other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid form field: {}", e)))
}

/// A browser submits an empty, unnamed part when no file was chosen.
fn form_file(file_name: String, content_type: Option<String>, data: Bytes) -> Option<ReportFile> {
    if file_name.is_empty() && data.is_empty() {
        return None;
    }

    let file_name = if file_name.is_empty() { "report".to_string() } else { file_name };
    let mut file = ReportFile::from_bytes(file_name, data);
    // application/octet-stream defers to the extension guess
    if let Some(ct) = content_type.filter(|ct| ct != "application/octet-stream") {
        file = file.with_content_type(ct);
    }
    Some(file)
}

/// POST /api/v1/reports
pub async fn upload_report(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadReportResponse>> {
    let form = ReportForm::read(&mut multipart).await?;

    let request = UploadRequest::new(
        form.file,
        form.session_id.unwrap_or_default(),
        form.owner_address.unwrap_or_default(),
    )
    .with_role(form.role.unwrap_or_default());

    let session_id = request.session_id.trim().to_string();
    let owner_address = request.owner_address.trim().to_string();

    let pin = state.uploader.upload(request).await?;

    info!(cid = %pin.content_identifier, session_id = %session_id, "Report uploaded");
    Ok(Json(UploadReportResponse {
        gateway_url: state.retriever.gateway_link(&pin.content_identifier),
        cid: pin.content_identifier,
        session_id,
        owner_address,
        size_bytes: pin.size_bytes,
    }))
}

/// POST /api/v1/pins
pub async fn pin_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<PinResponse>> {
    let form = ReportForm::read(&mut multipart).await?;
    let file = form
        .file
        .ok_or_else(|| ReportError::Validation("Missing file".into()))?;

    let pin = state.uploader.pin_file(file).await?;

    Ok(Json(PinResponse {
        gateway_url: state.retriever.gateway_link(&pin.content_identifier),
        cid: pin.content_identifier,
    }))
}

/// GET /api/v1/reports?owner=0x...
///
/// Lists one patient's records; `owner` is required.
pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListReportsQuery>,
) -> Result<Json<ListReportsResponse>> {
    let owner = query
        .owner
        .as_deref()
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .ok_or_else(|| ReportError::Validation("Missing owner address".into()))?;

    let reports = state.ledger.records_for_owner(owner);
    Ok(Json(ListReportsResponse {
        total: reports.len(),
        reports,
    }))
}

/// GET /api/v1/reports/*cid - raw bytes with the gateway's content type
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    Path(cid): Path<String>,
) -> Result<impl IntoResponse> {
    let content = state.retriever.fetch_report(&cid).await?;

    Ok((
        [(header::CONTENT_TYPE, content.content_type)],
        content.bytes,
    ))
}
