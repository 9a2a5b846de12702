//! Report upload orchestration: validate, pin, record on the ledger.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use reportvault_core::constants::{ALLOWED_REPORT_EXTENSIONS, MAX_REPORT_SIZE_BYTES};
use reportvault_core::error::{ReportError, Result};
use reportvault_core::traits::{LedgerRecorder, PinningService};
use reportvault_core::types::{PinResult, ReportBody, ReportFile, UploadRequest};

/// Size and type limits applied before a report leaves the machine.
#[derive(Clone, Debug)]
pub struct UploadPolicy {
    /// Largest accepted file.
    pub max_size_bytes: u64,
    /// Accepted extensions, lowercase without the dot. Empty accepts anything.
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_size_bytes: MAX_REPORT_SIZE_BYTES,
            allowed_extensions: ALLOWED_REPORT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl UploadPolicy {
    /// A policy that accepts any file of any size.
    pub fn unrestricted() -> Self {
        Self {
            max_size_bytes: u64::MAX,
            allowed_extensions: Vec::new(),
        }
    }

    /// Checks a file against the policy. Path-backed files must exist.
    pub async fn check(&self, file: &ReportFile) -> Result<()> {
        if !self.allowed_extensions.is_empty() {
            let ext = file.extension().unwrap_or_default();
            if !self.allowed_extensions.iter().any(|allowed| *allowed == ext) {
                return Err(ReportError::Validation(format!(
                    "File type '.{}' not allowed",
                    ext
                )));
            }
        }

        let size = match &file.body {
            ReportBody::Bytes(bytes) => bytes.len() as u64,
            ReportBody::Path(path) => {
                let meta = tokio::fs::metadata(path).await.map_err(|e| {
                    ReportError::Validation(format!("Cannot read {}: {}", path.display(), e))
                })?;
                if !meta.is_file() {
                    return Err(ReportError::Validation(format!(
                        "{} is not a regular file",
                        path.display()
                    )));
                }
                meta.len()
            }
        };

        if size > self.max_size_bytes {
            return Err(ReportError::Validation(format!(
                "File size {} exceeds the {} byte limit",
                size, self.max_size_bytes
            )));
        }
        Ok(())
    }
}

/// Uploads session reports and records them on the ledger.
///
/// Each call issues at most one pin request and, after a successful pin,
/// exactly one ledger write.
#[derive(Clone)]
pub struct ReportUploader {
    service: Arc<dyn PinningService>,
    ledger: Arc<dyn LedgerRecorder>,
    policy: UploadPolicy,
}

impl ReportUploader {
    /// Creates an uploader with the default policy.
    pub fn new(service: Arc<dyn PinningService>, ledger: Arc<dyn LedgerRecorder>) -> Self {
        Self {
            service,
            ledger,
            policy: UploadPolicy::default(),
        }
    }

    /// Replaces the upload policy.
    pub fn with_policy(mut self, policy: UploadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Uploads a report.
    ///
    /// # Errors
    ///
    /// - `Validation` if a required field is absent or the file breaks the
    ///   policy; nothing is sent.
    /// - `Upload` if pinning fails.
    /// - `LedgerRecord` if the pin succeeded but the ledger write failed; the
    ///   pin is carried in the error.
    #[instrument(skip(self, request), fields(session_id = %request.session_id, owner = %request.owner_address))]
    pub async fn upload(&self, request: UploadRequest) -> Result<PinResult> {
        request.validate()?;
        let metadata = request.pin_metadata();

        let UploadRequest {
            file,
            session_id,
            owner_address,
            ..
        } = request;
        let file = file.ok_or_else(|| ReportError::Validation("Missing file".into()))?;
        let (session_id, owner_address) = (session_id.trim(), owner_address.trim());

        self.policy.check(&file).await?;

        let pin = self.service.pin(file, Some(metadata)).await?;
        info!(cid = %pin.content_identifier, "Report pinned");

        if let Err(e) = self
            .ledger
            .record_on_ledger(owner_address, &pin.content_identifier, session_id)
            .await
        {
            warn!(cid = %pin.content_identifier, error = %e, "Ledger record failed; pin left orphaned");
            return Err(ReportError::LedgerRecord {
                pin,
                reason: e.to_string(),
            });
        }

        info!(cid = %pin.content_identifier, "Report recorded on ledger");
        Ok(pin)
    }

    /// Pins a single file with no metadata tags and no ledger record.
    ///
    /// The upload policy still applies.
    #[instrument(skip(self, file), fields(file = %file.file_name))]
    pub async fn pin_file(&self, file: ReportFile) -> Result<PinResult> {
        self.policy.check(&file).await?;

        let pin = self.service.pin(file, None).await?;
        info!(cid = %pin.content_identifier, "File pinned");
        Ok(pin)
    }
}
