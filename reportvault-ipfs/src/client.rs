//! Pinata client implementation.
//!
//! Uploads go to `pinFileToIPFS` as a single multipart POST; retrieval is a
//! plain GET against the configured gateway. Neither path retries.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use reportvault_core::constants::{DEFAULT_CONTENT_TYPE, PIN_CID_VERSION, PIN_FILE_PATH};
use reportvault_core::error::{FetchErrorKind, ReportError, Result};
use reportvault_core::traits::PinningService;
use reportvault_core::types::{FetchedContent, PinMetadata, PinResult, ReportBody, ReportFile};

use crate::config::{PinataAuth, PinataConfig};

/// Client for the Pinata pinning API and IPFS gateway.
#[derive(Debug)]
pub struct PinataClient {
    config: PinataConfig,
    http_client: reqwest::Client,
    legacy_auth_warned: AtomicBool,
}

impl PinataClient {
    /// Creates a client with the given config.
    pub fn with_config(config: PinataConfig) -> Result<Self> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ReportError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
            legacy_auth_warned: AtomicBool::new(false),
        })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &PinataConfig {
        &self.config
    }

    /// Pins a file, tagging it with `metadata` when given.
    ///
    /// Sends `file`, plus `pinataMetadata` and `pinataOptions` when metadata is
    /// present. Path-backed files are streamed from disk.
    #[instrument(skip(self, file, metadata), fields(file = %file.file_name))]
    pub async fn pin_file(&self, file: ReportFile, metadata: Option<&PinMetadata>) -> Result<PinResult> {
        let auth = self.auth()?;

        let mut form = Form::new().part("file", file_part(file).await?);
        if let Some(meta) = metadata {
            let options = serde_json::json!({ "cidVersion": PIN_CID_VERSION });
            form = form
                .text("pinataMetadata", serde_json::to_string(meta)?)
                .text("pinataOptions", options.to_string());
        }

        let url = format!("{}{}", self.config.api_url.trim_end_matches('/'), PIN_FILE_PATH);
        let response = auth
            .apply(self.http_client.post(&url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| ReportError::Upload {
            status: Some(status.as_u16()),
            message: format!("Failed to read response body: {}", e),
        })?;

        if !status.is_success() {
            return Err(ReportError::Upload {
                status: Some(status.as_u16()),
                message: text,
            });
        }

        let body: PinFileResponse = serde_json::from_str(&text).map_err(|e| ReportError::Upload {
            status: Some(status.as_u16()),
            message: format!("Malformed pin response: {}", e),
        })?;
        if body.ipfs_hash.trim().is_empty() {
            return Err(ReportError::Upload {
                status: Some(status.as_u16()),
                message: "Malformed pin response: empty IpfsHash".into(),
            });
        }

        debug!(cid = %body.ipfs_hash, size = ?body.pin_size, "Pinned to IPFS");
        let mut pin = PinResult::new(body.ipfs_hash);
        pin.size_bytes = body.pin_size;
        Ok(pin)
    }

    /// Pins a single local file with no metadata tags.
    pub async fn pin_path(&self, path: impl AsRef<Path>) -> Result<PinResult> {
        self.pin_file(ReportFile::from_path(path.as_ref()), None).await
    }

    /// Downloads content from the gateway.
    ///
    /// The content type is taken from the gateway's `Content-Type` header.
    #[instrument(skip(self))]
    pub async fn fetch(&self, cid: &str) -> Result<FetchedContent> {
        let cid = cid.trim();
        validate_cid(cid)?;

        let mut request = self.http_client.get(self.gateway_link(cid));
        if let Some(token) = &self.config.gateway_token {
            request = request.query(&[("pinataGatewayToken", token)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ReportError::fetch(cid, FetchErrorKind::Network, e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(ReportError::fetch(cid, FetchErrorKind::NotFound, format!("HTTP {}", status)));
        }
        if !status.is_success() {
            return Err(ReportError::fetch(cid, FetchErrorKind::Upstream, format!("HTTP {}", status)));
        }

        let content_type = match response.headers().get(CONTENT_TYPE) {
            Some(value) => value
                .to_str()
                .map_err(|e| ReportError::fetch(cid, FetchErrorKind::Decode, e.to_string()))?
                .to_string(),
            None => DEFAULT_CONTENT_TYPE.to_string(),
        };

        let bytes = response.bytes().await.map_err(|e| {
            let kind = if e.is_timeout() { FetchErrorKind::Network } else { FetchErrorKind::Decode };
            ReportError::fetch(cid, kind, e.to_string())
        })?;

        debug!(cid, content_type = %content_type, len = bytes.len(), "Fetched from gateway");
        Ok(FetchedContent {
            content_identifier: cid.to_string(),
            content_type,
            bytes,
        })
    }

    /// Public URL of `cid` on the configured gateway.
    pub fn gateway_link(&self, cid: &str) -> String {
        format!("{}/{}", self.config.gateway_url.trim_end_matches('/'), cid.trim())
    }

    fn auth(&self) -> Result<&PinataAuth> {
        let auth = self
            .config
            .auth
            .as_ref()
            .ok_or_else(|| ReportError::Config("Pinata credentials not configured".into()))?;

        if auth.is_legacy() && !self.legacy_auth_warned.swap(true, Ordering::Relaxed) {
            warn!("Pinata API key/secret authentication is deprecated; configure PINATA_JWT instead");
        }
        Ok(auth)
    }

    fn transport_error(&self, e: reqwest::Error) -> ReportError {
        let message = if e.is_timeout() {
            format!("Request timed out after {}s", self.config.timeout_seconds)
        } else {
            e.to_string()
        };
        ReportError::Upload {
            status: None,
            message,
        }
    }
}

#[async_trait]
impl PinningService for PinataClient {
    async fn pin(&self, file: ReportFile, metadata: Option<PinMetadata>) -> Result<PinResult> {
        self.pin_file(file, metadata.as_ref()).await
    }

    async fn fetch(&self, cid: &str) -> Result<FetchedContent> {
        PinataClient::fetch(self, cid).await
    }

    fn gateway_link(&self, cid: &str) -> String {
        PinataClient::gateway_link(self, cid)
    }
}

async fn file_part(file: ReportFile) -> Result<Part> {
    let media_type = file.media_type();

    let part = match file.body {
        ReportBody::Bytes(bytes) => {
            let len = bytes.len() as u64;
            Part::stream_with_length(bytes, len)
        }
        ReportBody::Path(path) => {
            let handle = tokio::fs::File::open(&path).await?;
            let len = handle.metadata().await?.len();
            Part::stream_with_length(handle, len)
        }
    };

    part.file_name(file.file_name)
        .mime_str(&media_type)
        .map_err(|e| ReportError::Validation(format!("Invalid content type '{}': {}", media_type, e)))
}

/// Rejects identifiers that could not name gateway content.
///
/// Accepts a CID optionally followed by `/`-separated path segments
/// (`<cid>/report.pdf`). Segments may not be empty or `..`, and nothing may
/// alter the query or fragment.
pub(crate) fn validate_cid(cid: &str) -> Result<()> {
    let invalid = |reason: String| ReportError::fetch(cid, FetchErrorKind::InvalidIdentifier, reason);

    let mut segments = cid.split('/');
    let root = segments.next().unwrap_or_default();
    if root.is_empty() {
        return Err(invalid("CID cannot be empty".into()));
    }
    if !root.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid(format!("CID contains invalid characters: {}", root)));
    }

    for segment in segments {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(invalid(format!("Invalid path segment '{}'", segment)));
        }
        if !segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(invalid(format!("Path segment contains invalid characters: {}", segment)));
        }
    }
    Ok(())
}

/// `pinFileToIPFS` response body.
#[derive(Debug, Deserialize)]
struct PinFileResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
    #[serde(rename = "PinSize", default)]
    pin_size: Option<u64>,
}
