//! Upload request types.

use std::fmt;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CONTENT_TYPE, REPORT_NAME_PREFIX, TAG_OWNER_ADDRESS, TAG_SESSION_ID, TAG_UPLOADED_BY,
};
use crate::error::{ReportError, Result};
use crate::types::PinMetadata;

/// Who is uploading the report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploaderRole {
    /// The treating therapist (session reports).
    #[default]
    Therapist,
    /// The patient (self-uploaded records).
    Patient,
}

impl UploaderRole {
    /// Tag value written into `uploadedBy`.
    pub fn as_str(&self) -> &'static str {
        match self {
            UploaderRole::Therapist => "therapist",
            UploaderRole::Patient => "patient",
        }
    }
}

impl fmt::Display for UploaderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UploaderRole {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "therapist" => Ok(UploaderRole::Therapist),
            "patient" => Ok(UploaderRole::Patient),
            other => Err(ReportError::Validation(format!("Unknown uploader role: {}", other))),
        }
    }
}

/// Where the file contents come from.
#[derive(Clone, Debug)]
pub enum ReportBody {
    /// Contents already in memory (browser form upload, tests).
    Bytes(Bytes),
    /// A local file, streamed from disk when the request is sent.
    Path(PathBuf),
}

/// A file to be pinned.
#[derive(Clone, Debug)]
pub struct ReportFile {
    /// File name sent in the multipart part.
    pub file_name: String,
    /// Media type of the part; `None` lets the client pick a default.
    pub content_type: Option<String>,
    /// File contents.
    pub body: ReportBody,
}

impl ReportFile {
    /// Creates a file from in-memory contents.
    pub fn from_bytes(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            body: ReportBody::Bytes(data.into()),
        }
    }

    /// Creates a file backed by a path on disk.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("report")
            .to_string();

        Self {
            file_name,
            content_type: None,
            body: ReportBody::Path(path),
        }
    }

    /// Sets an explicit media type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Lowercase extension of the file name, without the dot.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    /// Media type for the multipart part: the explicit one, else a guess from the extension.
    pub fn media_type(&self) -> String {
        if let Some(ct) = &self.content_type {
            return ct.clone();
        }

        let guessed = match self.extension().as_deref() {
            Some("pdf") => "application/pdf",
            Some("txt") => "text/plain",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("png") => "image/png",
            Some("zip") => "application/zip",
            Some("doc") => "application/msword",
            Some("docx") => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            _ => DEFAULT_CONTENT_TYPE,
        };
        guessed.to_string()
    }

    /// Size of in-memory contents; `None` for path-backed files.
    pub fn in_memory_len(&self) -> Option<u64> {
        match &self.body {
            ReportBody::Bytes(b) => Some(b.len() as u64),
            ReportBody::Path(_) => None,
        }
    }

    /// Path of a disk-backed file.
    pub fn path(&self) -> Option<&Path> {
        match &self.body {
            ReportBody::Path(p) => Some(p),
            ReportBody::Bytes(_) => None,
        }
    }
}

/// Everything needed to upload one session report.
///
/// All of `file`, `session_id` and `owner_address` are required. A blank
/// string counts as absent.
#[derive(Clone, Debug)]
pub struct UploadRequest {
    /// The report file.
    pub file: Option<ReportFile>,
    /// Therapy session the report belongs to.
    pub session_id: String,
    /// Wallet address of the patient who owns the report.
    pub owner_address: String,
    /// Who is uploading.
    pub role: UploaderRole,
}

impl UploadRequest {
    /// Creates a therapist upload request.
    pub fn new(
        file: Option<ReportFile>,
        session_id: impl Into<String>,
        owner_address: impl Into<String>,
    ) -> Self {
        Self {
            file,
            session_id: session_id.into(),
            owner_address: owner_address.into(),
            role: UploaderRole::default(),
        }
    }

    /// Sets the uploader role.
    pub fn with_role(mut self, role: UploaderRole) -> Self {
        self.role = role;
        self
    }

    /// Checks that every required field is present.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();

        if self.file.is_none() {
            missing.push("file");
        }
        if self.session_id.trim().is_empty() {
            missing.push("session id");
        }
        if self.owner_address.trim().is_empty() {
            missing.push("owner address");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ReportError::Validation(format!(
                "Missing {}",
                missing.join(", ")
            )))
        }
    }

    /// Builds the name/key-value tag bundle attached to the pin.
    pub fn pin_metadata(&self) -> PinMetadata {
        let session_id = self.session_id.trim();
        PinMetadata::new(format!("{}{}", REPORT_NAME_PREFIX, session_id))
            .with_keyvalue(TAG_SESSION_ID, session_id)
            .with_keyvalue(TAG_OWNER_ADDRESS, self.owner_address.trim())
            .with_keyvalue(TAG_UPLOADED_BY, self.role.as_str())
    }
}
