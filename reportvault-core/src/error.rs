//! Error types for reportvault.
//!
//! Every failure the library can report is a variant of [`ReportError`].
//! Upload failures and ledger failures are kept apart so that a caller can
//! reconcile a pin that succeeded while the ledger write did not.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::PinResult;

/// Result type alias using `ReportError`.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Why a gateway fetch failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    /// The gateway does not know the content identifier (404/410).
    NotFound,
    /// The request never produced a response (DNS, connect, timeout).
    Network,
    /// The gateway answered with any other non-success status.
    Upstream,
    /// A response arrived but its body or headers could not be read.
    Decode,
    /// The identifier cannot name gateway content; no request was sent.
    InvalidIdentifier,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FetchErrorKind::NotFound => "not found",
            FetchErrorKind::Network => "network failure",
            FetchErrorKind::Upstream => "gateway error",
            FetchErrorKind::Decode => "unreadable response",
            FetchErrorKind::InvalidIdentifier => "invalid identifier",
        };
        f.write_str(s)
    }
}

/// Main error type for all reportvault operations.
#[derive(Debug, Error)]
pub enum ReportError {
    // ═══════════════════════════════════════════════════════════════════════════
    // INPUT ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Required input missing or rejected before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // PINNING ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The pinning request failed: HTTP error, transport error or malformed body.
    #[error("{}", upload_message(.status, .message))]
    Upload {
        /// HTTP status, when the service answered at all.
        status: Option<u16>,
        /// Upstream error payload or transport error text.
        message: String,
    },

    /// The content was pinned but the ledger write failed.
    ///
    /// The pin is not lost: [`ReportError::orphaned_pin`] hands it back.
    #[error("Pinned as {} but ledger record failed: {reason}", .pin.content_identifier)]
    LedgerRecord {
        /// The successful pin left without a ledger entry.
        pin: PinResult,
        /// Failure reported by the ledger collaborator.
        reason: String,
    },

    /// Failure reported by a ledger collaborator.
    #[error("Ledger write failed: {0}")]
    Ledger(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // RETRIEVAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Fetching content by identifier failed.
    #[error("Fetch failed for CID '{cid}' ({kind}): {reason}")]
    Fetch {
        /// Requested content identifier.
        cid: String,
        /// Failure class.
        kind: FetchErrorKind,
        /// Details for logs and operators.
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // AMBIENT ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn upload_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("Upload failed with status {}: {}", code, message),
        None => format!("Upload failed: {}", message),
    }
}

impl ReportError {
    /// Shorthand for a fetch error.
    pub fn fetch(cid: impl Into<String>, kind: FetchErrorKind, reason: impl Into<String>) -> Self {
        ReportError::Fetch {
            cid: cid.into(),
            kind,
            reason: reason.into(),
        }
    }

    /// Returns true if retrying the same call could succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ReportError::Upload { status: None, .. } => true,
            ReportError::Upload { status: Some(code), .. } => *code >= 500 || *code == 429,
            ReportError::Fetch { kind, .. } => {
                matches!(kind, FetchErrorKind::Network | FetchErrorKind::Upstream)
            }
            _ => false,
        }
    }

    /// Returns true if this is a pre-flight validation error.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, ReportError::Validation(_))
    }

    /// Returns the pin left without a ledger entry, if this is a ledger-record failure.
    pub fn orphaned_pin(&self) -> Option<&PinResult> {
        match self {
            ReportError::LedgerRecord { pin, .. } => Some(pin),
            _ => None,
        }
    }

    /// Returns the fetch failure class, if this is a fetch error.
    pub fn fetch_kind(&self) -> Option<FetchErrorKind> {
        match self {
            ReportError::Fetch { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Returns the upstream HTTP status, if the service answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ReportError::Upload { status, .. } => *status,
            _ => None,
        }
    }
}
