//! Collaborator traits.
//!
//! The pinning service and the ledger are both external systems. These traits
//! are the seams where real clients or test doubles plug in.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{FetchedContent, PinMetadata, PinResult, ReportFile};

// ═══════════════════════════════════════════════════════════════════════════════
// PINNING SERVICE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface for a content pinning service with a read gateway.
#[async_trait]
pub trait PinningService: Send + Sync {
    /// Pins a file, optionally tagged with metadata, and returns the service's result.
    ///
    /// Exactly one upstream request per call; no retry.
    async fn pin(&self, file: ReportFile, metadata: Option<PinMetadata>) -> Result<PinResult>;

    /// Fetches pinned content by identifier.
    async fn fetch(&self, cid: &str) -> Result<FetchedContent>;

    /// Public URL at which the content can be viewed.
    fn gateway_link(&self, cid: &str) -> String;
}

// ═══════════════════════════════════════════════════════════════════════════════
// LEDGER TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface for recording (owner, CID, session) associations.
///
/// In production this is a blockchain write owned by the caller. Its own
/// persistence and consistency guarantees are not this crate's concern.
#[async_trait]
pub trait LedgerRecorder: Send + Sync {
    /// Records that `content_identifier` is the report for `session_id`, owned
    /// by `owner_address`.
    async fn record_on_ledger(
        &self,
        owner_address: &str,
        content_identifier: &str,
        session_id: &str,
    ) -> Result<()>;
}
