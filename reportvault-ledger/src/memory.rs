//! In-memory report ledger.
//!
//! Thread-safe storage suitable for development, testing and
//! single-process deployments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, instrument};

use reportvault_core::error::{ReportError, Result};
use reportvault_core::traits::LedgerRecorder;
use reportvault_core::types::ReportRecord;

/// A record plus the time it was written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    /// The recorded association.
    #[serde(flatten)]
    pub record: ReportRecord,
    /// When the record was accepted.
    pub recorded_at: DateTime<Utc>,
}

/// In-memory ledger keyed by content identifier.
///
/// # Indexing
///
/// - CID → entry, for direct lookup and duplicate detection
/// - Owner → CIDs in write order, for "my reports" listings
///
/// Owner addresses are compared case-insensitively.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    /// Primary storage: CID → entry
    entries: DashMap<String, LedgerEntry>,
    /// Owner index: normalized owner → [CIDs]
    owner_index: DashMap<String, Vec<String>>,
}

impl MemoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes an owner address for indexing (lowercase, trimmed).
    fn normalize_owner(owner: &str) -> String {
        owner.trim().to_lowercase()
    }

    /// Looks up the entry for a CID.
    pub fn get(&self, cid: &str) -> Option<LedgerEntry> {
        self.entries.get(cid.trim()).map(|e| e.value().clone())
    }

    /// Returns an owner's records, oldest first.
    pub fn records_for_owner(&self, owner: &str) -> Vec<ReportRecord> {
        let Some(cids) = self.owner_index.get(&Self::normalize_owner(owner)) else {
            return Vec::new();
        };

        cids.iter()
            .filter_map(|cid| self.entries.get(cid).map(|e| e.record.clone()))
            .collect()
    }

    /// Returns every record, oldest first.
    pub fn all_records(&self) -> Vec<ReportRecord> {
        let mut entries: Vec<LedgerEntry> = self.entries.iter().map(|e| e.value().clone()).collect();
        entries.sort_by_key(|e| e.recorded_at);
        entries.into_iter().map(|e| e.record).collect()
    }

    /// Number of recorded reports.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl LedgerRecorder for MemoryLedger {
    /// Records the association.
    ///
    /// Writing the same record twice is a no-op. Reusing a CID for a different
    /// session or owner is rejected.
    #[instrument(skip(self))]
    async fn record_on_ledger(
        &self,
        owner_address: &str,
        content_identifier: &str,
        session_id: &str,
    ) -> Result<()> {
        let (owner, cid, session) = (owner_address.trim(), content_identifier.trim(), session_id.trim());
        if owner.is_empty() || cid.is_empty() || session.is_empty() {
            return Err(ReportError::Ledger(
                "owner, CID and session id are all required".into(),
            ));
        }

        let record = ReportRecord::new(session, cid, owner);
        match self.entries.entry(cid.to_string()) {
            Entry::Occupied(existing) => {
                let prev = &existing.get().record;
                if prev.session_id == record.session_id
                    && Self::normalize_owner(&prev.owner_address) == Self::normalize_owner(owner)
                {
                    debug!(cid, "Record already present");
                    Ok(())
                } else {
                    Err(ReportError::Ledger(format!(
                        "CID {} already recorded for session {}",
                        cid, prev.session_id
                    )))
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(LedgerEntry {
                    record,
                    recorded_at: Utc::now(),
                });
                self.owner_index
                    .entry(Self::normalize_owner(owner))
                    .or_default()
                    .push(cid.to_string());
                debug!(cid, "Recorded on ledger");
                Ok(())
            }
        }
    }
}
