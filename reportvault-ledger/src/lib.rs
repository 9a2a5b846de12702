//! # reportvault ledger
//!
//! An in-process [`LedgerRecorder`](reportvault_core::LedgerRecorder) that keeps
//! (owner, CID, session) records in memory.
//!
//! Production deployments record on a blockchain owned by the embedding
//! application; this implementation backs the API server, the CLI and tests.
//!
//! ```rust,ignore
//! use reportvault_ledger::MemoryLedger;
//!
//! let ledger = MemoryLedger::new();
//! ledger.record_on_ledger("0xABC", "Qm123", "S1").await?;
//! assert_eq!(ledger.records_for_owner("0xabc").len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod memory;

pub use memory::{LedgerEntry, MemoryLedger};
