//! Pinata client for storing and retrieving therapy session reports.
//!
//! - [`PinataClient`] talks to the pinning API and the read gateway.
//! - [`ReportUploader`] validates an upload, pins it and records the CID on the ledger.
//! - [`ReportRetriever`] fetches reports back by CID.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod client;
mod config;
mod retriever;
mod uploader;

pub use client::PinataClient;
pub use config::{PinataAuth, PinataConfig};
pub use retriever::ReportRetriever;
pub use uploader::{ReportUploader, UploadPolicy};
