//! Domain types for report upload and retrieval.

mod pin;
mod record;
mod upload;

pub use pin::{FetchedContent, PinMetadata, PinResult};
pub use record::{ReportRecord, RetrievedReport};
pub use upload::{ReportBody, ReportFile, UploadRequest, UploaderRole};
