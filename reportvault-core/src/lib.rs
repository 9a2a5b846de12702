//! # reportvault core
//!
//! Core types, errors, and traits for pinning therapy session reports to IPFS
//! and retrieving them again by content identifier.
//!
//! This crate provides the building blocks shared by the other reportvault crates:
//!
//! - **Types**: Upload requests, pin results, ledger records and retrieved reports
//! - **Errors**: A single error enum with a closed fetch-failure taxonomy
//! - **Constants**: Pinata endpoints and upload policy defaults
//! - **Traits**: The pinning service and ledger collaborator seams
//!
//! ## Example
//!
//! ```rust
//! use reportvault_core::{ReportFile, UploadRequest};
//!
//! let file = ReportFile::from_bytes("report.pdf", b"%PDF".to_vec());
//! let request = UploadRequest::new(Some(file), "S1", "0xABC");
//! assert!(request.validate().is_ok());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{FetchErrorKind, ReportError, Result};
pub use traits::*;
pub use types::*;
