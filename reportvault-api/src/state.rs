//! App state: uploader, retriever, ledger, config.

use std::sync::Arc;

use reportvault_core::error::{ReportError, Result};
use reportvault_core::traits::PinningService;
use reportvault_ipfs::{PinataClient, PinataConfig, ReportRetriever, ReportUploader};
use reportvault_ledger::MemoryLedger;

/// Largest accepted request body: the 10 MiB report plus form overhead.
const DEFAULT_BODY_LIMIT_BYTES: usize = 12 * 1024 * 1024;

/// API server configuration.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Pinata endpoints and credentials.
    pub pinata: PinataConfig,
    /// Request body limit in bytes.
    pub body_limit_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            pinata: PinataConfig::default(),
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from the environment (and `.env`).
    ///
    /// Reads the `PINATA_*` variables plus `REPORTVAULT_BODY_LIMIT`.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let body_limit_bytes = match std::env::var("REPORTVAULT_BODY_LIMIT") {
            Ok(raw) => raw.trim().parse().map_err(|_| {
                ReportError::Config(format!("Invalid REPORTVAULT_BODY_LIMIT: {}", raw))
            })?,
            Err(_) => DEFAULT_BODY_LIMIT_BYTES,
        };

        Ok(Self {
            pinata: PinataConfig::from_env()?,
            body_limit_bytes,
        })
    }
}

/// Shared handler state.
pub struct AppState {
    /// Active configuration.
    pub config: ApiConfig,
    /// Report uploader (pin + ledger record).
    pub uploader: ReportUploader,
    /// Report retriever.
    pub retriever: ReportRetriever,
    /// Records written by uploads through this server.
    pub ledger: Arc<MemoryLedger>,
}

impl AppState {
    /// Creates state backed by a real Pinata client and an empty in-memory ledger.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Arc::new(PinataClient::with_config(config.pinata.clone())?);
        Ok(Self::with_service(config, client, Arc::new(MemoryLedger::new())))
    }

    /// Creates state around any pinning service and ledger.
    pub fn with_service(
        config: ApiConfig,
        service: Arc<dyn PinningService>,
        ledger: Arc<MemoryLedger>,
    ) -> Self {
        Self {
            uploader: ReportUploader::new(service.clone(), ledger.clone()),
            retriever: ReportRetriever::new(service),
            ledger,
            config,
        }
    }
}
