//! Report retrieval by content identifier.

use std::sync::Arc;

use tracing::{debug, instrument};

use reportvault_core::error::Result;
use reportvault_core::traits::PinningService;
use reportvault_core::types::{FetchedContent, ReportRecord, RetrievedReport};

/// Fetches previously uploaded reports for display or download.
///
/// Nothing is cached: every call goes to the gateway.
#[derive(Clone)]
pub struct ReportRetriever {
    service: Arc<dyn PinningService>,
}

impl ReportRetriever {
    /// Creates a retriever backed by `service`.
    pub fn new(service: Arc<dyn PinningService>) -> Self {
        Self { service }
    }

    /// Fetches raw content by CID.
    pub async fn fetch_report(&self, cid: &str) -> Result<FetchedContent> {
        self.service.fetch(cid).await
    }

    /// Fetches the report a ledger record points at.
    #[instrument(skip(self, record), fields(session_id = %record.session_id, cid = %record.content_identifier))]
    pub async fn view(&self, record: &ReportRecord) -> Result<RetrievedReport> {
        let content = self.fetch_report(&record.content_identifier).await?;
        debug!(len = content.len(), "Report retrieved");

        Ok(RetrievedReport {
            session_id: record.session_id.clone(),
            content_identifier: content.content_identifier,
            content_type: content.content_type,
            bytes: content.bytes,
        })
    }

    /// Public gateway URL for `cid`.
    pub fn gateway_link(&self, cid: &str) -> String {
        self.service.gateway_link(cid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use reportvault_core::error::{FetchErrorKind, ReportError};
    use reportvault_core::types::{PinMetadata, PinResult, ReportFile};

    struct StubGateway;

    #[async_trait]
    impl PinningService for StubGateway {
        async fn pin(&self, _file: ReportFile, _metadata: Option<PinMetadata>) -> Result<PinResult> {
            unreachable!("retrieval never pins")
        }

        async fn fetch(&self, cid: &str) -> Result<FetchedContent> {
            match cid {
                "Qm123" => Ok(FetchedContent {
                    content_identifier: cid.to_string(),
                    content_type: "application/pdf".into(),
                    bytes: Bytes::from_static(&[0x25, 0x50, 0x44, 0x46]),
                }),
                _ => Err(ReportError::fetch(cid, FetchErrorKind::NotFound, "HTTP 404")),
            }
        }

        fn gateway_link(&self, cid: &str) -> String {
            format!("https://gateway.test/ipfs/{}", cid)
        }
    }

    fn retriever() -> ReportRetriever {
        ReportRetriever::new(Arc::new(StubGateway))
    }

    #[tokio::test]
    async fn test_view_keeps_session() {
        let report = retriever()
            .view(&ReportRecord::new("S1", "Qm123", "0xABC"))
            .await
            .unwrap();

        assert_eq!(report.session_id, "S1");
        assert_eq!(report.content_type, "application/pdf");
        assert_eq!(report.bytes.as_ref(), &[0x25, 0x50, 0x44, 0x46]);
        assert_eq!(report.suggested_file_name(), "report-S1.pdf");
    }

    #[tokio::test]
    async fn test_missing_report() {
        let err = retriever()
            .view(&ReportRecord::new("S9", "QmMissing", "0xABC"))
            .await
            .unwrap_err();
        assert_eq!(err.fetch_kind(), Some(FetchErrorKind::NotFound));
    }

    #[test]
    fn test_gateway_link() {
        assert_eq!(retriever().gateway_link("Qm123"), "https://gateway.test/ipfs/Qm123");
    }
}
