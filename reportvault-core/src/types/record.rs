//! Ledger records and retrieved reports.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// The (owner, CID, session) association written to the ledger.
///
/// Keyed by `content_identifier`; never mutated once created.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    /// Session the report belongs to.
    pub session_id: String,
    /// CID returned by the pinning service.
    pub content_identifier: String,
    /// Patient wallet address.
    pub owner_address: String,
}

impl ReportRecord {
    /// Creates a record.
    pub fn new(
        session_id: impl Into<String>,
        content_identifier: impl Into<String>,
        owner_address: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            content_identifier: content_identifier.into(),
            owner_address: owner_address.into(),
        }
    }
}

/// A report fetched for display or download.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetrievedReport {
    /// Session the report belongs to.
    pub session_id: String,
    /// CID the report was fetched by.
    pub content_identifier: String,
    /// Media type reported by the gateway.
    pub content_type: String,
    /// Report contents.
    pub bytes: Bytes,
}

impl RetrievedReport {
    /// File name to offer when saving the report.
    pub fn suggested_file_name(&self) -> String {
        let stem: String = self
            .session_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        let stem = if stem.is_empty() { self.content_identifier.clone() } else { stem };

        format!("report-{}.{}", stem, extension_for(&self.content_type))
    }
}

fn extension_for(content_type: &str) -> &'static str {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "application/pdf" => "pdf",
        "text/plain" => "txt",
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "application/zip" => "zip",
        "application/msword" => "doc",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => "docx",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(session: &str, content_type: &str) -> RetrievedReport {
        RetrievedReport {
            session_id: session.into(),
            content_identifier: "Qm123".into(),
            content_type: content_type.into(),
            bytes: Bytes::from_static(b"%PDF"),
        }
    }

    #[test]
    fn test_suggested_file_name() {
        assert_eq!(report("S1", "application/pdf").suggested_file_name(), "report-S1.pdf");
        assert_eq!(
            report("S/2 x", "text/plain; charset=utf-8").suggested_file_name(),
            "report-S_2_x.txt"
        );
        assert_eq!(report("", "application/x-unknown").suggested_file_name(), "report-Qm123.bin");
    }

    #[test]
    fn test_record_serialization() {
        let record = ReportRecord::new("S1", "Qm123", "0xABC");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["sessionId"], "S1");
        assert_eq!(json["contentIdentifier"], "Qm123");
        assert_eq!(json["ownerAddress"], "0xABC");
    }
}
