//! HTTP contract tests against a mock Pinata API and gateway.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use reportvault_core::{
    FetchErrorKind, LedgerRecorder, ReportError, ReportFile, ReportRecord, Result, UploadRequest,
};
use reportvault_ipfs::{PinataAuth, PinataClient, PinataConfig, ReportRetriever, ReportUploader};
use reportvault_ledger::MemoryLedger;

const PDF_BYTES: [u8; 4] = [0x25, 0x50, 0x44, 0x46];

fn client_for(server: &MockServer, auth: PinataAuth) -> Arc<PinataClient> {
    let config = PinataConfig::new(auth)
        .with_api_url(server.uri())
        .with_gateway_url(format!("{}/ipfs", server.uri()))
        .with_timeout(5);
    Arc::new(PinataClient::with_config(config).unwrap())
}

fn pin_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "IpfsHash": "Qm123",
        "PinSize": 4,
        "Timestamp": "2024-06-01T10:00:00.000Z"
    }))
}

fn report_pdf() -> ReportFile {
    ReportFile::from_bytes("report.pdf", PDF_BYTES.to_vec())
}

struct RejectingLedger;

#[async_trait]
impl LedgerRecorder for RejectingLedger {
    async fn record_on_ledger(&self, _owner: &str, _cid: &str, _session: &str) -> Result<()> {
        Err(ReportError::Ledger("user rejected transaction".into()))
    }
}

#[tokio::test]
async fn upload_pins_once_and_records_cid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .and(header("authorization", "Bearer test-jwt"))
        .respond_with(pin_ok())
        .expect(1)
        .mount(&server)
        .await;

    let ledger = Arc::new(MemoryLedger::new());
    let uploader = ReportUploader::new(client_for(&server, PinataAuth::jwt("test-jwt")), ledger.clone());

    let pin = uploader
        .upload(UploadRequest::new(Some(report_pdf()), "S1", "0xABC"))
        .await
        .unwrap();

    assert_eq!(pin.content_identifier, "Qm123");
    assert_eq!(pin.size_bytes, Some(4));
    assert_eq!(ledger.len(), 1);
    assert_eq!(
        ledger.get("Qm123").unwrap().record,
        ReportRecord::new("S1", "Qm123", "0xABC")
    );

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"file\"; filename=\"report.pdf\""));
    assert!(body.contains("name=\"pinataMetadata\""));
    assert!(body.contains("\"name\":\"TherapistReport-S1\""));
    assert!(body.contains("\"patientAddress\":\"0xABC\""));
    assert!(body.contains("\"sessionId\":\"S1\""));
    assert!(body.contains("\"uploadedBy\":\"therapist\""));
    assert!(body.contains("name=\"pinataOptions\""));
    assert!(body.contains("{\"cidVersion\":0}"));
}

#[tokio::test]
async fn missing_input_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(pin_ok())
        .expect(0)
        .mount(&server)
        .await;

    let ledger = Arc::new(MemoryLedger::new());
    let uploader = ReportUploader::new(client_for(&server, PinataAuth::jwt("test-jwt")), ledger.clone());

    for request in [
        UploadRequest::new(None, "S1", "0xABC"),
        UploadRequest::new(Some(report_pdf()), " ", "0xABC"),
        UploadRequest::new(Some(report_pdf()), "S1", ""),
    ] {
        let err = uploader.upload(request).await.unwrap_err();
        assert!(err.is_validation_error(), "unexpected error: {}", err);
    }

    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(ledger.is_empty());
}

#[tokio::test]
async fn legacy_key_pair_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .and(header("pinata_api_key", "key"))
        .and(header("pinata_secret_api_key", "secret"))
        .respond_with(pin_ok())
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, PinataAuth::api_key("key", "secret"));
    let pin = client.pin_file(report_pdf(), None).await.unwrap();
    assert_eq!(pin.content_identifier, "Qm123");

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn upstream_error_carries_status_and_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_string(r#"{"error":{"reason":"INVALID_CREDENTIALS"}}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let ledger = Arc::new(MemoryLedger::new());
    let uploader = ReportUploader::new(client_for(&server, PinataAuth::jwt("bad")), ledger.clone());

    let err = uploader
        .upload(UploadRequest::new(Some(report_pdf()), "S1", "0xABC"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert!(err.to_string().contains("INVALID_CREDENTIALS"));
    assert!(!err.is_recoverable());
    assert!(ledger.is_empty());
}

#[tokio::test]
async fn malformed_success_body_is_upload_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server, PinataAuth::jwt("test-jwt"));
    let err = client.pin_file(report_pdf(), None).await.unwrap_err();

    assert!(matches!(err, ReportError::Upload { status: Some(200), .. }));
    assert!(err.to_string().contains("Malformed pin response"));
}

#[tokio::test]
async fn slow_service_times_out_without_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(pin_ok().set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let config = PinataConfig::new(PinataAuth::jwt("test-jwt"))
        .with_api_url(server.uri())
        .with_timeout(1);
    let client = PinataClient::with_config(config).unwrap();

    let err = client.pin_file(report_pdf(), None).await.unwrap_err();
    assert_eq!(err.status(), None);
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn ledger_failure_reports_orphaned_pin() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .respond_with(pin_ok())
        .expect(1)
        .mount(&server)
        .await;

    let uploader = ReportUploader::new(
        client_for(&server, PinataAuth::jwt("test-jwt")),
        Arc::new(RejectingLedger),
    );

    let err = uploader
        .upload(UploadRequest::new(Some(report_pdf()), "S1", "0xABC"))
        .await
        .unwrap_err();

    assert!(matches!(err, ReportError::LedgerRecord { .. }));
    assert_eq!(err.orphaned_pin().unwrap().content_identifier, "Qm123");
}

#[tokio::test]
async fn pin_path_streams_file_without_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .and(body_string_contains("session notes from disk"))
        .respond_with(pin_ok())
        .expect(1)
        .mount(&server)
        .await;

    let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    file.write_all(b"session notes from disk").unwrap();

    let client = client_for(&server, PinataAuth::jwt("test-jwt"));
    let pin = client.pin_path(file.path()).await.unwrap();
    assert_eq!(pin.content_identifier, "Qm123");

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("Content-Type: text/plain"));
    assert!(!body.contains("pinataMetadata"));
    assert!(!body.contains("pinataOptions"));
}

#[tokio::test]
async fn fetch_returns_bytes_and_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ipfs/Qm123"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(PDF_BYTES.to_vec(), "application/pdf"))
        .expect(1)
        .mount(&server)
        .await;

    let retriever = ReportRetriever::new(client_for(&server, PinataAuth::jwt("test-jwt")));
    let content = retriever.fetch_report("Qm123").await.unwrap();

    assert_eq!(content.content_identifier, "Qm123");
    assert_eq!(content.content_type, "application/pdf");
    assert_eq!(content.bytes.as_ref(), &PDF_BYTES);

    let report = retriever
        .view(&ReportRecord::new("S1", "Qm123", "0xABC"))
        .await
        .unwrap();
    assert_eq!(report.bytes, bytes::Bytes::from_static(&PDF_BYTES));
    assert_eq!(report.session_id, "S1");
}

#[tokio::test]
async fn fetch_sends_gateway_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ipfs/Qm123"))
        .and(query_param("pinataGatewayToken", "gw-token"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"hello".to_vec(), "text/plain"))
        .expect(1)
        .mount(&server)
        .await;

    let config = PinataConfig::default()
        .with_gateway_url(format!("{}/ipfs", server.uri()))
        .with_gateway_token("gw-token");
    let client = PinataClient::with_config(config).unwrap();

    let content = client.fetch("Qm123").await.unwrap();
    assert_eq!(content.bytes.as_ref(), b"hello");
    assert_eq!(client.gateway_link("Qm123"), format!("{}/ipfs/Qm123", server.uri()));
}

#[tokio::test]
async fn fetch_error_kinds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ipfs/QmMissing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ipfs/QmBroken"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let client = client_for(&server, PinataAuth::jwt("test-jwt"));

    let err = client.fetch("QmMissing").await.unwrap_err();
    assert_eq!(err.fetch_kind(), Some(FetchErrorKind::NotFound));

    let err = client.fetch("QmBroken").await.unwrap_err();
    assert_eq!(err.fetch_kind(), Some(FetchErrorKind::Upstream));
    assert!(err.is_recoverable());

    let before = server.received_requests().await.unwrap().len();
    for cid in ["", "Qm-1", "Qm123/../secret", "Qm123?download=1"] {
        let err = client.fetch(cid).await.unwrap_err();
        assert_eq!(err.fetch_kind(), Some(FetchErrorKind::InvalidIdentifier), "cid {:?}", cid);
    }
    assert_eq!(server.received_requests().await.unwrap().len(), before);
}

#[tokio::test]
async fn fetch_accepts_path_within_directory_cid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ipfs/Qm123/report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(PDF_BYTES.to_vec(), "application/pdf"))
        .expect(1)
        .mount(&server)
        .await;

    let retriever = ReportRetriever::new(client_for(&server, PinataAuth::jwt("test-jwt")));
    let content = retriever.fetch_report("Qm123/report.pdf").await.unwrap();

    assert_eq!(content.content_identifier, "Qm123/report.pdf");
    assert_eq!(content.bytes.as_ref(), &PDF_BYTES);
}

#[tokio::test]
async fn fetch_from_unreachable_gateway_is_network_error() {
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };

    let config = PinataConfig::default()
        .with_gateway_url(format!("{}/ipfs", uri))
        .with_timeout(2);
    let client = PinataClient::with_config(config).unwrap();

    let err = client.fetch("Qm123").await.unwrap_err();
    assert_eq!(err.fetch_kind(), Some(FetchErrorKind::Network));
}
