//! Service endpoints and upload policy defaults.

// ═══════════════════════════════════════════════════════════════════════════════
// PINATA ENDPOINTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Base URL of the Pinata pinning API.
pub const DEFAULT_PINATA_API_URL: &str = "https://api.pinata.cloud";

/// Path of the file pinning endpoint, relative to the API base URL.
pub const PIN_FILE_PATH: &str = "/pinning/pinFileToIPFS";

/// Public gateway that resolves `<gateway>/<cid>` to the pinned bytes.
pub const DEFAULT_GATEWAY_URL: &str = "https://gateway.pinata.cloud/ipfs";

/// Request timeout applied to both pinning and gateway requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// CID version requested in `pinataOptions`.
/// Version 0 yields the familiar base58 `Qm...` identifiers.
pub const PIN_CID_VERSION: u8 = 0;

// ═══════════════════════════════════════════════════════════════════════════════
// METADATA TAGS
// ═══════════════════════════════════════════════════════════════════════════════

/// Prefix of the pin name; the session id is appended.
pub const REPORT_NAME_PREFIX: &str = "TherapistReport-";

/// Key/value tag holding the session id.
pub const TAG_SESSION_ID: &str = "sessionId";

/// Key/value tag holding the owner (patient) address.
pub const TAG_OWNER_ADDRESS: &str = "patientAddress";

/// Key/value tag holding the uploader role.
pub const TAG_UPLOADED_BY: &str = "uploadedBy";

// ═══════════════════════════════════════════════════════════════════════════════
// UPLOAD POLICY
// ═══════════════════════════════════════════════════════════════════════════════

/// Largest report accepted for upload (10 MiB).
pub const MAX_REPORT_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// File extensions accepted for upload (lowercase, without the dot).
pub const ALLOWED_REPORT_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt", "jpg", "png", "zip"];

/// Content type assumed when neither the caller nor the gateway provides one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
