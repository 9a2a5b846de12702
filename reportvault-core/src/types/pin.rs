//! Pinning service request/response types.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Name plus key/value tags attached to a pin.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinMetadata {
    /// Human-readable pin name.
    pub name: String,
    /// String-valued tags, searchable in the pinning service.
    pub keyvalues: BTreeMap<String, String>,
}

impl PinMetadata {
    /// Creates metadata with a name and no tags.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keyvalues: BTreeMap::new(),
        }
    }

    /// Adds a tag.
    pub fn with_keyvalue(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.keyvalues.insert(key.into(), value.into());
        self
    }
}

/// Outcome of a successful pin, as reported by the pinning service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinResult {
    /// Service-assigned content identifier (CID).
    pub content_identifier: String,
    /// Pinned size, when the service reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

impl PinResult {
    /// Creates a result without size information.
    pub fn new(content_identifier: impl Into<String>) -> Self {
        Self {
            content_identifier: content_identifier.into(),
            size_bytes: None,
        }
    }

    /// Attaches the pinned size.
    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = Some(size_bytes);
        self
    }
}

/// Raw content fetched from the gateway.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchedContent {
    /// Identifier the content was fetched by.
    pub content_identifier: String,
    /// Media type reported by the gateway.
    pub content_type: String,
    /// Body bytes.
    pub bytes: Bytes,
}

impl FetchedContent {
    /// Number of bytes fetched.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the body is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
