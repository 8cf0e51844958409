//! Plain JSON snapshot: `{version, document}`, as-is.
//!
//! Bitmap pixels are written inline as byte arrays; image bytes are not
//! part of a snapshot (the document only carries their metadata).

use crate::error::IoError;
use atelier_core::{DOCUMENT_VERSION, Document};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: String,
    pub document: Document,
}

impl Snapshot {
    /// Wrap `document` at the current schema version.
    pub fn new(document: Document) -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            document,
        }
    }
}

/// # Errors
/// Serialization failure (not expected for well-formed documents).
pub fn to_json(snapshot: &Snapshot) -> Result<String, IoError> {
    Ok(serde_json::to_string(snapshot)?)
}

pub fn to_json_pretty(snapshot: &Snapshot) -> Result<String, IoError> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// # Errors
/// Malformed JSON or a document that doesn't match the schema.
pub fn from_json(json: &str) -> Result<Snapshot, IoError> {
    let snapshot: Snapshot = serde_json::from_str(json)?;
    if snapshot.version != DOCUMENT_VERSION {
        log::warn!(
            "snapshot version {} differs from {DOCUMENT_VERSION}",
            snapshot.version
        );
    }
    Ok(snapshot)
}
