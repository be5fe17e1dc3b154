//! Upload transport: file names and encoded payloads as submitted by a client.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::{InsightError, Result};

/// Marker separating the media-type label from the data in a data URL.
const BASE64_MARKER: &str = ";base64,";

/// One file as received from the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedDocument {
    /// Name the file should be stored under
    pub name: String,
    /// Either a `data:<mime>;base64,<data>` URL or bare base64
    pub payload: String,
}

impl UploadedDocument {
    pub fn new(name: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
        }
    }

    /// Builds a document from raw bytes using the data-URL transport.
    pub fn from_bytes(name: impl Into<String>, mime_type: &str, bytes: &[u8]) -> Self {
        let payload = format!("data:{}{}{}", mime_type, BASE64_MARKER, STANDARD.encode(bytes));
        Self::new(name, payload)
    }

    /// Decodes the payload into file bytes.
    ///
    /// # Errors
    ///
    /// Returns `InsightError::Decode` naming this file when the payload is
    /// neither a base64 data URL nor bare base64.
    pub fn decode(&self) -> Result<Vec<u8>> {
        decode_payload(&self.payload).map_err(|message| InsightError::decode(&self.name, message))
    }
}

/// Decodes a data URL (`data:<mime>;base64,<data>`) or bare base64 text.
pub fn decode_payload(payload: &str) -> std::result::Result<Vec<u8>, String> {
    let payload = payload.trim();
    let encoded = if let Some(rest) = payload.strip_prefix("data:") {
        match rest.find(BASE64_MARKER) {
            Some(idx) => &rest[idx + BASE64_MARKER.len()..],
            None => return Err("data URL is not base64-encoded".to_string()),
        }
    } else {
        payload
    };

    // MIME-wrapped payloads carry line breaks inside the data
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| format!("invalid base64: {}", e))
}

/// Checks that `name` is a bare file name safe to join onto a directory.
///
/// Rejects separators, parent references and names without a stem.
pub fn is_safe_file_name(name: &str) -> bool {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains('\0') {
        return false;
    }
    if name == "." || name == ".." {
        return false;
    }
    match name.rsplit_once('.') {
        Some((stem, _)) => !stem.is_empty() && stem != ".",
        None => true,
    }
}

/// Checks the extension of `name` against an allow-list (case-insensitive,
/// entries given without the leading dot).
pub fn has_allowed_extension(name: &str, allowed: &[String]) -> bool {
    match name.rsplit_once('.') {
        Some((_, ext)) => allowed
            .iter()
            .any(|a| a.trim_start_matches('.').eq_ignore_ascii_case(ext)),
        None => false,
    }
}
