//! Host Integration - Events Across The Editor Boundary
//!
//! Fire-and-forget messages between the editing surface and the server
//! process hosting it. Wire form is `{"event": "...", "payload": {...}}`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::constraints::{IMAGE_FORMATS, MAX_IMAGE_SIZE_KB};
use crate::document::Template;

/// Editor → host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum OutboundEvent {
    #[serde(rename = "email_builder:save")]
    Save { json: Template, mjml: String },

    /// Drafts are saved as-is, valid or not
    #[serde(rename = "email_builder:autosave")]
    Autosave { json: Value },

    #[serde(rename = "email_builder:preview")]
    Preview { mjml: String },

    #[serde(rename = "email_builder:upload")]
    Upload(ImageUpload),
}

impl OutboundEvent {
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::Save { .. } => "email_builder:save",
            OutboundEvent::Autosave { .. } => "email_builder:autosave",
            OutboundEvent::Preview { .. } => "email_builder:preview",
            OutboundEvent::Upload(_) => "email_builder:upload",
        }
    }
}

/// Host → editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum InboundEvent {
    #[serde(rename = "email_builder:upload_complete")]
    UploadComplete { url: String },

    #[serde(rename = "email_builder:upload_error")]
    UploadFailed { error: String },

    #[serde(rename = "email_builder:preview_html")]
    PreviewHtml { html: String },
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Mimetype {mimetype} does not match file extension {extension}")]
    MimeMismatch { mimetype: String, extension: String },

    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Image is empty")]
    Empty,

    #[error("Image is {size_kb}KB, maximum is {max_kb}KB")]
    TooLarge { size_kb: usize, max_kb: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUpload {
    pub filename: String,
    pub mimetype: String,
    /// Raw base64, or a `data:` URL as produced by a browser file reader
    pub base64: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub filename: String,
    pub format: &'static str,
    pub bytes: Vec<u8>,
}

/// `jpg` and `jpeg` name the same format
fn canonical_format(name: &str) -> Option<&'static str> {
    let name = name.to_ascii_lowercase();
    let name = if name == "jpg" { "jpeg".to_string() } else { name };
    IMAGE_FORMATS.iter().copied().find(|f| *f == name)
}

impl ImageUpload {
    pub fn from_bytes(filename: impl Into<String>, mimetype: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            filename: filename.into(),
            mimetype: mimetype.into(),
            base64: STANDARD.encode(bytes),
        }
    }

    /// Check format and size against the catalog and decode the payload
    pub fn decode(&self) -> Result<DecodedImage, UploadError> {
        let extension = self
            .filename
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or_default();
        let from_extension = canonical_format(extension)
            .ok_or_else(|| UploadError::UnsupportedFormat(self.filename.clone()))?;
        let from_mimetype = self
            .mimetype
            .strip_prefix("image/")
            .and_then(canonical_format)
            .ok_or_else(|| UploadError::UnsupportedFormat(self.mimetype.clone()))?;

        if from_extension != from_mimetype {
            return Err(UploadError::MimeMismatch {
                mimetype: self.mimetype.clone(),
                extension: extension.to_string(),
            });
        }

        let payload = match self.base64.split_once(";base64,") {
            Some((prefix, data)) if prefix.starts_with("data:") => data,
            _ => self.base64.as_str(),
        };
        let bytes = STANDARD.decode(payload.trim())?;

        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        let size_kb = bytes.len().div_ceil(1024);
        if size_kb > MAX_IMAGE_SIZE_KB {
            return Err(UploadError::TooLarge { size_kb, max_kb: MAX_IMAGE_SIZE_KB });
        }

        Ok(DecodedImage {
            filename: self.filename.clone(),
            format: from_extension,
            bytes,
        })
    }
}
