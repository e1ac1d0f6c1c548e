//! Hashing - SHA-256 Content Hashes for Saved Templates
//!
//! The document hash covers the canonical JSON form, so key order and
//! whitespace never change it. The markup hash covers the exact MJML bytes.

use serde::Serialize;
use serde_json::{to_string, Value};
use sha2::{Digest, Sha256};

use crate::document::Template;

/// Compute SHA-256 hash of bytes, return lowercase hex
pub fn sha256_hex(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Convert to canonical JSON (sorted keys, no whitespace)
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let v: Value = serde_json::to_value(value)?;
    to_string(&sort_value(&v))
}

fn sort_value(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_value(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_value).collect()),
        _ => v.clone(),
    }
}

/// Hash of the template's canonical JSON
pub fn compute_document_hash(template: &Template) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(template)?;
    Ok(sha256_hex(canonical.as_bytes()))
}

/// Hash of compiled MJML
pub fn compute_markup_hash(mjml: &str) -> String {
    sha256_hex(mjml.as_bytes())
}
