//! Body checksum: canonical value concatenation digested with MD5
//!
//! The bank recomputes this digest on its side, so the canonical string has
//! to match its reference implementation byte for byte:
//!
//! - fields are visited in insertion order, the top-level `checksum` is skipped
//! - only values contribute, keys never do
//! - lists of records contribute every record's field values, recursively
//! - lists of anything else contribute each element in order
//! - nested records contribute their field values, recursively
//! - `null` contributes nothing but keeps its place
//! - the concatenation is trimmed once, at the very end

pub mod node;

pub use node::{Node, Scalar};

use crate::error::{CorpayError, Result};
use md5::{Digest, Md5};
use serde_json::Value;

/// Reserved field holding the digest of every other field
pub const CHECKSUM_FIELD: &str = "checksum";

impl Node {
    /// Canonical string of a body. Non-record bodies canonicalize to "".
    pub fn canonical_string(&self) -> String {
        let Node::Record(fields) = self else {
            return String::new();
        };

        let mut out = String::new();
        for (key, value) in fields {
            if key == CHECKSUM_FIELD {
                continue;
            }
            append_value(value, &mut out);
        }
        out.trim().to_string()
    }

    /// Lowercase hex MD5 of the canonical string
    pub fn checksum(&self) -> String {
        md5_hex(&self.canonical_string())
    }
}

fn append_value(value: &Node, out: &mut String) {
    match value {
        Node::Null => {}
        Node::Scalar(s) => out.push_str(&s.render()),
        Node::List(items) => match items.first() {
            Some(Node::Record(_)) => {
                for item in items {
                    match item {
                        Node::Record(fields) => {
                            for (_, v) in fields {
                                append_value(v, out);
                            }
                        }
                        other => append_value(other, out),
                    }
                }
            }
            _ => {
                for item in items {
                    append_value(item, out);
                }
            }
        },
        Node::Record(fields) => {
            for (_, v) in fields {
                append_value(v, out);
            }
        }
    }
}

fn md5_hex(canonical: &str) -> String {
    hex::encode(Md5::digest(canonical.as_bytes()))
}

/// Canonical string for a JSON body
pub fn canonicalize(body: &Value) -> String {
    Node::from(body).canonical_string()
}

/// Checksum for a JSON body, ignoring any `checksum` already present
pub fn digest(body: &Value) -> String {
    md5_hex(&canonicalize(body))
}

/// True when the body carries a non-empty checksum matching its contents
pub fn verify(body: &Value) -> bool {
    let stored = match body.get(CHECKSUM_FIELD) {
        Some(Value::String(s)) if !s.is_empty() => s,
        _ => return false,
    };
    digest(body).eq_ignore_ascii_case(stored)
}

/// Like [`verify`], but as an error for `?` propagation
pub fn ensure(body: &Value) -> Result<()> {
    if verify(body) {
        Ok(())
    } else {
        Err(CorpayError::ChecksumMismatch)
    }
}

/// Compute the checksum and store it in the body.
///
/// An existing `checksum` field keeps its position; otherwise the field is
/// appended last.
pub fn inject(body: &mut Value) -> Result<String> {
    let sum = digest(body);
    let map = body.as_object_mut().ok_or(CorpayError::MalformedPayload)?;
    map.insert(CHECKSUM_FIELD.to_string(), Value::String(sum.clone()));
    Ok(sum)
}
