//! Hashing System - SHA-256 for Quotes and Attachments
//!
//! A quote fingerprint lets the shop match the emailed summary to the price
//! the customer was shown.

use sha2::{Sha256, Digest};
use serde::Serialize;
use serde_json::{json, Value, to_string};

use crate::pricing::PriceQuote;
use crate::print::PrintOptions;

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}

/// Convert to canonical JSON (sorted keys, no whitespace)
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let v: Value = serde_json::to_value(value)?;
    let sorted = sort_value(&v);
    to_string(&sorted)
}

fn sort_value(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut sorted: Vec<_> = map.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));
            let sorted_map: serde_json::Map<String, Value> = sorted
                .into_iter()
                .map(|(k, v)| (k.clone(), sort_value(v)))
                .collect();
            Value::Object(sorted_map)
        }
        Value::Array(arr) => {
            Value::Array(arr.iter().map(sort_value).collect())
        }
        _ => v.clone()
    }
}

/// quote_fingerprint = sha256(canonical {options, quote})
pub fn quote_fingerprint(options: &PrintOptions, quote: &PriceQuote) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(&json!({
        "options": options,
        "quote": quote,
    }))?;
    Ok(sha256_hex(canonical.as_bytes()))
}

/// Lowercase hex, two digits per byte.
mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}
