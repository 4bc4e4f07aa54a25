//! Cache key derivation.
//!
//! A key is `{namespace}:{resource}:{name=value&...}` with parameters sorted by
//! name. Every byte outside `[A-Za-z0-9._-]` is percent-encoded, so the `:`,
//! `=` and `&` delimiters can only come from the key structure itself.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

/// Parameter sections longer than this are replaced by their SHA-256 digest.
pub const MAX_PARAMS_LEN: usize = 200;

/// Semantic parameters of a cached query, independent of insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryKey {
    resource: String,
    params: BTreeMap<String, String>,
}

impl QueryKey {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add a named parameter. A repeated name keeps the last value.
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    /// Parameters rendered as `name=value` pairs, sorted by name and joined by `&`.
    pub fn canonical_params(&self) -> String {
        self.params
            .iter()
            .map(|(name, value)| format!("{}={}", encode(name), encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Render the full store key under `namespace`.
    pub fn render(&self, namespace: &str) -> String {
        let params = self.canonical_params();
        let params = if params.len() > MAX_PARAMS_LEN {
            format!("h={}", digest(&params))
        } else {
            params
        };
        format!("{}{}", Self::resource_prefix(namespace, &self.resource), params)
    }

    /// Prefix shared by every key of `resource`, for bulk invalidation.
    pub fn resource_prefix(namespace: &str, resource: &str) -> String {
        format!("{}:{}:", encode(namespace), encode(resource))
    }
}

fn encode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'_' | b'-') {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

fn digest(canonical: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}
