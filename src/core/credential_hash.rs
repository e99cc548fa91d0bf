//! API key fingerprints.
//!
//! Keys never appear in logs. Anything that needs to say *which* key was used
//! (or whether a key changed) logs a short SHA-256 fingerprint instead.

use sha2::{Digest, Sha256};

/// Placeholder fingerprint for an empty key.
pub const EMPTY_FINGERPRINT: &str = "none";

/// Short, stable fingerprint of an API key (first 8 bytes of SHA-256, hex).
#[must_use]
pub fn fingerprint(api_key: &str) -> String {
    let key = api_key.trim();
    if key.is_empty() {
        return EMPTY_FINGERPRINT.to_string();
    }
    let digest = Sha256::digest(key.as_bytes());
    hex::encode(&digest[..8])
}

/// How a stored key changed on update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyChange {
    Added,
    Removed,
    Replaced,
    Unchanged,
}

impl KeyChange {
    /// Compare two raw keys without keeping either around.
    #[must_use]
    pub fn between(old: &str, new: &str) -> Self {
        match (old.trim().is_empty(), new.trim().is_empty()) {
            (true, true) => Self::Unchanged,
            (true, false) => Self::Added,
            (false, true) => Self::Removed,
            (false, false) if fingerprint(old) == fingerprint(new) => Self::Unchanged,
            (false, false) => Self::Replaced,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Replaced => "replaced",
            Self::Unchanged => "unchanged",
        }
    }
}
