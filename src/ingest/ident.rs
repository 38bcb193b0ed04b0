//! SHA-256 identifier mint.

use sha2::{Digest, Sha256};

use super::types::{Level, SourceLocator};

/// Lowercase hex of the SHA-256 digest of `input`, truncated to `len` chars.
pub fn sha256_hex(input: &str, len: usize) -> String {
    let digest: [u8; 32] = Sha256::digest(input.as_bytes()).into();
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    hex[..len.min(hex.len())].to_string()
}

/// Stable component id: 12 hex chars over `(context, locator, level)`.
pub fn component_id(context: &str, locator: &SourceLocator, level: Level) -> String {
    let seed = match locator {
        SourceLocator::Key(key) => format!("{context}.{key}.{level}"),
        SourceLocator::Index(i) => format!("{context}[{i}].{level}"),
    };
    sha256_hex(&seed, 12)
}

/// 8 hex chars over a value's serialised text.
pub fn value_fingerprint(serialised: &str) -> String {
    sha256_hex(serialised, 8)
}

/// 16 hex chars derived from a key and its context, used for imputed ids.
pub fn imputed_token(key: &str, context: &str) -> String {
    sha256_hex(&format!("auto_filled_{key}_{context}"), 16)
}
