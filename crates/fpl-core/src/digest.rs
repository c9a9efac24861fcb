//! SHA-256 digests of backtest inputs, recorded in artifacts so a report
//! can be tied to the exact plan and stats files it came from.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::domain::Result;

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

pub fn file_sha256(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(sha256_hex(&bytes))
}
