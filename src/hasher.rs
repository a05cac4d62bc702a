use md5::{Digest, Md5};
use sha2::Sha256;

/// Identity hash for one statement row: MD5 over the ordered field values
/// joined with commas, hex-encoded. The input is positional, so column order
/// is part of the identity — reordering columns changes every hash.
pub fn row_hash(values: &[String]) -> String {
    let mut hasher = Md5::new();
    hasher.update(values.join(",").as_bytes());
    hex::encode(hasher.finalize())
}

/// SHA-256 checksum of a whole statement file, for batch-level duplicate
/// detection.
pub fn file_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
