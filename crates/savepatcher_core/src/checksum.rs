use std::fmt::Write as _;

use md5::{Digest, Md5};

pub const DIGEST_LEN: usize = 16;

pub fn md5_digest(bytes: &[u8]) -> [u8; DIGEST_LEN] {
    let digest = Md5::digest(bytes);
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&digest);
    out
}

/// Lowercase hex, two digits per byte.
pub fn format_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}
