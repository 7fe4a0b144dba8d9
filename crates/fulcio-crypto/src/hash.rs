//! Digest helpers backed by aws-lc-rs

use aws_lc_rs::digest::{self, SHA256, SHA384, SHA512};

/// SHA-256 digest of `data`
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(digest::digest(&SHA256, data).as_ref());
    out
}

/// SHA-384 digest of `data`
pub fn sha384(data: &[u8]) -> [u8; 48] {
    let mut out = [0u8; 48];
    out.copy_from_slice(digest::digest(&SHA384, data).as_ref());
    out
}

/// SHA-512 digest of `data`
pub fn sha512(data: &[u8]) -> [u8; 64] {
    let mut out = [0u8; 64];
    out.copy_from_slice(digest::digest(&SHA512, data).as_ref());
    out
}
