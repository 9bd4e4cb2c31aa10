//! Flattening of absolute paths into a single cache path segment
//!
//! The encoding is one-way: nothing in demand ever decodes a segment.
//! Store the original path next to the artifact if that is ever needed.

use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::{OsStrExt, OsStringExt};

/// Character standing in for `/` in an escaped segment
const SEPARATOR_STAND_IN: u8 = b'_';

/// Escape an absolute path into a segment that contains no `/` or NUL
/// and never starts with `.`.
pub fn escape_path(path: &OsStr) -> OsString {
    let mut bytes = path.as_bytes();
    if bytes.len() > 1 && bytes.ends_with(b"/") {
        bytes = &bytes[..bytes.len() - 1];
    }

    let mut out = Vec::with_capacity(bytes.len() + 8);
    for &b in bytes {
        match b {
            b'%' => push_token(&mut out, b),
            0 => push_token(&mut out, b),
            SEPARATOR_STAND_IN => push_token(&mut out, b),
            b'/' => out.push(SEPARATOR_STAND_IN),
            b' ' | b'\n' => push_token(&mut out, b),
            _ => out.push(b),
        }
    }

    if out.first() == Some(&b'.') {
        let mut unhidden = b"%2E".to_vec();
        unhidden.extend_from_slice(&out[1..]);
        out = unhidden;
    }

    OsString::from_vec(out)
}

fn push_token(out: &mut Vec<u8>, b: u8) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    out.push(b'%');
    out.push(HEX[(b >> 4) as usize]);
    out.push(HEX[(b & 0x0f) as usize]);
}
