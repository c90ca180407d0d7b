//! PKCS#7 padding to the AES block size.

use crate::block::BLOCK_BYTES;
use crate::error::{Error, Result};

/// Appends `n` bytes of value `n` so the length becomes a multiple of 16.
///
/// `n` is always in `1..=16`: aligned input receives a full padding block.
pub fn pad(data: &[u8]) -> Vec<u8> {
    let n = BLOCK_BYTES - data.len() % BLOCK_BYTES;
    let mut out = Vec::with_capacity(data.len() + n);
    out.extend_from_slice(data);
    out.resize(data.len() + n, n as u8);
    out
}

fn pad_len(data: &[u8]) -> Option<usize> {
    let n = usize::from(*data.last()?);
    if n == 0 || n > BLOCK_BYTES || n > data.len() {
        return None;
    }
    data[data.len() - n..]
        .iter()
        .all(|&b| usize::from(b) == n)
        .then_some(n)
}

/// Strips PKCS#7 padding, failing with [`Error::InvalidPadding`] if it is malformed.
pub fn unpad(data: &[u8]) -> Result<&[u8]> {
    let n = pad_len(data).ok_or(Error::InvalidPadding)?;
    Ok(&data[..data.len() - n])
}

/// Strips PKCS#7 padding if present and returns the input unchanged otherwise.
///
/// This never reports corruption and is kept only for compatibility with
/// ciphertexts produced by tools that did the same; prefer [`unpad`].
pub fn unpad_lenient(data: &[u8]) -> &[u8] {
    match pad_len(data) {
        Some(n) => &data[..data.len() - n],
        None => data,
    }
}
