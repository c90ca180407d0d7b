//! Block representation helpers.

use crate::error::{Error, Result};

/// Size of an AES block in bytes.
pub const BLOCK_BYTES: usize = 16;

/// AES block of 16 bytes in column-major order: `state[col * 4 + row]`.
pub type Block = [u8; BLOCK_BYTES];

/// XORs two blocks, writing the result into `dst`.
#[inline]
pub fn xor_in_place(dst: &mut Block, rhs: &Block) {
    for (d, r) in dst.iter_mut().zip(rhs.iter()) {
        *d ^= *r;
    }
}

/// Copies a 16-byte slice into a [`Block`].
pub fn block_from_slice(bytes: &[u8]) -> Result<Block> {
    Block::try_from(bytes).map_err(|_| Error::InvalidBlockLength {
        actual: bytes.len(),
    })
}
