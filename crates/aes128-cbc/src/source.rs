//! Random byte sources for key and IV generation.

use rand::{CryptoRng, RngCore};

use crate::block::{Block, BLOCK_BYTES};
use crate::key::{Aes128Key, KEY_BYTES};

/// Supplies random bytes for key material.
///
/// Implemented for every cryptographically secure `rand` generator, so
/// `rand::rngs::OsRng` or a seeded `ChaCha20Rng` can be passed directly.
pub trait ByteSource {
    /// Fills `buf` entirely with random bytes.
    fn fill(&mut self, buf: &mut [u8]);
}

impl<R: RngCore + CryptoRng + ?Sized> ByteSource for R {
    fn fill(&mut self, buf: &mut [u8]) {
        self.fill_bytes(buf);
    }
}

/// Draws a fresh AES-128 key.
pub fn generate_key<S: ByteSource + ?Sized>(source: &mut S) -> Aes128Key {
    let mut bytes = [0u8; KEY_BYTES];
    source.fill(&mut bytes);
    Aes128Key::from(bytes)
}

/// Draws a fresh initialization vector. Never reuse one under the same key.
pub fn generate_iv<S: ByteSource + ?Sized>(source: &mut S) -> Block {
    let mut iv = [0u8; BLOCK_BYTES];
    source.fill(&mut iv);
    iv
}
