//! Key types for AES-128.

use std::fmt;

use crate::block::{Block, BLOCK_BYTES};
use crate::error::{Error, Result};

/// Size of an AES-128 key in bytes.
pub const KEY_BYTES: usize = 16;

/// Number of round keys produced by the AES-128 key schedule.
pub(crate) const ROUND_KEYS: usize = 11;

/// Total size of the expanded key schedule in bytes.
pub(crate) const SCHEDULE_BYTES: usize = ROUND_KEYS * BLOCK_BYTES;

/// AES-128 key wrapper.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Aes128Key(pub [u8; KEY_BYTES]);

impl Aes128Key {
    /// Raw key bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; KEY_BYTES] {
        &self.0
    }
}

impl From<[u8; KEY_BYTES]> for Aes128Key {
    fn from(value: [u8; KEY_BYTES]) -> Self {
        Self(value)
    }
}

impl TryFrom<&[u8]> for Aes128Key {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        <[u8; KEY_BYTES]>::try_from(bytes)
            .map(Self)
            .map_err(|_| Error::InvalidKeyLength {
                actual: bytes.len(),
            })
    }
}

// Key bytes stay out of logs.
impl fmt::Debug for Aes128Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Aes128Key(..)")
    }
}

/// Expanded round keys for AES-128.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RoundKeys(pub [Block; ROUND_KEYS]);

impl RoundKeys {
    /// Returns the round key at the requested index (0..=10).
    #[inline]
    pub fn get(&self, round: usize) -> &Block {
        &self.0[round]
    }

    /// Splits a flat 176-byte schedule into round keys.
    pub(crate) fn from_schedule(bytes: &[u8; SCHEDULE_BYTES]) -> Self {
        Self(std::array::from_fn(|round| {
            let mut key = [0u8; BLOCK_BYTES];
            key.copy_from_slice(&bytes[round * BLOCK_BYTES..(round + 1) * BLOCK_BYTES]);
            key
        }))
    }

    /// Returns the schedule as one contiguous 176-byte array.
    pub fn to_bytes(&self) -> [u8; SCHEDULE_BYTES] {
        let mut out = [0u8; SCHEDULE_BYTES];
        for (chunk, key) in out.chunks_exact_mut(BLOCK_BYTES).zip(self.0.iter()) {
            chunk.copy_from_slice(key);
        }
        out
    }

    /// Iterates over the round keys in schedule order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Block> {
        self.0.iter()
    }
}

impl fmt::Debug for RoundKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RoundKeys(..)")
    }
}
