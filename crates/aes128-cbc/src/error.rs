//! Error taxonomy shared by the cipher and key persistence.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Key material was not exactly 16 bytes.
    #[error("AES-128 key must be 16 bytes, got {actual}")]
    InvalidKeyLength {
        /// Length that was supplied.
        actual: usize,
    },
    /// A block (or IV) was not exactly 16 bytes.
    #[error("block must be 16 bytes, got {actual}")]
    InvalidBlockLength {
        /// Length that was supplied.
        actual: usize,
    },
    /// Ciphertext length was zero or not a multiple of the block size.
    #[error("ciphertext length must be a positive multiple of 16, got {actual}")]
    InvalidCiphertextLength {
        /// Length that was supplied.
        actual: usize,
    },
    /// The trailing PKCS#7 padding was malformed.
    #[error("invalid padding")]
    InvalidPadding,
    /// Reading or writing a key file failed.
    #[error("key file {}: {source}", .path.display())]
    Io {
        /// File that was being accessed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Returns `true` for failures caused by key persistence rather than the cipher.
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io { .. })
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
