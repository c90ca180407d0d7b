//! Raw key persistence.
//!
//! A key file holds exactly the 16 key bytes with no header. Any failure to
//! read or write it, including a file of the wrong size, is reported as
//! [`Error::Io`] so callers can tell storage problems apart from cipher errors.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::key::{Aes128Key, KEY_BYTES};

/// Default file name used by the original tooling.
pub const DEFAULT_KEY_FILE: &str = "aes_key.bin";

fn io_error(path: &Path, source: io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Writes `key` to `path`, creating parent directories as needed.
pub fn save_key(path: &Path, key: &Aes128Key) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_error(path, e))?;
    }
    fs::write(path, key.as_bytes()).map_err(|e| io_error(path, e))?;
    debug!("saved key to {}", path.display());
    Ok(())
}

/// Reads a key previously written by [`save_key`].
pub fn load_key(path: &Path) -> Result<Aes128Key> {
    debug!("loading key from {}", path.display());
    let bytes = fs::read(path).map_err(|e| io_error(path, e))?;
    if bytes.len() != KEY_BYTES {
        let kind = if bytes.len() < KEY_BYTES {
            io::ErrorKind::UnexpectedEof
        } else {
            io::ErrorKind::InvalidData
        };
        return Err(io_error(
            path,
            io::Error::new(
                kind,
                format!("expected {KEY_BYTES} key bytes, found {}", bytes.len()),
            ),
        ));
    }
    let mut key = [0u8; KEY_BYTES];
    key.copy_from_slice(&bytes);
    Ok(Aes128Key::from(key))
}
