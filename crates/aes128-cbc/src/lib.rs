//! AES-128 with CBC chaining and PKCS#7 padding.
//!
//! The crate follows FIPS-197 for the block cipher and NIST SP 800-38A for the
//! chaining mode and provides:
//! - GF(2^8) arithmetic and the fixed S-box / Rcon tables.
//! - Key schedule for AES-128 and single-block encryption and decryption.
//! - PKCS#7 padding and CBC encryption/decryption over byte slices.
//! - An injectable [`Tracer`] that observes every intermediate state.
//! - Key and IV generation from any [`ByteSource`] and raw key persistence.
//!
//! The implementation aims for clarity and testability rather than constant-time
//! guarantees; it should not be treated as side-channel hardened.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod block;
mod cbc;
mod cipher;
mod error;
pub mod gf;
mod key;
pub mod keystore;
mod padding;
mod round;
mod sbox;
mod source;
pub mod trace;

pub use crate::block::{block_from_slice, xor_in_place, Block, BLOCK_BYTES};
pub use crate::cbc::{cbc_decrypt, cbc_encrypt, Aes128Cbc};
pub use crate::cipher::{
    decrypt_block, decrypt_block_with, encrypt_block, encrypt_block_with, expand_key, ROUNDS,
};
pub use crate::error::{Error, Result};
pub use crate::key::{Aes128Key, RoundKeys, KEY_BYTES};
pub use crate::padding::{pad, unpad, unpad_lenient};
pub use crate::round::{
    add_round_key, inv_mix_columns, inv_shift_rows, inv_sub_bytes, mix_columns, shift_rows,
    sub_bytes,
};
pub use crate::sbox::{inv_sbox, sbox, INV_SBOX, RCON, SBOX};
pub use crate::source::{generate_iv, generate_key, ByteSource};
pub use crate::trace::{Direction, LogTracer, NoTrace, Operation, TraceEvent, Tracer};
