//! Observation hook for intermediate cipher states.
//!
//! Every block transform accepts a [`Tracer`] that is told about the key
//! schedule, the state after each primitive, and each round key as it is
//! consumed. [`NoTrace`] compiles away entirely; [`LogTracer`] forwards events
//! to `tracing` at TRACE level under the `aes128_cbc::trace` target.

use std::fmt;

use crate::block::Block;
use crate::key::RoundKeys;

/// Which way the cipher is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Encryption.
    Encrypt,
    /// Decryption.
    Decrypt,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Encrypt => f.write_str("encryption"),
            Direction::Decrypt => f.write_str("decryption"),
        }
    }
}

/// Round primitive that produced a traced state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    /// SubBytes.
    SubBytes,
    /// ShiftRows.
    ShiftRows,
    /// MixColumns.
    MixColumns,
    /// AddRoundKey.
    AddRoundKey,
    /// InvSubBytes.
    InvSubBytes,
    /// InvShiftRows.
    InvShiftRows,
    /// InvMixColumns.
    InvMixColumns,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::SubBytes => "SubBytes",
            Operation::ShiftRows => "ShiftRows",
            Operation::MixColumns => "MixColumns",
            Operation::AddRoundKey => "AddRoundKey",
            Operation::InvSubBytes => "InvSubBytes",
            Operation::InvShiftRows => "InvShiftRows",
            Operation::InvMixColumns => "InvMixColumns",
        };
        f.write_str(name)
    }
}

/// A single observable step.
#[derive(Clone, Copy, Debug)]
pub enum TraceEvent<'a> {
    /// Round keys about to be used for a CBC session.
    KeySchedule(&'a RoundKeys),
    /// State entering a block transform.
    BlockInput {
        /// Cipher direction.
        direction: Direction,
        /// Input state.
        state: &'a Block,
    },
    /// State after a primitive was applied.
    Step {
        /// Cipher direction.
        direction: Direction,
        /// Round number (0..=10).
        round: usize,
        /// Primitive that was applied.
        operation: Operation,
        /// Resulting state.
        state: &'a Block,
    },
    /// Round key consumed by AddRoundKey.
    RoundKey {
        /// Cipher direction.
        direction: Direction,
        /// Round number (0..=10).
        round: usize,
        /// Round key bytes.
        key: &'a Block,
    },
    /// Result of the CBC feedback XOR for the block at `index`.
    ///
    /// On encryption this is the block fed to the cipher; on decryption it is
    /// the recovered plaintext block.
    Chained {
        /// Cipher direction.
        direction: Direction,
        /// Zero-based block index within the message.
        index: usize,
        /// Block after the XOR.
        block: &'a Block,
    },
}

/// Receives [`TraceEvent`]s from the cipher.
pub trait Tracer {
    /// Called once per event, in execution order.
    fn trace(&mut self, event: &TraceEvent<'_>);
}

impl<T: Tracer + ?Sized> Tracer for &mut T {
    #[inline]
    fn trace(&mut self, event: &TraceEvent<'_>) {
        (**self).trace(event);
    }
}

/// Tracer that discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTrace;

impl Tracer for NoTrace {
    #[inline(always)]
    fn trace(&mut self, _event: &TraceEvent<'_>) {}
}

/// Tracer that emits events through `tracing` at TRACE level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogTracer;

impl Tracer for LogTracer {
    fn trace(&mut self, event: &TraceEvent<'_>) {
        match *event {
            TraceEvent::KeySchedule(keys) => {
                tracing::trace!(target: "aes128_cbc::trace", schedule = %hex::encode(keys.to_bytes()), "expanded key schedule");
            }
            TraceEvent::BlockInput { direction, state } => {
                tracing::trace!(target: "aes128_cbc::trace", %direction, state = %hex::encode(state), "block input");
            }
            TraceEvent::Step {
                direction,
                round,
                operation,
                state,
            } => {
                tracing::trace!(target: "aes128_cbc::trace", %direction, round, %operation, state = %hex::encode(state), "step");
            }
            TraceEvent::RoundKey {
                direction,
                round,
                key,
            } => {
                tracing::trace!(target: "aes128_cbc::trace", %direction, round, key = %hex::encode(key), "round key");
            }
            TraceEvent::Chained {
                direction,
                index,
                block,
            } => {
                tracing::trace!(target: "aes128_cbc::trace", %direction, index, block = %hex::encode(block), "chained block");
            }
        }
    }
}

/// Displays a block as the 4x4 state matrix, one row per line.
pub struct StateMatrix<'a>(pub &'a Block);

impl fmt::Display for StateMatrix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..4 {
            for col in 0..4 {
                if col > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{:02x}", self.0[col * 4 + row])?;
            }
            if row < 3 {
                f.write_str("\n")?;
            }
        }
        Ok(())
    }
}
