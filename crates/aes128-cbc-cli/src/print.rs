//! Console tracer reproducing the step-by-step walkthrough output.

use std::io::{self, Write};

use aes128_cbc::trace::StateMatrix;
use aes128_cbc::{Block, Direction, TraceEvent, Tracer};

/// Writes every trace event to `out` as human-readable state matrices.
///
/// Write failures are remembered and returned by [`PrintTracer::finish`].
pub struct PrintTracer<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> PrintTracer<W> {
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    /// Flushes the writer and reports the first write error, if any.
    pub fn finish(mut self) -> io::Result<()> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()
    }

    fn matrix(&mut self, title: &str, state: &Block) -> io::Result<()> {
        writeln!(self.out, "{title}:")?;
        writeln!(self.out, "{}", StateMatrix(state))?;
        writeln!(self.out)
    }

    fn write_event(&mut self, event: &TraceEvent<'_>) -> io::Result<()> {
        match *event {
            TraceEvent::KeySchedule(keys) => {
                writeln!(self.out, "Expanded key schedule:")?;
                for key in keys.iter() {
                    writeln!(self.out, "{}", spaced(key))?;
                }
                writeln!(self.out)
            }
            TraceEvent::BlockInput { direction, state } => {
                let title = match direction {
                    Direction::Encrypt => "Initial state",
                    Direction::Decrypt => "Initial state (encrypted)",
                };
                self.matrix(title, state)
            }
            TraceEvent::Step {
                round,
                operation,
                state,
                ..
            } => self.matrix(&format!("After {operation} (round {round})"), state),
            TraceEvent::RoundKey {
                direction,
                round,
                key,
            } => {
                writeln!(self.out, "Round key {round} ({direction}):")?;
                for word in key.chunks_exact(4) {
                    writeln!(self.out, "{}", spaced(word))?;
                }
                writeln!(self.out)
            }
            TraceEvent::Chained {
                direction,
                index,
                block,
            } => {
                let title = match direction {
                    Direction::Encrypt => format!("Block {index} after XOR with previous ciphertext"),
                    Direction::Decrypt => format!("Block {index} plaintext after XOR"),
                };
                self.matrix(&title, block)
            }
        }
    }
}

impl<W: Write> Tracer for PrintTracer<W> {
    fn trace(&mut self, event: &TraceEvent<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.write_event(event) {
            self.error = Some(err);
        }
    }
}

fn spaced(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}
