//! AES-128 key schedule and block encryption/decryption.

use crate::block::Block;
use crate::key::{Aes128Key, RoundKeys, KEY_BYTES, SCHEDULE_BYTES};
use crate::round::{
    add_round_key, inv_mix_columns, inv_shift_rows, inv_sub_bytes, mix_columns, shift_rows,
    sub_bytes,
};
use crate::sbox::{sbox, RCON};
use crate::trace::{Direction, NoTrace, Operation, TraceEvent, Tracer};

/// Number of rounds for AES-128.
pub const ROUNDS: usize = 10;

fn rot_word(word: [u8; 4]) -> [u8; 4] {
    [word[1], word[2], word[3], word[0]]
}

fn sub_word(word: [u8; 4]) -> [u8; 4] {
    word.map(sbox)
}

/// Expands a 128-bit key into 11 round keys.
pub fn expand_key(key: &Aes128Key) -> RoundKeys {
    let mut schedule = [0u8; SCHEDULE_BYTES];
    schedule[..KEY_BYTES].copy_from_slice(key.as_bytes());

    let mut rcon_index = 1;
    for offset in (KEY_BYTES..SCHEDULE_BYTES).step_by(4) {
        let mut temp = [
            schedule[offset - 4],
            schedule[offset - 3],
            schedule[offset - 2],
            schedule[offset - 1],
        ];
        if offset % KEY_BYTES == 0 {
            temp = sub_word(rot_word(temp));
            temp[0] ^= RCON[rcon_index];
            rcon_index += 1;
        }
        for (j, t) in temp.iter().enumerate() {
            schedule[offset + j] = schedule[offset - KEY_BYTES + j] ^ t;
        }
    }

    RoundKeys::from_schedule(&schedule)
}

struct Run<'t, T: ?Sized> {
    direction: Direction,
    tracer: &'t mut T,
}

impl<T: Tracer + ?Sized> Run<'_, T> {
    #[inline]
    fn apply(&mut self, state: &mut Block, round: usize, operation: Operation, f: fn(&mut Block)) {
        f(state);
        self.tracer.trace(&TraceEvent::Step {
            direction: self.direction,
            round,
            operation,
            state: &*state,
        });
    }

    #[inline]
    fn add_key(&mut self, state: &mut Block, round_keys: &RoundKeys, round: usize) {
        let key = round_keys.get(round);
        add_round_key(state, key);
        self.tracer.trace(&TraceEvent::Step {
            direction: self.direction,
            round,
            operation: Operation::AddRoundKey,
            state: &*state,
        });
        self.tracer.trace(&TraceEvent::RoundKey {
            direction: self.direction,
            round,
            key,
        });
    }
}

/// Encrypts a single 16-byte block with pre-expanded round keys.
pub fn encrypt_block(block: &Block, round_keys: &RoundKeys) -> Block {
    encrypt_block_with(block, round_keys, &mut NoTrace)
}

/// Encrypts a single block, reporting every intermediate state to `tracer`.
pub fn encrypt_block_with<T: Tracer + ?Sized>(
    block: &Block,
    round_keys: &RoundKeys,
    tracer: &mut T,
) -> Block {
    let mut state = *block;
    tracer.trace(&TraceEvent::BlockInput {
        direction: Direction::Encrypt,
        state: &state,
    });
    let mut run = Run {
        direction: Direction::Encrypt,
        tracer,
    };

    run.add_key(&mut state, round_keys, 0);

    for round in 1..ROUNDS {
        run.apply(&mut state, round, Operation::SubBytes, sub_bytes);
        run.apply(&mut state, round, Operation::ShiftRows, shift_rows);
        run.apply(&mut state, round, Operation::MixColumns, mix_columns);
        run.add_key(&mut state, round_keys, round);
    }

    // The final round has no MixColumns.
    run.apply(&mut state, ROUNDS, Operation::SubBytes, sub_bytes);
    run.apply(&mut state, ROUNDS, Operation::ShiftRows, shift_rows);
    run.add_key(&mut state, round_keys, ROUNDS);

    state
}

/// Decrypts a single 16-byte block with pre-expanded round keys.
pub fn decrypt_block(block: &Block, round_keys: &RoundKeys) -> Block {
    decrypt_block_with(block, round_keys, &mut NoTrace)
}

/// Decrypts a single block, reporting every intermediate state to `tracer`.
pub fn decrypt_block_with<T: Tracer + ?Sized>(
    block: &Block,
    round_keys: &RoundKeys,
    tracer: &mut T,
) -> Block {
    let mut state = *block;
    tracer.trace(&TraceEvent::BlockInput {
        direction: Direction::Decrypt,
        state: &state,
    });
    let mut run = Run {
        direction: Direction::Decrypt,
        tracer,
    };

    run.add_key(&mut state, round_keys, ROUNDS);
    run.apply(&mut state, ROUNDS, Operation::InvShiftRows, inv_shift_rows);
    run.apply(&mut state, ROUNDS, Operation::InvSubBytes, inv_sub_bytes);

    for round in (1..ROUNDS).rev() {
        run.add_key(&mut state, round_keys, round);
        run.apply(&mut state, round, Operation::InvMixColumns, inv_mix_columns);
        run.apply(&mut state, round, Operation::InvShiftRows, inv_shift_rows);
        run.apply(&mut state, round, Operation::InvSubBytes, inv_sub_bytes);
    }

    run.add_key(&mut state, round_keys, 0);

    state
}
