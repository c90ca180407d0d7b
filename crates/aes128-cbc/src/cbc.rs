//! Cipher block chaining over byte slices.

use std::iter;

use tracing::debug;

use crate::block::{block_from_slice, xor_in_place, Block, BLOCK_BYTES};
use crate::cipher::{decrypt_block_with, encrypt_block_with, expand_key};
use crate::error::{Error, Result};
use crate::key::{Aes128Key, RoundKeys};
use crate::padding::{pad, unpad};
use crate::trace::{Direction, NoTrace, TraceEvent, Tracer};

/// AES-128-CBC session: the key schedule is expanded once and reused for
/// every block of every message.
#[derive(Clone)]
pub struct Aes128Cbc {
    round_keys: RoundKeys,
}

impl Aes128Cbc {
    /// Expands `key` into a new session.
    pub fn new(key: &Aes128Key) -> Self {
        Self {
            round_keys: expand_key(key),
        }
    }

    /// Round keys used by this session.
    pub fn round_keys(&self) -> &RoundKeys {
        &self.round_keys
    }

    /// Pads and encrypts `plaintext`. The output is a non-empty multiple of 16 bytes.
    pub fn encrypt(&self, plaintext: &[u8], iv: &Block) -> Vec<u8> {
        self.encrypt_with(plaintext, iv, &mut NoTrace)
    }

    /// [`encrypt`](Self::encrypt) with every intermediate state reported to `tracer`.
    pub fn encrypt_with<T: Tracer + ?Sized>(
        &self,
        plaintext: &[u8],
        iv: &Block,
        tracer: &mut T,
    ) -> Vec<u8> {
        let padded = pad(plaintext);
        debug!(
            plaintext_len = plaintext.len(),
            blocks = padded.len() / BLOCK_BYTES,
            "cbc encrypt"
        );
        tracer.trace(&TraceEvent::KeySchedule(&self.round_keys));

        let mut out = Vec::with_capacity(padded.len());
        let mut previous = *iv;
        for (index, chunk) in padded.chunks_exact(BLOCK_BYTES).enumerate() {
            let mut block = [0u8; BLOCK_BYTES];
            block.copy_from_slice(chunk);
            xor_in_place(&mut block, &previous);
            tracer.trace(&TraceEvent::Chained {
                direction: Direction::Encrypt,
                index,
                block: &block,
            });

            previous = encrypt_block_with(&block, &self.round_keys, &mut *tracer);
            out.extend_from_slice(&previous);
        }
        out
    }

    /// Decrypts and unpads `ciphertext`.
    ///
    /// Fails before touching any block if the length is not a positive
    /// multiple of 16, and with [`Error::InvalidPadding`] if the recovered
    /// padding is malformed (wrong key, wrong IV or corrupted data).
    pub fn decrypt(&self, ciphertext: &[u8], iv: &Block) -> Result<Vec<u8>> {
        self.decrypt_with(ciphertext, iv, &mut NoTrace)
    }

    /// [`decrypt`](Self::decrypt) with every intermediate state reported to `tracer`.
    pub fn decrypt_with<T: Tracer + ?Sized>(
        &self,
        ciphertext: &[u8],
        iv: &Block,
        tracer: &mut T,
    ) -> Result<Vec<u8>> {
        let padded = self.decrypt_unpadded_with(ciphertext, iv, tracer)?;
        let plaintext = unpad(&padded)?;
        Ok(plaintext.to_vec())
    }

    /// Decrypts without removing padding.
    pub fn decrypt_unpadded(&self, ciphertext: &[u8], iv: &Block) -> Result<Vec<u8>> {
        self.decrypt_unpadded_with(ciphertext, iv, &mut NoTrace)
    }

    /// [`decrypt_unpadded`](Self::decrypt_unpadded) with every intermediate state reported to `tracer`.
    pub fn decrypt_unpadded_with<T: Tracer + ?Sized>(
        &self,
        ciphertext: &[u8],
        iv: &Block,
        tracer: &mut T,
    ) -> Result<Vec<u8>> {
        check_ciphertext_len(ciphertext.len())?;
        debug!(blocks = ciphertext.len() / BLOCK_BYTES, "cbc decrypt");
        tracer.trace(&TraceEvent::KeySchedule(&self.round_keys));

        // Feedback comes from the original ciphertext, so each block only
        // depends on input that is already known.
        let previous = iter::once(&iv[..]).chain(ciphertext.chunks_exact(BLOCK_BYTES));

        let mut out = Vec::with_capacity(ciphertext.len());
        for (index, (chunk, prev)) in ciphertext
            .chunks_exact(BLOCK_BYTES)
            .zip(previous)
            .enumerate()
        {
            let mut input = [0u8; BLOCK_BYTES];
            input.copy_from_slice(chunk);
            let mut block = decrypt_block_with(&input, &self.round_keys, &mut *tracer);

            let mut feedback = [0u8; BLOCK_BYTES];
            feedback.copy_from_slice(prev);
            xor_in_place(&mut block, &feedback);
            tracer.trace(&TraceEvent::Chained {
                direction: Direction::Decrypt,
                index,
                block: &block,
            });
            out.extend_from_slice(&block);
        }
        Ok(out)
    }
}

fn check_ciphertext_len(len: usize) -> Result<()> {
    if len == 0 || len % BLOCK_BYTES != 0 {
        return Err(Error::InvalidCiphertextLength { actual: len });
    }
    Ok(())
}

/// Encrypts `plaintext` under a 16-byte `key` and 16-byte `iv`.
pub fn cbc_encrypt(plaintext: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    let key = Aes128Key::try_from(key)?;
    let iv = block_from_slice(iv)?;
    Ok(Aes128Cbc::new(&key).encrypt(plaintext, &iv))
}

/// Decrypts `ciphertext` under a 16-byte `key` and 16-byte `iv`.
pub fn cbc_decrypt(ciphertext: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    let key = Aes128Key::try_from(key)?;
    let iv = block_from_slice(iv)?;
    check_ciphertext_len(ciphertext.len())?;
    Aes128Cbc::new(&key).decrypt(ciphertext, &iv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::{decrypt_block, encrypt_block};
    use proptest::prelude::*;

    // NIST SP 800-38A, F.2.1 CBC-AES128.Encrypt.
    const SP800_KEY: &str = "2b7e151628aed2a6abf7158809cf4f3c";
    const SP800_IV: &str = "000102030405060708090a0b0c0d0e0f";
    const SP800_PLAIN: &str = concat!(
        "6bc1bee22e409f96e93d7e117393172a",
        "ae2d8a571e03ac9c9eb76fac45af8e51",
        "30c81c46a35ce411e5fbc1191a0a52ef",
        "f69f2445df4f9b17ad2b417be66c3710",
    );
    const SP800_CIPHER: &str = concat!(
        "7649abac8119b246cee98e9b12e9197d",
        "5086cb9b507219ee95db113a917678b2",
        "73bed6b8e3c1743b7116e69e22229516",
        "3ff1caa1681fac09120eca307586e1a7",
    );

    fn unhex(s: &str) -> Vec<u8> {
        hex::decode(s).unwrap()
    }

    #[test]
    fn matches_sp800_38a_vector() {
        let key = unhex(SP800_KEY);
        let iv = unhex(SP800_IV);
        let plain = unhex(SP800_PLAIN);
        let ct = cbc_encrypt(&plain, &key, &iv).unwrap();

        // Aligned input gains one full padding block.
        assert_eq!(ct.len(), plain.len() + BLOCK_BYTES);
        assert_eq!(hex::encode(&ct[..plain.len()]), SP800_CIPHER);

        let pt = cbc_decrypt(&ct, &key, &iv).unwrap();
        assert_eq!(pt, plain);
    }

    #[test]
    fn unpadded_decrypt_of_vector_prefix() {
        let key = Aes128Key::try_from(unhex(SP800_KEY).as_slice()).unwrap();
        let iv = block_from_slice(&unhex(SP800_IV)).unwrap();
        let cbc = Aes128Cbc::new(&key);
        let pt = cbc.decrypt_unpadded(&unhex(SP800_CIPHER), &iv).unwrap();
        assert_eq!(hex::encode(pt), SP800_PLAIN);
    }

    #[test]
    fn first_block_is_iv_xor_then_encrypt() {
        let key = Aes128Key::from([0x42; 16]);
        let iv = [0x11u8; 16];
        let cbc = Aes128Cbc::new(&key);
        let ct = cbc.encrypt(b"sixteen byte msg", &iv);
        assert_eq!(ct.len(), 32);

        let mut expected = *b"sixteen byte msg";
        xor_in_place(&mut expected, &iv);
        assert_eq!(&ct[..16], &encrypt_block(&expected, cbc.round_keys()));

        // Second block chains from the first ciphertext block.
        let mut second = [16u8; 16];
        let mut prev = [0u8; 16];
        prev.copy_from_slice(&ct[..16]);
        xor_in_place(&mut second, &prev);
        assert_eq!(&ct[16..], &encrypt_block(&second, cbc.round_keys()));
    }

    #[test]
    fn decrypt_feeds_back_ciphertext_not_plaintext() {
        let key = Aes128Key::from([0x24; 16]);
        let iv = [0x99u8; 16];
        let cbc = Aes128Cbc::new(&key);
        let ct = cbc.encrypt(&[0x5au8; 40], &iv);

        let mut second = [0u8; 16];
        second.copy_from_slice(&ct[16..32]);
        let mut expected = decrypt_block(&second, cbc.round_keys());
        let mut prev = [0u8; 16];
        prev.copy_from_slice(&ct[..16]);
        xor_in_place(&mut expected, &prev);
        assert_eq!(expected, [0x5au8; 16]);

        let pt = cbc.decrypt(&ct, &iv).unwrap();
        assert_eq!(pt, vec![0x5au8; 40]);
    }

    #[test]
    fn empty_plaintext_round_trips() {
        let key = [0u8; 16];
        let iv = [1u8; 16];
        let ct = cbc_encrypt(b"", &key, &iv).unwrap();
        assert_eq!(ct.len(), 16);
        assert_eq!(cbc_decrypt(&ct, &key, &iv).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn rejects_bad_ciphertext_lengths() {
        let key = [0u8; 16];
        let iv = [0u8; 16];
        for len in [0usize, 1, 15, 17, 31] {
            match cbc_decrypt(&vec![0u8; len], &key, &iv) {
                Err(Error::InvalidCiphertextLength { actual }) => assert_eq!(actual, len),
                other => panic!("length {len}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_bad_key_and_iv_lengths() {
        assert!(matches!(
            cbc_encrypt(b"x", &[0u8; 24], &[0u8; 16]),
            Err(Error::InvalidKeyLength { actual: 24 })
        ));
        assert!(matches!(
            cbc_encrypt(b"x", &[0u8; 16], &[0u8; 8]),
            Err(Error::InvalidBlockLength { actual: 8 })
        ));
        assert!(matches!(
            cbc_decrypt(&[0u8; 16], &[0u8; 15], &[0u8; 16]),
            Err(Error::InvalidKeyLength { actual: 15 })
        ));
    }

    #[test]
    fn wrong_key_reports_padding_error() {
        let iv = [3u8; 16];
        let ct = cbc_encrypt(b"attack at dawn", &[1u8; 16], &iv).unwrap();
        // A wrong key almost always garbles the padding byte.
        match cbc_decrypt(&ct, &[2u8; 16], &iv) {
            Err(Error::InvalidPadding) => {}
            Ok(pt) => assert_ne!(pt, b"attack at dawn"),
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn different_ivs_give_different_ciphertexts() {
        let key = [7u8; 16];
        let a = cbc_encrypt(b"same plaintext", &key, &[0u8; 16]).unwrap();
        let b = cbc_encrypt(b"same plaintext", &key, &[1u8; 16]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn tracer_sees_every_chained_block() {
        #[derive(Default)]
        struct Chains {
            schedules: usize,
            chained: Vec<(Direction, usize)>,
        }
        impl Tracer for Chains {
            fn trace(&mut self, event: &TraceEvent<'_>) {
                match *event {
                    TraceEvent::KeySchedule(_) => self.schedules += 1,
                    TraceEvent::Chained {
                        direction, index, ..
                    } => self.chained.push((direction, index)),
                    _ => {}
                }
            }
        }

        let cbc = Aes128Cbc::new(&Aes128Key::from([5u8; 16]));
        let iv = [6u8; 16];
        let mut chains = Chains::default();
        let ct = cbc.encrypt_with(&[0u8; 20], &iv, &mut chains);
        let pt = cbc.decrypt_with(&ct, &iv, &mut chains).unwrap();
        assert_eq!(pt, vec![0u8; 20]);
        assert_eq!(chains.schedules, 2);
        assert_eq!(
            chains.chained,
            vec![
                (Direction::Encrypt, 0),
                (Direction::Encrypt, 1),
                (Direction::Decrypt, 0),
                (Direction::Decrypt, 1),
            ]
        );
    }

    proptest! {
        #[test]
        fn round_trips_any_plaintext(
            key in any::<[u8; 16]>(),
            iv in any::<[u8; 16]>(),
            plaintext in proptest::collection::vec(any::<u8>(), 0..100),
        ) {
            let ct = cbc_encrypt(&plaintext, &key, &iv).unwrap();
            prop_assert_eq!(ct.len() % BLOCK_BYTES, 0);
            prop_assert!(ct.len() >= BLOCK_BYTES);
            prop_assert_eq!(cbc_decrypt(&ct, &key, &iv).unwrap(), plaintext);
        }

        #[test]
        fn single_block_round_trip(key in any::<[u8; 16]>(), block in any::<[u8; 16]>()) {
            let rks = expand_key(&Aes128Key::from(key));
            prop_assert_eq!(decrypt_block(&encrypt_block(&block, &rks), &rks), block);
        }

        #[test]
        fn iv_changes_ciphertext(
            key in any::<[u8; 16]>(),
            iv in any::<[u8; 16]>(),
            plaintext in proptest::collection::vec(any::<u8>(), 16..64),
        ) {
            let mut other = iv;
            other[0] ^= 0x80;
            let a = cbc_encrypt(&plaintext, &key, &iv).unwrap();
            let b = cbc_encrypt(&plaintext, &key, &other).unwrap();
            prop_assert_ne!(a, b);
        }
    }
}
