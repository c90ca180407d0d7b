//! Encrypts and decrypts a short message with a seeded key and IV.

use aes128_cbc::{generate_iv, generate_key, Aes128Cbc};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn main() {
    // Deterministic seed for reproducibility in the example.
    let mut rng = ChaCha20Rng::from_seed([1u8; 32]);
    let key = generate_key(&mut rng);
    let iv = generate_iv(&mut rng);

    let cbc = Aes128Cbc::new(&key);
    let message = b"Hello, AES! 1234";
    let ciphertext = cbc.encrypt(message, &iv);
    let decrypted = cbc.decrypt(&ciphertext, &iv).unwrap();
    assert_eq!(decrypted, message);

    println!("iv:         {}", hex::encode(iv));
    println!("ciphertext: {}", hex::encode(&ciphertext));
    println!("example succeeded; {} bytes round-tripped", message.len());
}
