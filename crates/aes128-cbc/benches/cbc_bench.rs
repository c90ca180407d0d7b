use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use aes128_cbc::{encrypt_block, expand_key, generate_iv, generate_key, Aes128Cbc};

fn bench_block(c: &mut Criterion) {
    let mut rng = ChaCha20Rng::from_seed([1u8; 32]);
    let key = generate_key(&mut rng);

    let mut group = c.benchmark_group("block");
    group.bench_function("expand_key", |b| {
        b.iter(|| expand_key(&key));
    });
    let round_keys = expand_key(&key);
    group.bench_function("encrypt_block", |b| {
        let mut block = [0u8; 16];
        rng.fill_bytes(&mut block);
        b.iter(|| encrypt_block(&block, &round_keys));
    });
    group.finish();
}

fn bench_cbc(c: &mut Criterion) {
    let mut rng = ChaCha20Rng::from_seed([2u8; 32]);
    let cbc = Aes128Cbc::new(&generate_key(&mut rng));
    let iv = generate_iv(&mut rng);
    let mut message = vec![0u8; 4096];
    rng.fill_bytes(&mut message);
    let ciphertext = cbc.encrypt(&message, &iv);

    let mut group = c.benchmark_group("cbc");
    group.throughput(Throughput::Bytes(message.len() as u64));
    group.bench_function("encrypt_4k", |b| {
        b.iter(|| cbc.encrypt(&message, &iv));
    });
    group.bench_function("decrypt_4k", |b| {
        b.iter(|| cbc.decrypt(&ciphertext, &iv));
    });
    group.finish();
}

criterion_group!(benches, bench_block, bench_cbc);
criterion_main!(benches);
