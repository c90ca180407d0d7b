//! Command-line interface for `aes128-cbc`.

#![forbid(unsafe_code)]

mod print;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use aes128_cbc::keystore::{self, DEFAULT_KEY_FILE};
use aes128_cbc::{
    block_from_slice, encrypt_block, expand_key, generate_iv, generate_key, Aes128Cbc, Aes128Key,
    Block, LogTracer, NoTrace, Tracer, BLOCK_BYTES,
};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::print::PrintTracer;

/// AES-128-CBC CLI.
#[derive(Parser)]
#[command(
    name = "aescbc",
    version,
    author,
    about = "AES-128 in CBC mode with PKCS#7 padding and step-by-step tracing"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

/// Key source; `--key-hex` takes precedence over `--key-file`.
#[derive(Args)]
#[group(required = true)]
struct KeyArgs {
    /// File holding the raw 16-byte key.
    #[arg(long, value_name = "FILE", env = "AESCBC_KEY_FILE")]
    key_file: Option<PathBuf>,
    /// AES-128 key as 32 hex characters.
    #[arg(long, value_name = "HEX")]
    key_hex: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a random key and save it to a file.
    Keygen {
        /// Output path for the raw key bytes.
        #[arg(long, value_name = "FILE", default_value = DEFAULT_KEY_FILE)]
        out: PathBuf,
        /// Optional RNG seed for reproducible keys.
        #[arg(long, env = "AESCBC_SEED")]
        seed: Option<u64>,
    },
    /// Encrypt a file; the output is the IV followed by the ciphertext.
    Enc {
        #[command(flatten)]
        key: KeyArgs,
        /// Plaintext input file.
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Output path for IV || ciphertext.
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
        /// Fixed IV as 32 hex characters (a fresh one is generated otherwise).
        #[arg(long, value_name = "HEX")]
        iv_hex: Option<String>,
        /// Optional RNG seed for reproducible IVs.
        #[arg(long, env = "AESCBC_SEED")]
        seed: Option<u64>,
        /// Print every intermediate cipher state.
        #[arg(long, default_value_t = false)]
        trace: bool,
    },
    /// Decrypt a file produced by `enc`.
    Dec {
        #[command(flatten)]
        key: KeyArgs,
        /// Input file holding IV || ciphertext.
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Output plaintext path.
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
        /// Print every intermediate cipher state.
        #[arg(long, default_value_t = false)]
        trace: bool,
        /// Keep the data as-is when padding is malformed instead of failing.
        #[arg(long, default_value_t = false)]
        lenient_padding: bool,
    },
    /// Run a local demo: generate key + IV, encrypt a message, decrypt it back.
    Demo {
        /// Message to encrypt.
        #[arg(long, default_value = "Hello, AES! Привет, AES! 1234")]
        text: String,
        /// Save the generated key to this file.
        #[arg(long, value_name = "FILE")]
        key_out: Option<PathBuf>,
        /// Optional RNG seed for reproducibility.
        #[arg(long, env = "AESCBC_SEED")]
        seed: Option<u64>,
        /// Print every intermediate cipher state.
        #[arg(long, default_value_t = false)]
        trace: bool,
    },
    /// Verify the cipher against published vectors and random round trips.
    Check {
        /// Number of random messages to round-trip.
        #[arg(long, default_value_t = 64)]
        samples: usize,
        /// Optional RNG seed for reproducibility.
        #[arg(long, env = "AESCBC_SEED")]
        seed: Option<u64>,
    },
}

/// How intermediate cipher states are reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TraceMode {
    Off,
    Log,
    Print,
}

impl TraceMode {
    fn select(print: bool, verbose: u8) -> Self {
        if print {
            TraceMode::Print
        } else if verbose >= 3 {
            TraceMode::Log
        } else {
            TraceMode::Off
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let verbose = cli.verbose;
    match cli.command {
        Commands::Keygen { out, seed } => cmd_keygen(&out, seed),
        Commands::Enc {
            key,
            input,
            output,
            iv_hex,
            seed,
            trace,
        } => cmd_enc(
            &key,
            &input,
            &output,
            iv_hex.as_deref(),
            seed,
            TraceMode::select(trace, verbose),
        ),
        Commands::Dec {
            key,
            input,
            output,
            trace,
            lenient_padding,
        } => cmd_dec(
            &key,
            &input,
            &output,
            TraceMode::select(trace, verbose),
            lenient_padding,
        ),
        Commands::Demo {
            text,
            key_out,
            seed,
            trace,
        } => cmd_demo(
            &text,
            key_out.as_deref(),
            seed,
            TraceMode::select(trace, verbose),
        ),
        Commands::Check { samples, seed } => cmd_check(samples, seed),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn with_tracer<R>(mode: TraceMode, f: impl FnOnce(&mut dyn Tracer) -> R) -> Result<R> {
    match mode {
        TraceMode::Off => Ok(f(&mut NoTrace)),
        TraceMode::Log => Ok(f(&mut LogTracer)),
        TraceMode::Print => {
            let mut tracer = PrintTracer::new(io::stdout().lock());
            let result = f(&mut tracer);
            tracer.finish().context("write trace output")?;
            Ok(result)
        }
    }
}

fn cmd_keygen(out: &Path, seed: Option<u64>) -> Result<()> {
    let mut rng = seeded_rng(seed);
    let key = generate_key(&mut rng);
    keystore::save_key(out, &key)?;
    info!("wrote key to {}", out.display());
    Ok(())
}

fn cmd_enc(
    key_args: &KeyArgs,
    input_path: &Path,
    output_path: &Path,
    iv_hex: Option<&str>,
    seed: Option<u64>,
    mode: TraceMode,
) -> Result<()> {
    let key = resolve_key(key_args)?;
    let iv = match iv_hex {
        Some(hex_str) => parse_iv_hex(hex_str)?,
        None => generate_iv(&mut seeded_rng(seed)),
    };
    let plaintext =
        fs::read(input_path).with_context(|| format!("read {}", input_path.display()))?;

    let cbc = Aes128Cbc::new(&key);
    let ciphertext = with_tracer(mode, |tracer| cbc.encrypt_with(&plaintext, &iv, tracer))?;

    let mut data = Vec::with_capacity(BLOCK_BYTES + ciphertext.len());
    data.extend_from_slice(&iv);
    data.extend_from_slice(&ciphertext);
    fs::write(output_path, data).with_context(|| format!("write {}", output_path.display()))?;
    debug!(
        plaintext = plaintext.len(),
        ciphertext = ciphertext.len(),
        "encrypted {}",
        input_path.display()
    );
    Ok(())
}

fn cmd_dec(
    key_args: &KeyArgs,
    input_path: &Path,
    output_path: &Path,
    mode: TraceMode,
    lenient_padding: bool,
) -> Result<()> {
    let key = resolve_key(key_args)?;
    let data = fs::read(input_path).with_context(|| format!("read {}", input_path.display()))?;
    if data.len() < BLOCK_BYTES {
        bail!("input is shorter than the 16-byte IV header");
    }
    let (iv_bytes, ciphertext) = data.split_at(BLOCK_BYTES);
    let iv = block_from_slice(iv_bytes)?;

    let cbc = Aes128Cbc::new(&key);
    let plaintext = if lenient_padding {
        let padded = with_tracer(mode, |tracer| {
            cbc.decrypt_unpadded_with(ciphertext, &iv, tracer)
        })??;
        aes128_cbc::unpad_lenient(&padded).to_vec()
    } else {
        with_tracer(mode, |tracer| cbc.decrypt_with(ciphertext, &iv, tracer))?
            .context("decrypt ciphertext")?
    };
    fs::write(output_path, &plaintext)
        .with_context(|| format!("write {}", output_path.display()))?;
    Ok(())
}

fn cmd_demo(text: &str, key_out: Option<&Path>, seed: Option<u64>, mode: TraceMode) -> Result<()> {
    let mut rng = seeded_rng(seed);
    let key = generate_key(&mut rng);
    let iv = generate_iv(&mut rng);
    if let Some(path) = key_out {
        keystore::save_key(path, &key)?;
    }

    println!("=== AES-128 CBC ===");
    println!("plaintext: {text}");
    println!("plaintext bytes: {}", hex::encode(text.as_bytes()));
    println!("key: {}", hex::encode(key.as_bytes()));
    println!("iv: {}", hex::encode(iv));

    let cbc = Aes128Cbc::new(&key);
    println!("\n=== encryption ===");
    let ciphertext = with_tracer(mode, |tracer| cbc.encrypt_with(text.as_bytes(), &iv, tracer))?;
    println!("ciphertext: {}", hex::encode(&ciphertext));

    println!("\n=== decryption ===");
    let decrypted = with_tracer(mode, |tracer| cbc.decrypt_with(&ciphertext, &iv, tracer))??;
    println!("decrypted bytes: {}", hex::encode(&decrypted));
    println!("decrypted: {}", String::from_utf8_lossy(&decrypted));

    if decrypted != text.as_bytes() {
        bail!("demo roundtrip failed");
    }
    println!("\nsuccess: decrypted text matches the original");
    Ok(())
}

fn cmd_check(samples: usize, seed: Option<u64>) -> Result<()> {
    // FIPS-197 Appendix C.1.
    let fips_key = parse_key_hex("000102030405060708090a0b0c0d0e0f")?;
    let fips_plain = parse_iv_hex("00112233445566778899aabbccddeeff")?;
    let expected = "69c4e0d86a7b0430d8cdb78070b4c55a";
    let actual = hex::encode(encrypt_block(&fips_plain, &expand_key(&fips_key)));
    if actual != expected {
        bail!("FIPS-197 known-answer test failed: got {actual}, expected {expected}");
    }

    let mut rng = seeded_rng(seed);
    for sample in 0..samples {
        let key = generate_key(&mut rng);
        let iv = generate_iv(&mut rng);
        let len = (rng.next_u32() % 257) as usize;
        let mut message = vec![0u8; len];
        rng.fill_bytes(&mut message);

        let cbc = Aes128Cbc::new(&key);
        let ciphertext = cbc.encrypt(&message, &iv);
        let decrypted = cbc
            .decrypt(&ciphertext, &iv)
            .with_context(|| format!("sample {sample}"))?;
        if decrypted != message {
            bail!("round trip mismatch for sample {sample} ({len} bytes)");
        }
    }
    println!("ok: known-answer test and {samples} random round trips passed");
    Ok(())
}

fn resolve_key(args: &KeyArgs) -> Result<Aes128Key> {
    match (&args.key_file, &args.key_hex) {
        (_, Some(hex_str)) => parse_key_hex(hex_str),
        (Some(path), None) => Ok(keystore::load_key(path)?),
        (None, None) => bail!("either --key-file or --key-hex is required"),
    }
}

fn parse_key_hex(hex_str: &str) -> Result<Aes128Key> {
    let bytes = hex::decode(hex_str.trim()).context("decode key hex")?;
    Aes128Key::try_from(bytes.as_slice()).context("AES-128 key must be 32 hex characters")
}

fn parse_iv_hex(hex_str: &str) -> Result<Block> {
    let bytes = hex::decode(hex_str.trim()).context("decode IV hex")?;
    block_from_slice(&bytes).context("IV must be 32 hex characters")
}

fn seeded_rng(seed: Option<u64>) -> impl RngCore + CryptoRng {
    match seed {
        Some(value) => {
            let mut seed_bytes = [0u8; 32];
            seed_bytes[..8].copy_from_slice(&value.to_le_bytes());
            ChaCha20Rng::from_seed(seed_bytes)
        }
        None => ChaCha20Rng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("aescbc-cli-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn key_hex_overrides_key_file_from_env() {
        std::env::set_var("AESCBC_KEY_FILE", "/nonexistent/aes_key.bin");
        let parsed = Cli::try_parse_from([
            "aescbc",
            "enc",
            "--key-hex",
            "000102030405060708090a0b0c0d0e0f",
            "--input",
            "p.txt",
            "--output",
            "p.enc",
        ]);
        std::env::remove_var("AESCBC_KEY_FILE");

        let cli = parsed.unwrap();
        let Commands::Enc { key, .. } = cli.command else {
            panic!("expected enc command");
        };
        assert_eq!(
            key.key_file.as_deref(),
            Some(Path::new("/nonexistent/aes_key.bin"))
        );
        let resolved = resolve_key(&key).unwrap();
        assert_eq!(resolved.as_bytes()[15], 0x0f);
    }

    #[test]
    fn key_source_is_required() {
        let parsed = Cli::try_parse_from(["aescbc", "dec", "--input", "a", "--output", "b"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn trace_mode_selection() {
        assert_eq!(TraceMode::select(true, 0), TraceMode::Print);
        assert_eq!(TraceMode::select(false, 3), TraceMode::Log);
        assert_eq!(TraceMode::select(false, 1), TraceMode::Off);
    }

    #[test]
    fn parse_key_hex_rejects_wrong_length() {
        assert!(parse_key_hex("000102").is_err());
        assert!(parse_key_hex("zz").is_err());
        let key = parse_key_hex(" 000102030405060708090a0b0c0d0e0f\n").unwrap();
        assert_eq!(key.as_bytes()[15], 0x0f);
    }

    #[test]
    fn seeded_rng_is_deterministic() {
        let a = generate_key(&mut seeded_rng(Some(42)));
        let b = generate_key(&mut seeded_rng(Some(42)));
        assert_eq!(a, b);
    }

    #[test]
    fn enc_then_dec_round_trips_a_file() {
        let key_path = scratch("key.bin");
        let plain_path = scratch("plain.txt");
        let enc_path = scratch("plain.enc");
        let dec_path = scratch("plain.dec");

        cmd_keygen(&key_path, Some(1)).unwrap();
        fs::write(&plain_path, b"the quick brown fox jumps over the lazy dog").unwrap();
        let key_args = KeyArgs {
            key_file: Some(key_path.clone()),
            key_hex: None,
        };

        cmd_enc(&key_args, &plain_path, &enc_path, None, Some(2), TraceMode::Off).unwrap();
        let encrypted = fs::read(&enc_path).unwrap();
        assert_eq!(encrypted.len(), BLOCK_BYTES + 48);

        cmd_dec(&key_args, &enc_path, &dec_path, TraceMode::Off, false).unwrap();
        assert_eq!(
            fs::read(&dec_path).unwrap(),
            b"the quick brown fox jumps over the lazy dog"
        );
    }

    #[test]
    fn dec_rejects_truncated_input() {
        let enc_path = scratch("truncated.enc");
        let out_path = scratch("truncated.dec");
        fs::write(&enc_path, [0u8; 10]).unwrap();
        let key_args = KeyArgs {
            key_file: None,
            key_hex: Some("000102030405060708090a0b0c0d0e0f".into()),
        };
        assert!(cmd_dec(&key_args, &enc_path, &out_path, TraceMode::Off, false).is_err());

        // IV present but ciphertext is not block aligned.
        fs::write(&enc_path, [0u8; 33]).unwrap();
        let err = cmd_dec(&key_args, &enc_path, &out_path, TraceMode::Off, false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<aes128_cbc::Error>(),
            Some(aes128_cbc::Error::InvalidCiphertextLength { actual: 17 })
        ));
    }

    #[test]
    fn check_passes() {
        cmd_check(8, Some(3)).unwrap();
    }
}
