//! Unchained signer CLI - key generation, QR payloads, broker signing and history.

use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand};
use rand_core::{OsRng, RngCore};
use serde_json::json;
use tracing_subscriber::EnvFilter;
use unchained_signer::{
    generate_secure_random_scalar, public_key_hex, qr_data_from_base64, qr_data_to_base64, Attestation,
    BrokerClient, ExplorerClient, PrivateKey, QrData, SignerConfig,
};

#[derive(Parser)]
#[command(name = "unchained-signer")]
#[command(about = "Attestation broker client: sign scanned correctness reports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new private key (hex) and print its public key
    Keygen,
    /// Print the public keys for a private key
    Pubkey {
        /// Private key hex
        #[arg(long, env = "UNCHAINED_PRIVATE_KEY", hide_env_values = true)]
        key: String,
    },
    /// Build a base64 QR payload for a document
    QrEncode {
        /// Broker URL embedded in the payload
        #[arg(long)]
        url: String,
        /// Topic bytes as hex
        #[arg(long)]
        topic: String,
        /// Document hash as hex (default: 64 random bytes)
        #[arg(long)]
        hash: Option<String>,
        /// Mark the document as not matching
        #[arg(long)]
        incorrect: bool,
        /// Unix seconds (default: now)
        #[arg(long)]
        timestamp: Option<u64>,
    },
    /// Decode a base64 QR payload
    QrDecode {
        /// Base64 payload as scanned
        payload: String,
    },
    /// Sign a scanned QR payload against the broker it names
    Sign {
        /// Base64 payload as scanned
        payload: String,
        /// Display name sent in Hello
        #[arg(long)]
        name: String,
        /// Private key hex
        #[arg(long, env = "UNCHAINED_PRIVATE_KEY", hide_env_values = true)]
        key: String,
    },
    /// List past attestations from the explorer
    History {
        /// Public key hex (derived from --key when absent)
        #[arg(long)]
        public_key: Option<String>,
        /// Private key hex
        #[arg(long, env = "UNCHAINED_PRIVATE_KEY", hide_env_values = true)]
        key: Option<String>,
    },
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn keygen() -> CliResult {
    let hex_key = generate_secure_random_scalar();
    let key = PrivateKey::from_hex(&hex_key)?;
    println!(
        "{}",
        json!({ "private_key": hex_key, "public_key": public_key_hex(&key) })
    );
    Ok(())
}

fn pubkey(key: &str) -> CliResult {
    let key = PrivateKey::from_hex(key)?;
    println!(
        "{}",
        json!({
            "public_key": hex::encode(key.public_key()),
            "short_public_key": hex::encode(key.short_public_key()),
        })
    );
    Ok(())
}

fn qr_encode(url: String, topic: &str, hash: Option<String>, incorrect: bool, timestamp: Option<u64>) -> CliResult {
    let hash = match hash {
        Some(h) => hex::decode(h)?,
        None => {
            let mut h = vec![0u8; 64];
            OsRng.fill_bytes(&mut h);
            h
        }
    };
    let qr = QrData {
        data: Attestation::new(timestamp.unwrap_or_else(now_secs), hash, hex::decode(topic)?, !incorrect),
        url,
    };
    println!("{}", qr_data_to_base64(&qr)?);
    Ok(())
}

fn qr_decode(payload: &str) -> CliResult {
    let qr = qr_data_from_base64(payload)?;
    println!(
        "{}",
        json!({
            "timestamp": qr.data.timestamp,
            "hash": hex::encode(&qr.data.hash),
            "topic": hex::encode(&qr.data.topic),
            "correct": qr.data.correct,
            "url": qr.url,
        })
    );
    Ok(())
}

async fn sign(config: SignerConfig, payload: &str, name: &str, key: &str) -> CliResult {
    let qr = qr_data_from_base64(payload)?;
    let key = PrivateKey::from_hex(key)?;
    let client = BrokerClient::new(config.session);
    client.sign(&qr, key, name).await?;
    println!("{}", json!({ "status": "accepted" }));
    Ok(())
}

async fn history(config: &SignerConfig, public_key: Option<String>, key: Option<String>) -> CliResult {
    let public_key = match (public_key, key) {
        (Some(pk), _) => pk,
        (None, Some(k)) => public_key_hex(&PrivateKey::from_hex(&k)?),
        (None, None) => return Err("either --public-key or --key is required".into()),
    };
    let client = ExplorerClient::new(config)?;
    let records = client.signatures(&public_key).await?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match SignerConfig::from_env() {
        Err(e) => Err(e.into()),
        Ok(config) => match cli.command {
            Commands::Keygen => keygen(),
            Commands::Pubkey { key } => pubkey(&key),
            Commands::QrEncode {
                url,
                topic,
                hash,
                incorrect,
                timestamp,
            } => qr_encode(url, &topic, hash, incorrect, timestamp),
            Commands::QrDecode { payload } => qr_decode(&payload),
            Commands::Sign { payload, name, key } => sign(config, &payload, &name, &key).await,
            Commands::History { public_key, key } => history(&config, public_key, key).await,
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
