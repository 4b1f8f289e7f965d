//! `corpay`: command line access to the corporate payments API
//!
//! - `corpay checksum <file>` - digest of a JSON body
//! - `corpay seal <file>` / `corpay open <file>` - envelope a body or open a token
//! - `corpay balance --account <n>` / `corpay status --crn <ref>` - live calls
//! - `corpay callback <hex> [--ecb]` - decrypt a callback notification

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use corpay_client::{BankClient, ClientConfig};
use corpay_sdk_core::{checksum, CallbackCipher, EnvelopeCodec, KeySource, KeyStore};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "corpay")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "CORPAY_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the checksum of a JSON body
    Checksum {
        file: PathBuf,
        /// Print the body with its checksum field filled in instead
        #[arg(long)]
        inject: bool,
    },

    /// Encrypt and sign a JSON body for the bank
    Seal {
        file: PathBuf,
        #[command(flatten)]
        keys: KeyArgs,
    },

    /// Verify and decrypt an envelope token
    Open {
        file: PathBuf,
        #[command(flatten)]
        keys: KeyArgs,
    },

    /// Fetch an account balance
    Balance {
        #[arg(long)]
        account: String,
    },

    /// Look up a transfer by customer reference number
    Status {
        #[arg(long)]
        crn: String,
    },

    /// Decrypt a callback notification
    Callback {
        cipher_hex: String,
        /// Use AES-128-ECB instead of CBC
        #[arg(long)]
        ecb: bool,
        #[arg(long, env = "CORPAY_CALLBACK_AES_KEY_HEX", hide_env_values = true)]
        key_hex: String,
    },
}

#[derive(Args)]
struct KeyArgs {
    /// Own key store (PKCS#12 or PEM private key)
    #[arg(long, env = "CORPAY_CLIENT_P12_PATH", value_name = "FILE")]
    key: PathBuf,

    #[arg(long, env = "CORPAY_CLIENT_P12_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Counterparty certificate
    #[arg(long, env = "CORPAY_BANK_CERT_PATH", value_name = "FILE")]
    cert: PathBuf,
}

impl KeyArgs {
    fn codec(self) -> EnvelopeCodec {
        let store = KeyStore::new(KeySource {
            private_key_path: self.key,
            passphrase: self.password,
            counterparty_cert_path: self.cert,
        });
        EnvelopeCodec::new(Arc::new(store))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; variables may come from the shell
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.json_logs)?;

    match cli.command {
        Commands::Checksum { file, inject } => {
            let mut body = read_json(&file)?;
            if inject {
                checksum::inject(&mut body).context("body must be a JSON object")?;
                print_json(&body)?;
            } else {
                println!("{}", checksum::digest(&body));
            }
        }
        Commands::Seal { file, keys } => {
            let body = read_json(&file)?;
            let token = keys.codec().seal_and_sign(&body)?;
            println!("{token}");
        }
        Commands::Open { file, keys } => {
            let token = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let body = keys.codec().verify_and_open(token.trim())?;
            print_json(&body)?;
        }
        Commands::Balance { account } => {
            let client = connect()?;
            let response = client.get_balance(&account).await?;
            info!(status = response.status, "balance fetched");
            print_json(&response.body)?;
        }
        Commands::Status { crn } => {
            let client = connect()?;
            let response = client.transfer_status(&crn).await?;
            info!(status = response.status, "status fetched");
            print_json(&response.body)?;
        }
        Commands::Callback {
            cipher_hex,
            ecb,
            key_hex,
        } => {
            let cipher = CallbackCipher::from_hex_key(&key_hex)?;
            let plaintext = if ecb {
                cipher.decrypt_ecb_hex(&cipher_hex)?
            } else {
                cipher.decrypt_cbc_hex(&cipher_hex)?
            };
            match serde_json::from_str::<Value>(&plaintext) {
                Ok(body) => print_json(&body)?,
                Err(_) => println!("{plaintext}"),
            }
        }
    }

    Ok(())
}

fn connect() -> Result<BankClient> {
    let config = ClientConfig::from_env()?;
    info!(environment = ?config.environment, "connecting to bank gateway");
    Ok(BankClient::new(config)?)
}

fn read_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }

    Ok(())
}
