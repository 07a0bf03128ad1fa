//! chronoseal command-line interface.
//!
//! Seals files into time-locked capsules and opens them once the
//! release time has passed. Exit codes: 0 on success, 2 when an unseal
//! fails only because the capsule is still locked, 1 on any other
//! failure.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, ensure, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::OsRng;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use chronoseal_capsule::{gate, Capsule};
use chronoseal_core::{seal_file, unseal_file, PipelineConfig, Transport};
use chronoseal_crypto::{
    generate_keypair, private_key_from_pem, private_key_to_pem, public_key_from_pem,
    public_key_to_pem, KeyMode, DEFAULT_RSA_BITS,
};

mod http;

use http::HttpTransport;

const EXIT_LOCKED: u8 = 2;

/// Time-locked file capsules
///
/// Compresses, encrypts, and wraps a file into a capsule that cannot be
/// opened before its unlock time.
#[derive(Parser, Debug)]
#[command(name = "chronoseal")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "CHRONOSEAL_LOG_LEVEL", default_value = "warn", global = true)]
    log_level: String,

    /// Log format (plain, json)
    #[arg(long, env = "CHRONOSEAL_LOG_FORMAT", default_value = "plain", global = true)]
    log_format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a receiver RSA keypair as PEM files
    Keygen {
        /// Directory to write private_key.pem and public_key.pem into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// RSA modulus size in bits
        #[arg(long, default_value_t = DEFAULT_RSA_BITS)]
        bits: usize,
    },

    /// Seal a file into a capsule
    Seal {
        /// File to seal
        input: PathBuf,

        /// Capsule file to write
        output: PathBuf,

        /// Receiver's public key (PEM)
        #[arg(long)]
        recipient_key: PathBuf,

        /// Unlock time: RFC 3339 ("2027-01-01T00:00:00Z") or unix seconds
        #[arg(long)]
        unlock_at: String,

        /// Derive the session key from this password instead of randomly
        #[arg(long)]
        password: Option<String>,

        /// Also upload the capsule to a relay server at this base URL
        #[arg(long)]
        upload_url: Option<String>,

        /// Recipient id used by the relay (with --upload-url)
        #[arg(long, default_value = "default")]
        recipient_id: String,
    },

    /// Open a capsule once its unlock time has passed
    Unseal {
        /// Capsule file to open
        input: PathBuf,

        /// File to write the recovered content to
        output: PathBuf,

        /// Receiver's private key (PEM)
        #[arg(long)]
        private_key: PathBuf,

        /// Password, when the capsule was sealed with one
        #[arg(long)]
        password: Option<String>,
    },

    /// Print a capsule's metadata and gate state
    Status {
        /// Capsule file to inspect
        capsule: PathBuf,
    },
}

fn parse_log_level(raw: &str) -> Result<Level> {
    match raw.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => bail!("unknown log level {other:?} (expected trace, debug, info, warn or error)"),
    }
}

fn setup_logging(log_level: &str, log_format: &str) -> Result<()> {
    let level = parse_log_level(log_level)?;

    let filter = EnvFilter::from_default_env()
        .add_directive(level.into())
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    match log_format.to_lowercase().as_str() {
        "json" => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(filter)
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("Failed to set subscriber")?;
        }
        _ => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("Failed to set subscriber")?;
        }
    }

    Ok(())
}

/// Parse an unlock time as unix seconds or RFC 3339.
fn parse_unlock_time(raw: &str) -> Result<u64> {
    if let Ok(seconds) = raw.parse::<u64>() {
        return Ok(seconds);
    }
    let parsed = chrono::DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("unlock time {raw:?} is neither unix seconds nor RFC 3339"))?;
    let seconds = parsed.timestamp();
    ensure!(seconds >= 0, "unlock time {raw:?} is before the unix epoch");
    Ok(seconds as u64)
}

/// Format a remaining lock duration for humans.
fn format_remaining(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    let seconds = secs % 60;
    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

fn cmd_keygen(out_dir: &Path, bits: usize) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let config = PipelineConfig::builder().rsa_bits(bits).build();
    info!(
        bits = config.rsa_bits,
        "generating RSA keypair; this can take a moment"
    );
    let (private_key, public_key) = generate_keypair(&mut OsRng, config.rsa_bits)?;

    let private_path = out_dir.join("private_key.pem");
    let public_path = out_dir.join("public_key.pem");
    fs::write(&private_path, private_key_to_pem(&private_key)?)
        .with_context(|| format!("writing {}", private_path.display()))?;
    fs::write(&public_path, public_key_to_pem(&public_key)?)
        .with_context(|| format!("writing {}", public_path.display()))?;

    println!("wrote {}", private_path.display());
    println!("wrote {}", public_path.display());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_seal(
    input: &Path,
    output: &Path,
    recipient_key: &Path,
    unlock_at: &str,
    password: Option<&str>,
    upload_url: Option<&str>,
    recipient_id: &str,
) -> Result<()> {
    let pem = fs::read_to_string(recipient_key)
        .with_context(|| format!("reading {}", recipient_key.display()))?;
    let public_key = public_key_from_pem(&pem)
        .with_context(|| format!("parsing {}", recipient_key.display()))?;
    let unlock_time = parse_unlock_time(unlock_at)?;
    let config = PipelineConfig::default();
    let password = password.map(str::as_bytes);

    let outcome = seal_file(
        &mut OsRng,
        input,
        output,
        unlock_time,
        password,
        &public_key,
        &config,
    )?;
    println!(
        "sealed {} -> {} ({} bytes, unlocks at {unlock_time})",
        input.display(),
        output.display(),
        outcome.container.len()
    );

    if let Some(url) = upload_url {
        let transport = HttpTransport::new(url)?;
        let capsule_id = transport.upload(
            &outcome.container,
            recipient_id,
            outcome.capsule.metadata(),
        )?;
        println!("uploaded as {capsule_id}");
    }

    Ok(())
}

fn cmd_unseal(
    input: &Path,
    output: &Path,
    private_key: &Path,
    password: Option<&str>,
) -> Result<ExitCode> {
    let pem = fs::read_to_string(private_key)
        .with_context(|| format!("reading {}", private_key.display()))?;
    let key = private_key_from_pem(&pem)
        .with_context(|| format!("parsing {}", private_key.display()))?;
    let config = PipelineConfig::default();

    match unseal_file(
        input,
        output,
        &key,
        password.map(str::as_bytes),
        &config,
        gate::unix_now(),
    ) {
        Ok(outcome) => {
            println!(
                "unsealed {} -> {} ({} bytes, originally {:?})",
                input.display(),
                output.display(),
                outcome.plaintext.len(),
                outcome.metadata.original_filename
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => match err.locked_for() {
            Some(secs) => {
                eprintln!("capsule is still locked for {}", format_remaining(secs));
                Ok(ExitCode::from(EXIT_LOCKED))
            }
            None => Err(anyhow::Error::new(err)),
        },
    }
}

fn cmd_status(capsule_path: &Path) -> Result<()> {
    let container =
        fs::read(capsule_path).with_context(|| format!("reading {}", capsule_path.display()))?;
    let capsule = Capsule::parse(&container)?;
    let metadata = capsule.metadata();
    let now = gate::unix_now();

    println!("file:        {}", metadata.original_filename);
    println!("created at:  {}", metadata.created_at);
    println!("unlocks at:  {}", metadata.unlock_time);
    println!(
        "sizes:       {} original, {} compressed, {} encrypted",
        metadata.original_size, metadata.compressed_size, metadata.encrypted_size
    );
    println!("digest:      {}", metadata.content_digest);
    println!(
        "key mode:    {}",
        match metadata.key_mode {
            KeyMode::Random => "random",
            KeyMode::PasswordDerived => "password-derived",
        }
    );
    if gate::is_releasable(metadata.unlock_time, now) {
        println!("gate:        open");
    } else {
        let remaining = gate::remaining(metadata.unlock_time, now);
        println!(
            "gate:        locked for {}",
            format_remaining(remaining.as_secs())
        );
    }
    Ok(())
}

fn run(cli: Cli) -> Result<ExitCode> {
    match &cli.command {
        Command::Keygen { out_dir, bits } => {
            cmd_keygen(out_dir, *bits)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Seal {
            input,
            output,
            recipient_key,
            unlock_at,
            password,
            upload_url,
            recipient_id,
        } => {
            cmd_seal(
                input,
                output,
                recipient_key,
                unlock_at,
                password.as_deref(),
                upload_url.as_deref(),
                recipient_id,
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Unseal {
            input,
            output,
            private_key,
            password,
        } => cmd_unseal(input, output, private_key, password.as_deref()),
        Command::Status { capsule } => {
            cmd_status(capsule)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = setup_logging(&cli.log_level, &cli.log_format) {
        eprintln!("error: {err:#}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unlock_time_unix_seconds() {
        assert_eq!(parse_unlock_time("1700000000").unwrap(), 1_700_000_000);
    }

    #[test]
    fn test_parse_unlock_time_rfc3339() {
        assert_eq!(
            parse_unlock_time("1970-01-01T00:01:00Z").unwrap(),
            60
        );
        assert_eq!(
            parse_unlock_time("1970-01-01T01:01:00+01:00").unwrap(),
            60
        );
    }

    #[test]
    fn test_parse_unlock_time_rejects_garbage() {
        assert!(parse_unlock_time("tomorrow").is_err());
        assert!(parse_unlock_time("1969-12-31T00:00:00Z").is_err());
    }

    #[test]
    fn test_format_remaining_buckets() {
        assert_eq!(format_remaining(30), "30s");
        assert_eq!(format_remaining(90), "1m 30s");
        assert_eq!(format_remaining(3_690), "1h 1m 30s");
        assert_eq!(format_remaining(180_000), "2d 2h 0m");
    }

    #[test]
    fn test_parse_log_level_accepts_known_names() {
        assert_eq!(parse_log_level("debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level("ERROR").unwrap(), Level::ERROR);
    }

    #[test]
    fn test_parse_log_level_rejects_unknown_names() {
        assert!(parse_log_level("verbose").is_err());
        assert!(parse_log_level("").is_err());
    }

    #[test]
    fn test_keygen_honors_requested_bits() {
        use chronoseal_crypto::PublicKeyParts;

        let dir = tempfile::tempdir().unwrap();
        cmd_keygen(dir.path(), 2048).unwrap();

        let public_pem = fs::read_to_string(dir.path().join("public_key.pem")).unwrap();
        let public_key = public_key_from_pem(&public_pem).unwrap();
        assert_eq!(public_key.size(), 2048 / 8);

        let private_pem = fs::read_to_string(dir.path().join("private_key.pem")).unwrap();
        assert!(private_key_from_pem(&private_pem).is_ok());
    }

    #[test]
    fn test_cli_parses_seal_command() {
        let cli = Cli::parse_from([
            "chronoseal",
            "seal",
            "in.txt",
            "out.capsule",
            "--recipient-key",
            "pub.pem",
            "--unlock-at",
            "1700000000",
        ]);
        assert!(matches!(cli.command, Command::Seal { .. }));
    }
}
