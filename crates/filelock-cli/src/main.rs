//! filelock: encrypt-and-compress files into tamper-evident `.secured` artifacts
//!
//! Commands:
//!   secure <file>            - encrypt then compress to <file>.secured
//!   restore <file.secured>   - decompress then decrypt back to <file>
//!   encrypt / decrypt        - crypto container only (<file>.flk)
//!   compress / decompress    - compression container only (<file>.flc)
//!   inspect <file.secured>   - show container headers without decrypting
//!   config show              - display current configuration

mod validate;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use secrecy::{ExposeSecret, SecretString};
use std::path::{Path, PathBuf};
use std::time::Duration;

use filelock_core::config::FilelockConfig;
use filelock_core::privacy::PrivacyMode;
use filelock_core::ProgressFn;
use filelock_pipeline::OperationContext;

use crate::validate::Preset;

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "filelock",
    version,
    about = "Password-encrypt and compress files into tamper-evident artifacts",
    long_about = "filelock: secure files (AES-256-CBC + SHA-256 integrity, then zlib) and restore them"
)]
struct Cli {
    /// Path to filelock config.toml
    #[arg(long, short = 'c', env = "FILELOCK_CONFIG")]
    config: Option<PathBuf>,

    /// Log level filter (default: from config, then "info")
    #[arg(long, env = "FILELOCK_LOG", global = true)]
    log: Option<String>,

    /// Log output format (default: from config, then text)
    #[arg(long, env = "FILELOCK_LOG_FORMAT", global = true)]
    log_format: Option<LogFormat>,

    /// How file paths appear in logs: full, redacted, or hashed
    #[arg(long, env = "FILELOCK_PRIVACY_MODE", global = true)]
    privacy: Option<PrivacyMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

#[derive(clap::Args, Debug)]
struct OutputArgs {
    /// Destination path (default: derived from the input name)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Replace the destination if it already exists
    #[arg(long, short = 'f')]
    force: bool,
}

#[derive(clap::Args, Debug)]
struct LevelArgs {
    /// Compression level 1-9 (default: from config)
    #[arg(long, short = 'l', conflicts_with = "preset")]
    level: Option<u32>,

    /// Named compression level
    #[arg(long, value_enum)]
    preset: Option<Preset>,
}

#[derive(clap::Args, Debug)]
struct PasswordArgs {
    /// Password (prompted for when omitted)
    #[arg(long, env = "FILELOCK_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt then compress a file into <file>.secured
    Secure {
        file: PathBuf,
        #[command(flatten)]
        level: LevelArgs,
        #[command(flatten)]
        password: PasswordArgs,
        #[command(flatten)]
        out: OutputArgs,
    },

    /// Restore a .secured file to its original contents
    Restore {
        file: PathBuf,
        #[command(flatten)]
        password: PasswordArgs,
        #[command(flatten)]
        out: OutputArgs,
    },

    /// Encrypt a file into <file>.flk (no compression)
    Encrypt {
        file: PathBuf,
        #[command(flatten)]
        password: PasswordArgs,
        #[command(flatten)]
        out: OutputArgs,
    },

    /// Decrypt a .flk file
    Decrypt {
        file: PathBuf,
        #[command(flatten)]
        password: PasswordArgs,
        #[command(flatten)]
        out: OutputArgs,
    },

    /// Compress a file into <file>.flc (no encryption)
    Compress {
        file: PathBuf,
        #[command(flatten)]
        level: LevelArgs,
        #[command(flatten)]
        out: OutputArgs,
    },

    /// Decompress a .flc file
    Decompress {
        file: PathBuf,
        #[command(flatten)]
        out: OutputArgs,
    },

    /// Show the headers of a .secured file without decrypting it
    Inspect {
        file: PathBuf,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = FilelockConfig::load(&config_path)
        .with_context(|| format!("loading config: {}", config_path.display()))?;

    let log_level = cli
        .log
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    let log_format = match &cli.log_format {
        Some(f) => f.clone(),
        None => LogFormat::from_str(&config.logging.format, true)
            .map_err(|e| anyhow::anyhow!("config logging.format: {e}"))?,
    };
    init_logging(&log_level, &log_format);

    let privacy = cli.privacy.unwrap_or(config.logging.privacy_mode);

    match cli.command {
        Commands::Secure { file, level, password, out } => {
            cmd_secure(&config, privacy, &file, &level, password, &out)
        }
        Commands::Restore { file, password, out } => cmd_restore(privacy, &file, password, &out),
        Commands::Encrypt { file, password, out } => {
            cmd_encrypt(&config, privacy, &file, password, &out)
        }
        Commands::Decrypt { file, password, out } => cmd_decrypt(privacy, &file, password, &out),
        Commands::Compress { file, level, out } => {
            cmd_compress(&config, privacy, &file, &level, &out)
        }
        Commands::Decompress { file, out } => cmd_decompress(privacy, &file, &out),
        Commands::Inspect { file, json } => cmd_inspect(&file, json),
        Commands::Config { action: ConfigAction::Show } => cmd_config_show(&config, &config_path),
    }
}

fn init_logging(level: &str, format: &LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stderr keeps stdout clean for `inspect --json`
    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn default_config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        })
        .join("filelock")
        .join("config.toml")
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn make_progress_bar(prefix: &str) -> ProgressBar {
    let pb = ProgressBar::new(0);
    let style = ProgressStyle::with_template(
        "{prefix:.bold} [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}",
    )
    .map(|s| s.progress_chars("=>-"))
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_prefix(prefix.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Adapt a progress bar to the pipeline's `(done, total)` sink.
fn progress_sink(pb: &ProgressBar) -> ProgressFn {
    let pb = pb.clone();
    Box::new(move |done, total| {
        pb.set_length(total);
        pb.set_position(done);
    })
}

/// Take the password from the flag/env, or prompt for it.
///
/// `confirm` asks twice; used when creating new artifacts.
fn read_password(args: PasswordArgs, confirm: bool) -> Result<SecretString> {
    if let Some(pw) = args.password {
        return Ok(SecretString::from(pw));
    }
    let first = SecretString::from(
        rpassword::prompt_password("Password: ").context("reading password")?,
    );
    if confirm {
        let second = SecretString::from(
            rpassword::prompt_password("Confirm password: ").context("reading password")?,
        );
        if first.expose_secret() != second.expose_secret() {
            anyhow::bail!("passwords do not match");
        }
    }
    Ok(first)
}

fn context_for(privacy: PrivacyMode, out: &OutputArgs) -> OperationContext {
    OperationContext {
        privacy,
        output: out.output.clone(),
        overwrite: out.force,
        ..OperationContext::default()
    }
}

/// Checks shared by operations that create a new protected artifact.
fn check_forward_input(config: &FilelockConfig, file: &Path) -> Result<()> {
    validate::input_file(file)?;
    validate::extension(file, config)?;
    Ok(())
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn cmd_secure(
    config: &FilelockConfig,
    privacy: PrivacyMode,
    file: &Path,
    level: &LevelArgs,
    password: PasswordArgs,
    out: &OutputArgs,
) -> Result<()> {
    check_forward_input(config, file)?;
    let level = validate::resolve_level(level.level, level.preset, config);
    filelock_compress::validate_level(level)?;
    let password = read_password(password, true)?;
    validate::password_strength(&password, config.security.min_password_length)?;

    let pb = make_progress_bar("secure");
    let sink = progress_sink(&pb);
    let result = filelock_pipeline::secure_file_with_context(
        file,
        &password,
        level,
        Some(&sink),
        &context_for(privacy, out),
    );
    pb.finish_and_clear();
    let report = result?;

    println!(
        "secured: {} -> {} ({} -> {} bytes, compression ratio {:.1}%, {:.2?})",
        report.input.display(),
        report.output.display(),
        report.original_bytes,
        report.secured_bytes,
        report.compression_ratio,
        report.elapsed,
    );
    Ok(())
}

fn cmd_restore(
    privacy: PrivacyMode,
    file: &Path,
    password: PasswordArgs,
    out: &OutputArgs,
) -> Result<()> {
    validate::input_file(file)?;
    let password = read_password(password, false)?;

    let pb = make_progress_bar("restore");
    let sink = progress_sink(&pb);
    let result = filelock_pipeline::restore_file_with_context(
        file,
        &password,
        Some(&sink),
        &context_for(privacy, out),
    );
    pb.finish_and_clear();

    let report = match result {
        Ok(r) => r,
        Err(e) if e.is_integrity_failure() => {
            return Err(anyhow::Error::new(e)
                .context("wrong password, or the file has been tampered with"));
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "restored: {} -> {} ({} bytes, {:.2?})",
        report.input.display(),
        report.output.display(),
        report.restored_bytes,
        report.elapsed,
    );
    Ok(())
}

fn cmd_encrypt(
    config: &FilelockConfig,
    privacy: PrivacyMode,
    file: &Path,
    password: PasswordArgs,
    out: &OutputArgs,
) -> Result<()> {
    check_forward_input(config, file)?;
    let password = read_password(password, true)?;
    validate::password_strength(&password, config.security.min_password_length)?;

    let report = filelock_pipeline::encrypt_file(file, &password, &context_for(privacy, out))?;
    println!(
        "encrypted: {} -> {} ({} bytes)",
        report.input.display(),
        report.output.display(),
        report.bytes_out
    );
    Ok(())
}

fn cmd_decrypt(
    privacy: PrivacyMode,
    file: &Path,
    password: PasswordArgs,
    out: &OutputArgs,
) -> Result<()> {
    validate::input_file(file)?;
    let password = read_password(password, false)?;

    let report = filelock_pipeline::decrypt_file(file, &password, &context_for(privacy, out))?;
    println!(
        "decrypted: {} -> {} ({} bytes)",
        report.input.display(),
        report.output.display(),
        report.bytes_out
    );
    Ok(())
}

fn cmd_compress(
    config: &FilelockConfig,
    privacy: PrivacyMode,
    file: &Path,
    level: &LevelArgs,
    out: &OutputArgs,
) -> Result<()> {
    check_forward_input(config, file)?;
    let level = validate::resolve_level(level.level, level.preset, config);

    let pb = make_progress_bar("compress");
    let sink = progress_sink(&pb);
    let result =
        filelock_pipeline::compress_file(file, level, Some(&sink), &context_for(privacy, out));
    pb.finish_and_clear();
    let report = result?;

    println!(
        "compressed: {} -> {} ({} -> {} bytes, compression ratio {:.1}%)",
        report.input.display(),
        report.output.display(),
        report.bytes_in,
        report.bytes_out,
        report.ratio.unwrap_or_default(),
    );
    Ok(())
}

fn cmd_decompress(privacy: PrivacyMode, file: &Path, out: &OutputArgs) -> Result<()> {
    validate::input_file(file)?;

    let pb = make_progress_bar("decompress");
    let sink = progress_sink(&pb);
    let result = filelock_pipeline::decompress_file(file, Some(&sink), &context_for(privacy, out));
    pb.finish_and_clear();
    let report = result?;

    println!(
        "decompressed: {} -> {} ({} bytes)",
        report.input.display(),
        report.output.display(),
        report.bytes_out
    );
    Ok(())
}

fn cmd_inspect(file: &Path, json: bool) -> Result<()> {
    validate::input_file(file)?;
    let info = filelock_pipeline::inspect_secured_file(file)?;

    if json {
        let rendered = serde_json::to_string_pretty(&info).context("serializing inspect output")?;
        println!("{rendered}");
        return Ok(());
    }

    println!("file:              {}", file.display());
    println!("compression level: {}", info.level);
    println!("container size:    {} bytes", info.container_bytes);
    println!("payload size:      {} bytes", info.payload_bytes);
    println!("compression ratio: {:.1}%", info.compression_ratio);
    println!("outer sha256:      {}", info.outer_hash);
    println!("salt:              {}", info.salt);
    println!("iv:                {}", info.iv);
    println!("plaintext sha256:  {}", info.plaintext_hash);
    println!("ciphertext size:   {} bytes", info.ciphertext_bytes);
    Ok(())
}

fn cmd_config_show(config: &FilelockConfig, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("# Configuration from: {}", config_path.display());
    } else {
        println!("# Configuration: defaults (no file at {})", config_path.display());
    }
    println!();
    let rendered = toml::to_string_pretty(config).context("serializing config to TOML")?;
    print!("{rendered}");
    Ok(())
}
