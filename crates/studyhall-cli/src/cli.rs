//! CLI command definitions and argument parsing

use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use studyhall_crypto::{decrypt_from_peer, encrypt_for_peer, CodecError};
use tracing::debug;

use crate::config::Config;
use crate::identity::{IdentityError, IdentityExport, IdentityStore};
use crate::output::{OutputFormat, OutputFormatter};
use crate::ExitCode;

/// Study Hall CLI - chat key management and peer message encryption
#[derive(Parser, Debug)]
#[command(name = "studyhall")]
#[command(version, about = "Study Hall CLI - chat keys and peer message encryption")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: table, json, quiet (default from config)
    #[arg(long, global = true)]
    pub output: Option<OutputFormat>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Config file path
    #[arg(long, global = true, env = "STUDYHALL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Identity file path (overrides identity.path)
    #[arg(long, global = true, env = "STUDYHALL_IDENTITY")]
    pub identity_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a chat key pair and store it
    Keygen(KeygenArgs),
    /// Show or export the stored identity
    Identity(IdentityArgs),
    /// Encrypt a message for a peer
    Encrypt(EncryptArgs),
    /// Decrypt a message from a peer
    Decrypt(DecryptArgs),
    /// Show or create the config file
    Config(ConfigArgs),
}

#[derive(Parser, Debug)]
pub struct KeygenArgs {
    /// Replace an existing identity
    #[arg(long)]
    pub force: bool,
}

#[derive(Parser, Debug)]
pub struct IdentityArgs {
    #[command(subcommand)]
    pub command: IdentityCommands,
}

#[derive(Subcommand, Debug)]
pub enum IdentityCommands {
    /// Show the public key and creation time
    Show,
    /// Print the public identity as JSON for sharing
    Export,
}

#[derive(Parser, Debug)]
pub struct EncryptArgs {
    /// Recipient's public key (hex)
    #[arg(long)]
    pub peer: String,

    /// Message text (read from stdin if omitted)
    #[arg(long)]
    pub text: Option<String>,
}

#[derive(Parser, Debug)]
pub struct DecryptArgs {
    /// Sender's public key (hex)
    #[arg(long)]
    pub peer: String,

    /// Envelope produced by `encrypt` (hex)
    #[arg(long)]
    pub ciphertext: String,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Write the sample config to the config path
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// Execute the command with a resolved configuration.
    pub fn execute_with_config(self, config: Config) -> anyhow::Result<ExitCode> {
        let format = self
            .output
            .unwrap_or_else(|| config.output.format.parse().unwrap_or_default());
        let out = OutputFormatter::new(format, config.output.verbose);

        match self.command {
            Commands::Keygen(args) => args.execute(&out, &config),
            Commands::Identity(args) => args.execute(&out, &config),
            Commands::Encrypt(args) => args.execute(&out, &config),
            Commands::Decrypt(args) => args.execute(&out, &config),
            Commands::Config(args) => args.execute(&out, &config, self.config),
        }
    }
}

impl KeygenArgs {
    pub fn execute(self, out: &OutputFormatter, config: &Config) -> anyhow::Result<ExitCode> {
        let store = IdentityStore::from_config(&config.identity)?;
        out.progress(&format!("writing identity to {}", store.path().display()));
        match store.generate(self.force) {
            Ok(info) => {
                out.success("Generated new chat identity");
                emit(&out.format_identity(&info, "keygen"));
                Ok(ExitCode::Success)
            }
            Err(e @ IdentityError::AlreadyExists(_)) => Ok(fail(out, &e, ExitCode::InvalidInput)),
            Err(e) => Err(e.into()),
        }
    }
}

impl IdentityArgs {
    pub fn execute(self, out: &OutputFormatter, config: &Config) -> anyhow::Result<ExitCode> {
        let store = IdentityStore::from_config(&config.identity)?;
        let info = match store.load() {
            Ok((_, info)) => info,
            Err(e) => return identity_failure(out, e),
        };
        match self.command {
            IdentityCommands::Show => emit(&out.format_identity(&info, "identity show")),
            IdentityCommands::Export => emit(&out.format_export(&IdentityExport::from(&info))),
        }
        Ok(ExitCode::Success)
    }
}

impl EncryptArgs {
    pub fn execute(self, out: &OutputFormatter, config: &Config) -> anyhow::Result<ExitCode> {
        let store = IdentityStore::from_config(&config.identity)?;
        let pair = match store.load() {
            Ok((pair, _)) => pair,
            Err(e) => return identity_failure(out, e),
        };

        let text = match self.text {
            Some(text) => text,
            None => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf.trim_end_matches(['\r', '\n']).to_string()
            }
        };

        let private_hex = pair.secret_key().to_hex();
        match encrypt_for_peer(&text, &self.peer, &private_hex) {
            Ok(message) => {
                debug!(bytes = text.len(), "encrypted message");
                emit(&out.format_encrypted(&message));
                Ok(ExitCode::Success)
            }
            Err(e) => Ok(codec_failure(out, &e)),
        }
    }
}

impl DecryptArgs {
    pub fn execute(self, out: &OutputFormatter, config: &Config) -> anyhow::Result<ExitCode> {
        let store = IdentityStore::from_config(&config.identity)?;
        let pair = match store.load() {
            Ok((pair, _)) => pair,
            Err(e) => return identity_failure(out, e),
        };

        let private_hex = pair.secret_key().to_hex();
        match decrypt_from_peer(&self.ciphertext, &self.peer, &private_hex) {
            Ok(text) => {
                emit(&out.format_decrypted(&text));
                Ok(ExitCode::Success)
            }
            Err(e) => Ok(codec_failure(out, &e)),
        }
    }
}

impl ConfigArgs {
    pub fn execute(
        self,
        out: &OutputFormatter,
        config: &Config,
        explicit_path: Option<PathBuf>,
    ) -> anyhow::Result<ExitCode> {
        let path = explicit_path.or_else(Config::default_path);
        match self.command {
            ConfigCommands::Show => {
                emit(&out.format_config(config, path.as_deref()));
                Ok(ExitCode::Success)
            }
            ConfigCommands::Init { force } => {
                let Some(path) = path else {
                    anyhow::bail!("no default config directory on this platform; pass --config");
                };
                if path.exists() && !force {
                    let msg = format!("config already exists at {}; pass --force to replace it", path.display());
                    return Ok(fail(out, &msg, ExitCode::InvalidInput));
                }
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, Config::sample_toml())?;
                out.success(&format!("Wrote {}", path.display()));
                Ok(ExitCode::Success)
            }
        }
    }
}

/// Exit code for a codec error: tamper and wrong keys stay indistinguishable.
pub fn codec_exit_code(err: &CodecError) -> ExitCode {
    if err.is_decryption_failure() {
        ExitCode::DecryptionFailed
    } else if err.is_malformed_input() || matches!(err, CodecError::InvalidKey(_)) {
        ExitCode::InvalidInput
    } else {
        ExitCode::GeneralError
    }
}

fn codec_failure(out: &OutputFormatter, err: &CodecError) -> ExitCode {
    fail(out, err, codec_exit_code(err))
}

fn identity_failure(out: &OutputFormatter, err: IdentityError) -> anyhow::Result<ExitCode> {
    match err {
        IdentityError::NotFound(_) => Ok(fail(out, &err, ExitCode::IdentityMissing)),
        other => Err(other.into()),
    }
}

fn fail(out: &OutputFormatter, err: &dyn std::fmt::Display, code: ExitCode) -> ExitCode {
    if out.is_quiet() {
        return code;
    }
    let msg = out.format_error_with_code(err, code);
    if out.format() == OutputFormat::Json {
        println!("{msg}");
    } else {
        eprintln!("{msg}");
    }
    code
}

fn emit(s: &str) {
    if !s.is_empty() {
        println!("{s}");
    }
}
