//! Output formatting for CLI results
//!
//! Three formats:
//! - Table: human-readable tables (default)
//! - JSON: structured output for scripting
//! - Quiet: nothing but the exit code

use std::str::FromStr;

use comfy_table::{presets::UTF8_FULL, Table};
use serde::Serialize;
use studyhall_crypto::EncryptedMessage;

use crate::config::Config;
use crate::identity::{IdentityExport, IdentityInfo};
use crate::ExitCode;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Quiet,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "quiet" => Ok(Self::Quiet),
            _ => Err(format!("Unknown output format: {s}")),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
            Self::Quiet => write!(f, "quiet"),
        }
    }
}

/// Standard JSON response wrapper
#[derive(Serialize)]
pub struct JsonResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<&'static str>,
    /// RFC 3339 timestamp
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

impl<T: Serialize> JsonResponse<T> {
    pub fn success_with_command(data: T, command: &str) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            exit_code: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
            command: Some(command.to_string()),
        }
    }
}

impl JsonResponse<()> {
    pub fn error(message: &str, code: ExitCode) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.to_string()),
            exit_code: Some(code.name()),
            timestamp: chrono::Utc::now().to_rfc3339(),
            command: None,
        }
    }
}

#[derive(Serialize)]
struct DecryptedOutput<'a> {
    plaintext: &'a str,
}

#[derive(Serialize)]
struct ConfigOutput<'a> {
    path: Option<String>,
    config: &'a Config,
}

pub struct OutputFormatter {
    format: OutputFormat,
    verbose: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_quiet(&self) -> bool {
        self.format == OutputFormat::Quiet
    }

    pub fn format_identity(&self, info: &IdentityInfo, command: &str) -> String {
        match self.format {
            OutputFormat::Table => {
                let mut table = Table::new();
                table.load_preset(UTF8_FULL);
                table.set_header(vec!["Property", "Value"]);
                table.add_row(vec!["Public Key", &info.public_key]);
                table.add_row(vec!["Algorithm", info.algorithm]);
                table.add_row(vec!["Created At", &info.created_at.to_rfc3339()]);
                if self.verbose {
                    table.add_row(vec!["File", &info.path.display().to_string()]);
                }
                table.to_string()
            }
            OutputFormat::Json => self.to_json_response(info, command),
            OutputFormat::Quiet => String::new(),
        }
    }

    /// Public export: bare JSON in every non-quiet format so it can be piped.
    pub fn format_export(&self, export: &IdentityExport) -> String {
        match self.format {
            OutputFormat::Table => self.to_json(export),
            OutputFormat::Json => self.to_json_response(export, "identity export"),
            OutputFormat::Quiet => String::new(),
        }
    }

    pub fn format_encrypted(&self, message: &EncryptedMessage) -> String {
        match self.format {
            OutputFormat::Table => {
                if self.verbose {
                    format!("{}\n(algorithm: {})", message.ciphertext, message.algorithm)
                } else {
                    message.ciphertext.clone()
                }
            }
            OutputFormat::Json => self.to_json_response(message, "encrypt"),
            OutputFormat::Quiet => String::new(),
        }
    }

    pub fn format_decrypted(&self, plaintext: &str) -> String {
        match self.format {
            OutputFormat::Table => plaintext.to_string(),
            OutputFormat::Json => self.to_json_response(&DecryptedOutput { plaintext }, "decrypt"),
            OutputFormat::Quiet => String::new(),
        }
    }

    pub fn format_config(&self, config: &Config, path: Option<&std::path::Path>) -> String {
        match self.format {
            OutputFormat::Table => {
                let mut table = Table::new();
                table.load_preset(UTF8_FULL);
                table.set_header(vec!["Setting", "Value"]);
                table.add_row(vec![
                    "config file".to_string(),
                    path.map(|p| p.display().to_string()).unwrap_or_else(|| "-".to_string()),
                ]);
                table.add_row(vec![
                    "identity.path".to_string(),
                    config
                        .identity
                        .path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "(default)".to_string()),
                ]);
                table.add_row(vec!["output.format".to_string(), config.output.format.clone()]);
                table.add_row(vec!["output.verbose".to_string(), config.output.verbose.to_string()]);
                table.add_row(vec!["logging.level".to_string(), config.logging.level.clone()]);
                table.to_string()
            }
            OutputFormat::Json => self.to_json_response(
                &ConfigOutput {
                    path: path.map(|p| p.display().to_string()),
                    config,
                },
                "config show",
            ),
            OutputFormat::Quiet => String::new(),
        }
    }

    pub fn format_error_with_code(&self, error: &dyn std::fmt::Display, code: ExitCode) -> String {
        match self.format {
            OutputFormat::Table => format!("Error: {error}"),
            OutputFormat::Json => self.to_json(&JsonResponse::error(&error.to_string(), code)),
            OutputFormat::Quiet => String::new(),
        }
    }

    /// Progress message (verbose table mode only, to stderr)
    pub fn progress(&self, message: &str) {
        if self.verbose && self.format == OutputFormat::Table {
            eprintln!("... {message}");
        }
    }

    pub fn success(&self, message: &str) {
        if self.format == OutputFormat::Table {
            println!("✓ {message}");
        }
    }

    fn to_json<T: Serialize + ?Sized>(&self, value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }

    fn to_json_response<T: Serialize>(&self, value: &T, command: &str) -> String {
        self.to_json(&JsonResponse::success_with_command(value, command))
    }
}
