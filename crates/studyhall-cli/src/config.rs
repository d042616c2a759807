//! Configuration for the studyhall CLI
//!
//! Stored as TOML at the platform config location:
//!
//! - Unix: `~/.config/studyhall/cli.toml`
//! - Windows: `%APPDATA%\studyhall\cli.toml`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::output::OutputFormat;

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("config file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot encode config: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("{field} = {value:?} is not allowed ({hint})")]
    Invalid {
        field: &'static str,
        value: String,
        hint: String,
    },
}

/// Settings read from `cli.toml`. Every section is optional; see
/// [`Config::sample_toml`] for the annotated file `config init` writes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub identity: IdentityConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Path to the identity file (unset = default location)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format: "table", "json", "quiet"
    #[serde(default = "default_format")]
    pub format: String,

    #[serde(default)]
    pub verbose: bool,
}

fn default_format() -> String {
    "table".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            verbose: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the default location, or defaults if no file exists.
    pub fn load_default() -> Result<Self, ConfigError> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::load(&path);
            }
        }
        Ok(Self::default())
    }

    pub fn load_from(custom_path: Option<&Path>) -> Result<Self, ConfigError> {
        match custom_path {
            Some(path) => Self::load(path),
            None => Self::load_default(),
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("cli.toml"))
    }

    /// Data directory (identity file lives here by default)
    pub fn data_dir() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the CLI cannot act on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Err(hint) = self.output.format.parse::<OutputFormat>() {
            return Err(ConfigError::Invalid {
                field: "output.format",
                value: self.output.format.clone(),
                hint,
            });
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Invalid {
                field: "logging.level",
                value: self.logging.level.clone(),
                hint: format!("one of {}", LOG_LEVELS.join(", ")),
            });
        }

        match &self.identity.path {
            Some(path) if path.as_os_str().is_empty() => Err(ConfigError::Invalid {
                field: "identity.path",
                value: String::new(),
                hint: "omit it to keep the key pair in the data directory".to_string(),
            }),
            _ => Ok(()),
        }
    }

    pub fn sample_toml() -> &'static str {
        r#"# studyhall: chat key management and peer message encryption

[identity]
# Where `studyhall keygen` stores the X25519 key pair. The file holds the
# private key and is created with mode 0600. Omit to use the data directory.
# path = "/home/me/.local/share/studyhall/identity.json"

[output]
# "table" prints bare ciphertext/plaintext, "json" wraps every result with
# success, exit_code and timestamp, "quiet" leaves only the exit code.
format = "table"
# Show the identity file path and the algorithm tag.
verbose = false

[logging]
# Diagnostics go to stderr. Plaintext and private keys are never logged.
level = "warn"
"#
    }

    /// Apply CLI overrides. Command-line values win over the file.
    pub fn with_overrides(mut self, overrides: &CliOverrides) -> Self {
        if let Some(ref format) = overrides.output_format {
            self.output.format = format.clone();
        }
        if let Some(verbose) = overrides.verbose {
            self.output.verbose = verbose;
        }
        if overrides.debug == Some(true) {
            self.logging.level = "debug".to_string();
        }
        if let Some(ref path) = overrides.identity_path {
            self.identity.path = Some(path.clone());
        }
        self
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("app", "studyhall", "studyhall")
}

/// CLI flags that override config file values
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub output_format: Option<String>,
    pub verbose: Option<bool>,
    pub debug: Option<bool>,
    pub identity_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.identity.path.is_none());
        assert_eq!(config.output.format, "table");
        assert!(!config.output.verbose);
        assert_eq!(config.logging.level, "warn");
        assert!(config.validate().is_ok());
    }

    fn rejected_field(config: &Config) -> &'static str {
        match config.validate() {
            Err(ConfigError::Invalid { field, .. }) => field,
            other => panic!("expected a rejected field, got {other:?}"),
        }
    }

    #[test]
    fn test_each_bad_setting_names_its_field() {
        let mut config = Config::default();
        config.output.format = "xml".to_string();
        assert_eq!(rejected_field(&config), "output.format");
        assert!(config.validate().unwrap_err().to_string().contains("\"xml\""));

        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert_eq!(rejected_field(&config), "logging.level");

        let mut config = Config::default();
        config.identity.path = Some(PathBuf::new());
        assert_eq!(rejected_field(&config), "identity.path");
    }

    #[test]
    fn test_saved_identity_path_survives_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("cli.toml");

        let mut config = Config::default();
        config.output.format = "json".to_string();
        config.identity.path = Some(temp_dir.path().join("id.json"));
        config.save(&path).unwrap();

        let loaded = Config::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.output.format, "json");
        assert_eq!(loaded.identity.path, config.identity.path);
    }

    #[test]
    fn test_load_reports_bad_values_and_bad_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cli.toml");
        std::fs::write(&path, "[logging]\nlevel = \"chatty\"\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Invalid { field: "logging.level", .. })));

        std::fs::write(&path, "[logging\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_flags_override_file_values() {
        let overrides = CliOverrides {
            output_format: Some("quiet".to_string()),
            verbose: Some(true),
            debug: Some(true),
            identity_path: Some(PathBuf::from("/tmp/id.json")),
        };
        let config = Config::default().with_overrides(&overrides);
        assert_eq!(config.output.format, "quiet");
        assert!(config.output.verbose);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.identity.path, Some(PathBuf::from("/tmp/id.json")));
    }

    #[test]
    fn test_absent_flags_keep_file_values() {
        let config = Config::default().with_overrides(&CliOverrides::default());
        assert_eq!(config.output.format, "table");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let config: Config = toml::from_str("[output]\nformat = \"json\"\n").unwrap();
        assert_eq!(config.output.format, "json");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_written_sample_passes_validation() {
        let config: Config = toml::from_str(Config::sample_toml()).unwrap();
        assert!(config.validate().is_ok());
    }
}
