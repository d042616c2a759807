//! Study Hall CLI - chat key management for operators
//!
//! This crate provides a command-line interface for:
//! - Generating and storing a chat key pair
//! - Showing and exporting the public identity
//! - Encrypting and decrypting peer messages by hand

pub mod cli;
pub mod config;
pub mod identity;
pub mod output;

pub use cli::Cli;
pub use config::{CliOverrides, Config};
pub use output::{JsonResponse, OutputFormat, OutputFormatter};

/// Exit codes for CLI operations
///
/// - 0: Success
/// - 1: General error
/// - 2: Decryption failed (tampered, wrong keys)
/// - 3: Invalid input (malformed hex, bad arguments)
/// - 4: No identity stored yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    DecryptionFailed = 2,
    InvalidInput = 3,
    IdentityMissing = 4,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl ExitCode {
    /// Convert to process exit code
    pub fn to_exit_code(self) -> std::process::ExitCode {
        std::process::ExitCode::from(self as u8)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExitCode::Success => "SUCCESS",
            ExitCode::GeneralError => "GENERAL_ERROR",
            ExitCode::DecryptionFailed => "DECRYPTION_FAILED",
            ExitCode::InvalidInput => "INVALID_INPUT",
            ExitCode::IdentityMissing => "IDENTITY_MISSING",
        }
    }
}
