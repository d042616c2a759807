//! Study Hall CLI entry point

use clap::Parser;
use studyhall_cli::{Cli, CliOverrides, Config, ExitCode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let config = match Config::load_from(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Config error: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    let overrides = CliOverrides {
        output_format: cli.output.map(|f| f.to_string()),
        verbose: if cli.verbose { Some(true) } else { None },
        debug: if cli.debug { Some(true) } else { None },
        identity_path: cli.identity_file.clone(),
    };
    let config = config.with_overrides(&overrides);

    // Logs go to stderr so JSON on stdout stays parseable.
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.execute_with_config(config) {
        Ok(code) => code.to_exit_code(),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::GeneralError.to_exit_code()
        }
    }
}
