// reliefmap CLI - builds relief-operations maps from CSV exports

mod exit_codes;
mod loader;
mod map;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::EXIT_SUCCESS;
use map::OutputOptions;

#[derive(Parser)]
#[command(name = "rmap")]
#[command(about = "Relief-operations map builder (headless)")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the map from a TOML config and its CSV sources
    #[command(after_help = "\
Examples:
  rmap run relief.map.toml
  rmap run relief.map.toml --json
  rmap run relief.map.toml --output map.json
  rmap run relief.map.toml --strict --fingerprint")]
    Run {
        /// Path to the .map.toml config file
        config: PathBuf,

        /// Output JSON to stdout instead of the fingerprint line
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Fail (exit 5) when every source failed and the map is synthetic
        #[arg(long)]
        strict: bool,

        /// Include a SHA-256 of the result for byte-for-byte comparisons
        #[arg(long)]
        fingerprint: bool,
    },

    /// Validate a map config without running
    #[command(after_help = "\
Examples:
  rmap validate relief.map.toml")]
    Validate {
        /// Path to the .map.toml config file
        config: PathBuf,
    },

    /// Emit the synthetic fallback map
    #[command(after_help = "\
Examples:
  rmap fallback --json
  rmap fallback --seed 7 --output synthetic.json")]
    Fallback {
        /// Seed for the synthetic distributions
        #[arg(long)]
        seed: Option<u64>,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Include a SHA-256 of the result
        #[arg(long)]
        fingerprint: bool,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            "\npipeline: reliefmap-pipeline ", env!("CARGO_PKG_VERSION"),
            "\nbuild:    debug",
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            "\npipeline: reliefmap-pipeline ", env!("CARGO_PKG_VERSION"),
            "\nbuild:    release",
        )
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: rmap <command> [options]");
            eprintln!("       rmap --help for more information");
            Ok(())
        }
        Some(Commands::Run { config, json, output, strict, fingerprint }) => {
            map::cmd_run(config, OutputOptions { json, output, fingerprint }, strict)
        }
        Some(Commands::Validate { config }) => map::cmd_validate(config),
        Some(Commands::Fallback { seed, json, output, fingerprint }) => {
            map::cmd_fallback(seed, OutputOptions { json, output, fingerprint })
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
