//! ferrule CLI
//!
//! AES-128-GCM seal/open command-line tool.

mod commands;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use commands::{check_mode, open_file, seal_file, show_info, Backend, CryptArgs};
use std::path::PathBuf;

// =============================================================================
// CLI DEFINITION
// =============================================================================

#[derive(Parser)]
#[command(name = "ferrule")]
#[command(about = "AES-128-GCM authenticated encryption using AES-NI + PCLMULQDQ", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Cipher backend to use
    #[arg(short, long, value_enum, default_value_t = Backend::Auto, global = true)]
    backend: Backend,

    /// More log output (-v debug, -vv trace); `RUST_LOG` overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt, writing ciphertext followed by the 16-byte tag
    Seal(CryptArgs),
    /// Verify the trailing 16-byte tag, then decrypt
    Open(CryptArgs),
    /// Verify test vectors from a JSON file
    Check {
        #[arg(value_name = "FILE")]
        vector_file: PathBuf,
    },
    /// Show backend selection and CPU support
    Info,
}

// =============================================================================
// ENTRY POINT
// =============================================================================

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Seal(args) => seal_file(args, cli.backend)?,
        Commands::Open(args) => open_file(args, cli.backend)?,
        Commands::Check { vector_file } => check_mode(vector_file, cli.backend)?,
        Commands::Info => show_info(cli.backend),
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();
}
