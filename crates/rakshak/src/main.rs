// SPDX-FileCopyrightText: 2026 Rakshak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rakshak - a citizen-facing scam-defense honeypot agent.
//!
//! Binary entry point. The engagement engine lives in the library crates;
//! this is a thin I/O wrapper around it.

mod bait;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Rakshak - a citizen-facing scam-defense honeypot agent.
#[derive(Parser, Debug)]
#[command(name = "rakshak", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run an interactive bait session against the honeypot agent.
    Bait {
        /// Seed adversary message (the confirmed scam message that opened
        /// the case). Prompted for interactively when omitted.
        #[arg(long)]
        seed: Option<String>,
    },
    /// Print the resolved configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match rakshak_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            rakshak_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    // RUST_LOG wins over the configured level when set.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.agent.log_level.clone()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Bait { seed }) => {
            if let Err(e) = bait::run_bait(config, seed).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => {
            print_config(&config);
        }
        None => {
            println!("rakshak: use --help for available commands");
        }
    }
}

/// Prints the resolved configuration as TOML with the API key redacted.
fn print_config(config: &rakshak_config::RakshakConfig) {
    let mut redacted = config.clone();
    if redacted.gemini.api_key.is_some() {
        redacted.gemini.api_key = Some("<redacted>".to_string());
    }
    match toml::to_string_pretty(&redacted) {
        Ok(rendered) => print!("{rendered}"),
        Err(e) => eprintln!("error: failed to render config: {e}"),
    }
}
