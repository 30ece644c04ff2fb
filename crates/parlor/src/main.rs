// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parlor - usage-gated storefront chat-widget backend.
//!
//! This is the binary entry point for the Parlor service.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};

mod doctor;
mod serve;

/// Parlor - usage-gated storefront chat-widget backend.
#[derive(Parser, Debug)]
#[command(name = "parlor", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Parlor gateway server.
    Serve,
    /// Check configuration and storage health.
    Doctor,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match parlor_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            parlor_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.server.log_level);

    let result = match cli.command {
        Some(Commands::Serve) | None => serve::run(&config).await,
        Some(Commands::Doctor) => doctor::run(&config).await,
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "parlor exited with error");
        std::process::exit(1);
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
