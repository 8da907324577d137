// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Herald - durable campaign dispatch service.
//!
//! This is the binary entry point for the Herald dispatcher.

use clap::{Parser, Subcommand};

mod enqueue;
mod serve;
mod shutdown;

/// Herald - durable campaign dispatch service.
#[derive(Parser, Debug)]
#[command(name = "herald", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the dispatch service.
    Serve,
    /// Enqueue a single campaign item, for operations and smoke testing.
    Enqueue(enqueue::EnqueueArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match herald_config::load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("herald: invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let outcome = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Enqueue(args)) => enqueue::run_enqueue(config, args).await,
        None => {
            println!("herald: use --help for available commands");
            return;
        }
    };

    if let Err(e) = outcome {
        eprintln!("herald: {e}");
        std::process::exit(1);
    }
}
