//! defcache CLI
//!
//! Command-line tools for defcache data directories.
//!
//! # Commands
//!
//! - `inspect` - Display per-kind definition and index statistics
//! - `lookup` - Show which definitions apply to an item
//! - `verify` - Report unreachable definitions and unknown tags

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// defcache command-line data tools.
#[derive(Parser)]
#[command(name = "defcache")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the data directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Namespace for ids derived from file names
    #[arg(global = true, short, long)]
    namespace: Option<String>,

    /// Fail on the first malformed or invalid data file
    #[arg(global = true, long)]
    strict: bool,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display per-kind definition and index statistics
    Inspect {
        /// List definitions no item can reach
        #[arg(short, long)]
        unreachable: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show which definitions apply to an item
    Lookup {
        /// Item id, e.g. `minecraft:coal`
        item: String,

        /// Stack size to query with
        #[arg(short, long, default_value = "1")]
        count: u32,

        /// List every candidate, not only the winner
        #[arg(short, long)]
        all: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Report unreachable definitions and unknown tags
    Verify,

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let namespace = cli.namespace.as_deref();
    match cli.command {
        Commands::Inspect {
            unreachable,
            format,
        } => {
            let path = cli.path.ok_or("Data directory path required for inspect")?;
            let definitions = commands::open(&path, namespace, cli.strict)?;
            commands::inspect::run(&path, &definitions, unreachable, &format)?;
        }
        Commands::Lookup {
            item,
            count,
            all,
            format,
        } => {
            let path = cli.path.ok_or("Data directory path required for lookup")?;
            let definitions = commands::open(&path, namespace, cli.strict)?;
            commands::lookup::run(&definitions, &item, count, all, &format)?;
        }
        Commands::Verify => {
            let path = cli.path.ok_or("Data directory path required for verify")?;
            let definitions = commands::open(&path, namespace, cli.strict)?;
            commands::verify::run(&path, &definitions)?;
        }
        Commands::Version => {
            println!("defcache CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("defcache core v{}", defcache_core::VERSION);
        }
    }

    Ok(())
}
