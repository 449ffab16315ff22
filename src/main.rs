//! # Wolf Search CLI (`wolf`)
//!
//! ## Usage
//!
//! ```bash
//! wolf --config ./config/wolf.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `wolf classify "<input>"` | Show whether input navigates or searches (no config needed) |
//! | `wolf search "<input>"` | Classify and search once |
//! | `wolf build` | Build `documents.json` from the docs directory |
//! | `wolf serve` | Start the HTTP search server and search page |
//! | `wolf repl` | Interactive search over stdin |
//!
//! ## Examples
//!
//! ```bash
//! # Build the document collection, then query it
//! wolf build --config ./config/wolf.toml
//! wolf search "borrow checker" --config ./config/wolf.toml
//!
//! # Render results as the search page would
//! wolf search "ownership" --html --limit 5
//!
//! # URLs and bare domains are never searched
//! wolf classify "example.com/docs"
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use wolf_search::{config, corpus, repl, search, server};
use wolf_search_core::classify::{classify, Classification};

/// Wolf Search: a private, local-first search box that tells URLs from
/// queries.
#[derive(Parser)]
#[command(
    name = "wolf",
    about = "Wolf Search — a private, local-first search box with URL detection",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/wolf.toml`. See `config/wolf.example.toml`.
    #[arg(long, global = true, default_value = "./config/wolf.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify input as navigation or search without running it.
    Classify {
        /// Raw input, as typed into the search box.
        input: String,
    },

    /// Classify input and run it once against the configured backend.
    ///
    /// URLs are printed as navigation targets; everything else is searched
    /// as `input*`, retried once with special characters stripped on error.
    Search {
        /// Raw input, as typed into the search box.
        input: String,

        /// Print the HTML the search page would show.
        #[arg(long)]
        html: bool,

        /// Maximum number of results to print.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Build the document collection from `[build].docs_dir`.
    Build,

    /// Serve the search page and `/api/search` over the configured collection.
    Serve,

    /// Read input from stdin, one line per edit of the search box.
    ///
    /// Lines are debounced by `search.debounce_ms`; `:go <text>` searches at
    /// once, `:clear` clears, `:quit` exits.
    Repl {
        /// Print results as HTML.
        #[arg(long)]
        html: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Commands that don't require config
    if let Commands::Classify { input } = &cli.command {
        match classify(input) {
            Classification::Empty => println!("Empty"),
            Classification::Navigate(url) => println!("Navigate: {}", url),
            Classification::Search(query) => println!("Search: {}", query),
        }
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Classify { .. } => {}
        Commands::Search { input, html, limit } => {
            search::run_search(&cfg, &input, html, limit).await?;
        }
        Commands::Build => {
            corpus::run_build(&cfg)?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Repl { html } => {
            repl::run_repl(&cfg, html).await?;
        }
    }

    Ok(())
}
