// Copyright 2026 Storeprobe Contributors
// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

mod acquisition;
mod auditor;
mod cache;
mod cli;
mod config;
mod extraction;
mod journal;
mod renderer;
mod scoring;
mod site;

#[derive(Parser)]
#[command(
    name = "storeprobe",
    about = "Storeprobe — agent-readiness auditor for e-commerce product pages",
    version,
    after_help = "Run 'storeprobe <command> --help' for details on each command."
)]
struct Cli {
    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit a product page for agent readiness
    Audit {
        /// Product page URL to audit
        url: String,
        /// Output the result as JSON (machine-readable)
        #[arg(long)]
        json: bool,
        /// Bypass the cache and fetch a fresh copy
        #[arg(long)]
        fresh: bool,
    },
    /// Check environment and diagnose issues
    Doctor,
    /// Manage cached audit results
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Remove every cached audit result
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        "storeprobe=debug"
    } else {
        "storeprobe=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Audit { url, json, fresh } => cli::audit_cmd::run(&url, json, fresh).await,
        Commands::Doctor => cli::doctor::run().await,
        Commands::Cache { action } => match action {
            CacheAction::Clear => cli::cache_cmd::run_clear().await,
        },
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "storeprobe", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        eprintln!("  Error: {e:#}");
        std::process::exit(1);
    }

    result
}
