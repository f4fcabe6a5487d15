// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! votc - the Valley of the Commons game master.
//!
//! This is the binary entry point: the relay server, the terminal client,
//! and operator diagnostics.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod doctor;
mod serve;
mod shell;
mod shutdown;

use clap::{Parser, Subcommand};
use colored::Colorize;
use votc_config::{Credentials, VotcConfig};

/// votc - the Valley of the Commons game master.
#[derive(Parser, Debug)]
#[command(name = "votc", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the relay server.
    Serve,
    /// Talk to the game master from the terminal.
    Shell {
        /// Relay origin. Defaults to the configured server address.
        #[arg(long)]
        url: Option<String>,
    },
    /// Check configuration, credentials, and upstream reachability.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Manage votc configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Load and validate the configuration, then report credential status.
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match votc_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            votc_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => {
            init_tracing(&config.server.log_level);
            serve::run_serve(config).await
        }
        Some(Commands::Shell { url }) => {
            init_tracing("warn");
            shell::run_shell(&config, url).await
        }
        Some(Commands::Doctor { plain }) => doctor::run_doctor(&config, plain).await,
        Some(Commands::Config {
            action: ConfigCommands::Check,
        }) => {
            config_check(&config);
            Ok(())
        }
        None => {
            println!("votc: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber. `RUST_LOG` overrides the level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("votc={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

fn config_check(config: &VotcConfig) {
    println!("{}", "configuration valid".green());
    println!("  server      {}:{} ({})", config.server.host, config.server.port, config.server.environment);
    println!("  model       {}", config.completion.model);
    println!(
        "  repository  {}/{}@{}",
        config.github.owner, config.github.repo, config.github.branch
    );

    let credentials = Credentials::from_config(config);
    let present = |set: bool| if set { "set".green() } else { "missing".yellow() };
    println!("  completion key   {}", present(credentials.completion_key.is_some()));
    println!("  github token     {}", present(credentials.github_token.is_some()));
    println!("  service account  {}", present(credentials.service_account.is_some()));
    for warning in credentials.warnings() {
        println!("  {} {warning}", "warning:".yellow());
    }
}
