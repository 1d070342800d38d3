//! MDP CLI - solve finite Markov Decision Processes from model files
//!
//! Reads the five-line MDP format and runs policy evaluation, value
//! iteration or policy iteration, printing values and greedy policies.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::float_cmp)]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod report;

use commands::evaluate::EvaluateArgs;
use commands::policy_iteration::PolicyIterationArgs;
use commands::show::ShowArgs;
use commands::SolveArgs;
use crate::config::{Config, Overrides};

#[derive(Parser)]
#[command(name = "mdp")]
#[command(author, version, about = "MDP - dynamic-programming solvers for finite MDPs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Configuration file (default: $MDP_CONFIG, ./mdp.toml, ~/.config/mdp/mdp.toml)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Accept models that omit rewards for unavailable actions
    #[arg(long, global = true)]
    sparse_rewards: bool,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a fixed policy
    Evaluate(EvaluateArgs),

    /// Find optimal values by value iteration
    ValueIteration(SolveArgs),

    /// Find an optimal policy by policy iteration
    PolicyIteration(PolicyIterationArgs),

    /// Print a parsed model
    Show(ShowArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(commands::config::ConfigCommands),
}

fn init_logging(verbose: bool, json: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("mdp_cli={log_level},mdp_rl={log_level},mdp_core={log_level}").into()
    });

    // stdout carries results; logs go to stderr
    let (plain, structured) = if json {
        (None, Some(fmt::layer().json().with_writer(std::io::stderr)))
    } else {
        (Some(fmt::layer().with_writer(std::io::stderr)), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(structured)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.log_json);

    let source = cli.config.clone().or_else(Config::find_config_file);
    let mut config = Config::load(source.as_deref())?;
    config.apply(&Overrides {
        sparse_rewards: cli.sparse_rewards,
        json: cli.json,
        ..Overrides::default()
    })?;

    match &cli.command {
        Commands::Evaluate(args) => commands::evaluate::run(args, &config),
        Commands::ValueIteration(args) => commands::value_iteration::run(args, &config),
        Commands::PolicyIteration(args) => commands::policy_iteration::run(args, &config),
        Commands::Show(args) => commands::show::run(args, &config),
        Commands::Config(cmd) => commands::config::run(cmd, &config, source.as_deref()),
    }
}
