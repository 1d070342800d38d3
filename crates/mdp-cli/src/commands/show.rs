//! Print a parsed model

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use mdp_core::format;

use super::load_model;
use crate::config::Config;
use crate::report::{model_json, model_text};

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    /// Model file in the five-line MDP format
    pub file: PathBuf,

    /// Print the normalized five-line form instead of tables
    #[arg(long)]
    pub canonical: bool,
}

pub fn run(args: &ShowArgs, config: &Config) -> Result<()> {
    let mdp = load_model(&args.file, config)?;

    if args.canonical {
        print!("{}", format::write(&mdp));
    } else if config.output.json {
        println!("{}", model_json(&mdp)?);
    } else {
        println!("{}", model_text(&mdp, config.output.precision));
    }
    Ok(())
}
