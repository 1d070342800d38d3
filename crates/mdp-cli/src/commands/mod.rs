//! CLI command modules

pub mod config;
pub mod evaluate;
pub mod policy_iteration;
pub mod show;
pub mod value_iteration;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use mdp_core::{format, Mdp, Policy};
use mdp_rl::Solver;

use crate::config::{Config, Overrides};
use crate::report::Report;

/// Arguments shared by the solving subcommands
#[derive(Args, Debug, Clone)]
pub struct SolveArgs {
    /// Model file in the five-line MDP format
    pub file: PathBuf,

    /// Convergence threshold on the largest per-sweep change
    #[arg(short, long)]
    pub epsilon: Option<f64>,

    /// Maximum number of sweeps (or improvement rounds)
    #[arg(short = 'n', long)]
    pub max_iterations: Option<usize>,
}

impl SolveArgs {
    /// Merge these flags into the loaded configuration
    pub fn resolve(&self, config: &Config) -> Result<Config> {
        let mut config = config.clone();
        config.apply(&Overrides {
            epsilon: self.epsilon,
            max_iterations: self.max_iterations,
            ..Overrides::default()
        })?;
        Ok(config)
    }
}

/// Starting policy for evaluation and policy iteration
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PolicyChoice {
    /// Equal probability over each state's available actions
    #[default]
    Uniform,
    /// Always the first available action
    First,
}

impl PolicyChoice {
    pub fn build(self, mdp: &Mdp) -> Result<Policy> {
        let policy = match self {
            PolicyChoice::Uniform => Policy::uniform(mdp)?,
            PolicyChoice::First => {
                let choices = mdp
                    .state_ids()
                    .map(|s| {
                        mdp.legal_actions(s).first().copied().with_context(|| {
                            format!("State {} has no available actions", mdp.state_label(s))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Policy::deterministic(mdp, &choices)?
            }
        };
        Ok(policy)
    }
}

pub fn load_model(path: &Path, config: &Config) -> Result<Mdp> {
    format::load(path, config.loader.density())
        .with_context(|| format!("Failed to load MDP from {}", path.display()))
}

pub fn solver(config: &Config) -> Result<Solver> {
    Solver::new(config.solver).context("Invalid solver configuration")
}

pub fn print_report(report: &Report, config: &Config) -> Result<()> {
    if config.output.json {
        println!("{}", report.render_json()?);
    } else {
        println!("{}", report.render_text(config.output.precision));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdp_core::{ActionId, RewardDensity, StateId};

    fn model() -> Mdp {
        Mdp::builder()
            .states(["a", "b"])
            .actions(["x", "y"])
            .transition("a", "x", "b", 1.0)
            .transition("a", "y", "a", 1.0)
            .transition("b", "y", "b", 1.0)
            .reward("a", "x", 1.0)
            .reward("a", "y", 0.0)
            .reward("b", "y", 0.0)
            .discount(0.9)
            .reward_density(RewardDensity::Sparse)
            .build()
            .unwrap()
    }

    #[test]
    fn test_policy_choices() {
        let mdp = model();

        let first = PolicyChoice::First.build(&mdp).unwrap();
        assert_eq!(first.selected_action(StateId(0)), Some(ActionId(0)));
        assert_eq!(first.selected_action(StateId(1)), Some(ActionId(1)));

        let uniform = PolicyChoice::Uniform.build(&mdp).unwrap();
        assert_eq!(uniform.probability(StateId(0), ActionId(0)), 0.5);
        assert_eq!(uniform.selected_action(StateId(1)), Some(ActionId(1)));
    }

    #[test]
    fn test_flags_override_config() {
        let args = SolveArgs {
            file: PathBuf::from("model.mdp"),
            epsilon: Some(0.5),
            max_iterations: None,
        };
        let resolved = args.resolve(&Config::default()).unwrap();
        assert_eq!(resolved.solver.epsilon, 0.5);
        assert_eq!(resolved.solver.max_iterations, 1000);

        let bad = SolveArgs {
            max_iterations: Some(0),
            ..args
        };
        assert!(bad.resolve(&Config::default()).is_err());
    }
}
