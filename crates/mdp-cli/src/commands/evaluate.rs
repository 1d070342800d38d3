//! Iterative policy evaluation

use anyhow::Result;
use clap::Args;
use mdp_rl::Solver;
use tracing::info;

use super::{load_model, print_report, solver, PolicyChoice, SolveArgs};
use crate::config::Config;
use crate::report::Report;

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub solve: SolveArgs,

    /// Policy to evaluate
    #[arg(short, long, value_enum, default_value_t = PolicyChoice::Uniform)]
    pub policy: PolicyChoice,
}

pub fn run(args: &EvaluateArgs, config: &Config) -> Result<()> {
    let config = args.solve.resolve(config)?;
    let mdp = load_model(&args.solve.file, &config)?;
    let policy = args.policy.build(&mdp)?;

    info!("Evaluating {:?} policy over {} states", args.policy, mdp.n_states());
    let outcome = solver(&config)?.evaluate_policy(&policy, &mdp, Solver::zeros(&mdp))?;

    let report =
        Report::from_outcome("policy_evaluation", &outcome, &mdp).with_policy(&policy, &mdp);
    print_report(&report, &config)
}
