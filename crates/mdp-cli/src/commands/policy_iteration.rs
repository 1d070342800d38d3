//! Policy iteration: evaluate to convergence, improve, repeat

use anyhow::Result;
use clap::Args;
use mdp_core::Convergence;
use mdp_rl::Solver;

use super::{load_model, print_report, solver, PolicyChoice, SolveArgs};
use crate::config::Config;
use crate::report::Report;

#[derive(Args, Debug, Clone)]
pub struct PolicyIterationArgs {
    #[command(flatten)]
    pub solve: SolveArgs,

    /// Initial policy
    #[arg(short, long, value_enum, default_value_t = PolicyChoice::Uniform)]
    pub policy: PolicyChoice,
}

pub fn run(args: &PolicyIterationArgs, config: &Config) -> Result<()> {
    let config = args.solve.resolve(config)?;
    let mdp = load_model(&args.solve.file, &config)?;
    let initial = args.policy.build(&mdp)?;

    let result = solver(&config)?.policy_iteration(initial, &mdp, Solver::zeros(&mdp))?;

    let state = if result.stable {
        Convergence::Converged
    } else {
        Convergence::Running
    };
    let report = Report::new(
        "policy_iteration",
        state,
        result.evaluation_sweeps,
        &result.values,
        &mdp,
    )
    .with_rounds(result.rounds)
    .with_policy(&result.policy, &mdp);
    print_report(&report, &config)
}
