//! Value iteration with greedy policy extraction

use anyhow::Result;
use mdp_rl::Solver;

use super::{load_model, print_report, solver, SolveArgs};
use crate::config::Config;
use crate::report::Report;

pub fn run(args: &SolveArgs, config: &Config) -> Result<()> {
    let config = args.resolve(config)?;
    let mdp = load_model(&args.file, &config)?;

    let result = solver(&config)?.value_iteration(&mdp, Solver::zeros(&mdp))?;

    let report = Report::from_outcome("value_iteration", &result.outcome, &mdp)
        .with_policy(&result.policy, &mdp);
    print_report(&report, &config)
}
