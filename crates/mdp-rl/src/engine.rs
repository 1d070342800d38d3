//! Solver - drives sweep algorithms until convergence

use mdp_core::{check_tolerance, Convergence, Mdp, MdpError, Policy, Result, Values};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::algorithm::SweepAlgorithm;
use crate::evaluation::PolicyEvaluation;
use crate::improvement::improve;
use crate::value_iteration::{greedy_policy, ValueIteration};

/// Convergence threshold and sweep budget
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// A sweep whose largest change is at most this value ends the run
    pub epsilon: f64,
    /// Maximum sweeps per run, and maximum improvement rounds in policy iteration
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.01,
            max_iterations: 1000,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<()> {
        check_tolerance(self.epsilon)?;
        if self.max_iterations == 0 {
            return Err(MdpError::InvalidIterationLimit);
        }
        Ok(())
    }
}

/// Result of running one algorithm to convergence or to the sweep cap
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub values: Values,
    pub iterations: usize,
    /// Largest change in the final sweep
    pub delta: f64,
    pub state: Convergence,
    /// Largest change of every sweep, in order
    pub history: Vec<f64>,
}

/// Value iteration outcome plus the greedy policy for the final values
#[derive(Debug, Clone, Serialize)]
pub struct ControlOutcome {
    pub outcome: Outcome,
    pub policy: Policy,
}

/// Result of alternating evaluation and improvement
#[derive(Debug, Clone, Serialize)]
pub struct PolicyIterationOutcome {
    pub values: Values,
    pub policy: Policy,
    /// Improvement rounds performed
    pub rounds: usize,
    /// Evaluation sweeps summed over all rounds
    pub evaluation_sweeps: usize,
    /// The last improvement left every selection unchanged
    pub stable: bool,
}

/// Runs sweep algorithms with a fixed configuration
#[derive(Debug, Clone)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    /// Create a solver, rejecting invalid thresholds
    pub fn new(config: SolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Canonical starting point: zero value for every state
    pub fn zeros(mdp: &Mdp) -> Values {
        Values::zeros(mdp.n_states())
    }

    /// Sweep until `changed` is false or the sweep cap is hit.
    ///
    /// A failing sweep aborts the run; no partial outcome is returned.
    pub fn run(
        &self,
        algorithm: &dyn SweepAlgorithm,
        mdp: &Mdp,
        initial: Values,
    ) -> Result<Outcome> {
        mdp.check_values(&initial)?;

        let mut values = initial;
        let mut state = Convergence::Running;
        let mut history = Vec::new();
        let mut delta = 0.0;

        while !state.is_converged() && history.len() < self.config.max_iterations {
            let sweep = algorithm.sweep(mdp, &values, self.config.epsilon)?;
            history.push(sweep.delta);
            debug!(
                algorithm = algorithm.name(),
                iteration = history.len(),
                delta = sweep.delta,
                "Sweep complete"
            );
            state = state.after_sweep(sweep.changed);
            delta = sweep.delta;
            values = sweep.values;
        }

        if state.is_converged() {
            info!(
                "{} converged after {} sweeps (delta {:.6})",
                algorithm.name(),
                history.len(),
                delta
            );
        } else {
            warn!(
                "{} stopped after {} sweeps without converging (delta {:.6}, epsilon {})",
                algorithm.name(),
                history.len(),
                delta,
                self.config.epsilon
            );
        }

        Ok(Outcome {
            values,
            iterations: history.len(),
            delta,
            state,
            history,
        })
    }

    /// Iterative policy evaluation for a fixed policy
    pub fn evaluate_policy(&self, policy: &Policy, mdp: &Mdp, initial: Values) -> Result<Outcome> {
        self.run(&PolicyEvaluation::new(policy.clone()), mdp, initial)
    }

    /// Value iteration followed by greedy policy extraction
    pub fn value_iteration(&self, mdp: &Mdp, initial: Values) -> Result<ControlOutcome> {
        let outcome = self.run(&ValueIteration, mdp, initial)?;
        let policy = greedy_policy(&outcome.values, mdp)?;
        Ok(ControlOutcome { outcome, policy })
    }

    /// Full policy iteration: evaluate to convergence, improve, repeat until
    /// no state changes its selected action
    pub fn policy_iteration(
        &self,
        policy: Policy,
        mdp: &Mdp,
        initial: Values,
    ) -> Result<PolicyIterationOutcome> {
        let mut policy = policy;
        let mut values = initial;
        let mut rounds = 0;
        let mut evaluation_sweeps = 0;
        let mut stable = false;

        while rounds < self.config.max_iterations {
            let evaluation = self.evaluate_policy(&policy, mdp, values)?;
            evaluation_sweeps += evaluation.iterations;
            values = evaluation.values;

            let improvement = improve(&policy, &values, mdp)?;
            rounds += 1;
            policy = improvement.policy;
            debug!(round = rounds, changed = improvement.changed, "Policy improved");

            if !improvement.changed {
                stable = true;
                break;
            }
        }

        if stable {
            info!(
                "Policy iteration stable after {} rounds ({} evaluation sweeps)",
                rounds, evaluation_sweeps
            );
        } else {
            warn!("Policy iteration hit the round cap ({}) before stabilising", rounds);
        }

        Ok(PolicyIterationOutcome {
            values,
            policy,
            rounds,
            evaluation_sweeps,
            stable,
        })
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            config: SolverConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{chain, four_state, two_state};
    use mdp_core::StateId;

    #[test]
    fn test_solver_creation() {
        let solver = Solver::default();
        assert_eq!(solver.config().epsilon, 0.01);
        assert_eq!(solver.config().max_iterations, 1000);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let negative = SolverConfig {
            epsilon: -0.5,
            ..SolverConfig::default()
        };
        assert!(Solver::new(negative).is_err());

        let no_budget = SolverConfig {
            max_iterations: 0,
            ..SolverConfig::default()
        };
        assert!(matches!(
            Solver::new(no_budget).unwrap_err(),
            MdpError::InvalidIterationLimit
        ));
    }

    #[test]
    fn test_value_iteration_chain() {
        let mdp = chain();
        let solver = Solver::default();
        let result = solver.value_iteration(&mdp, Solver::zeros(&mdp)).unwrap();
        let outcome = &result.outcome;

        assert_eq!(outcome.state, Convergence::Converged);
        assert_eq!(outcome.iterations, 4);
        assert_eq!(outcome.history.len(), 4);
        assert_eq!(outcome.values[3], 0.0);
        assert!(outcome.delta <= 0.01);
        assert!(result.policy.is_deterministic());
    }

    #[test]
    fn test_iteration_cap() {
        let mdp = two_state();
        let solver = Solver::new(SolverConfig {
            epsilon: 0.0,
            max_iterations: 3,
        })
        .unwrap();
        let outcome = solver.run(&ValueIteration, &mdp, Solver::zeros(&mdp)).unwrap();

        assert_eq!(outcome.iterations, 3);
        assert_eq!(outcome.state, Convergence::Running);
    }

    #[test]
    fn test_run_rejects_wrong_length() {
        let mdp = chain();
        let err = Solver::default()
            .run(&ValueIteration, &mdp, Values::zeros(2))
            .unwrap_err();
        assert!(matches!(err, MdpError::DimensionMismatch { expected: 4, got: 2 }));
    }

    #[test]
    fn test_policy_iteration_matches_value_iteration() {
        let mdp = four_state();
        let solver = Solver::new(SolverConfig {
            epsilon: 1e-10,
            max_iterations: 10_000,
        })
        .unwrap();

        let pi = solver
            .policy_iteration(Policy::uniform(&mdp).unwrap(), &mdp, Solver::zeros(&mdp))
            .unwrap();
        let vi = solver.value_iteration(&mdp, Solver::zeros(&mdp)).unwrap();

        assert!(pi.stable);
        assert!(pi.rounds >= 2);
        for state in mdp.state_ids() {
            assert_eq!(
                pi.policy.selected_action(state),
                vi.policy.selected_action(state)
            );
            let i = state.index();
            assert!((pi.values[i] - vi.outcome.values[i]).abs() < 1e-6);
        }
        // s3 stays put forever at zero cost
        assert_eq!(
            mdp.action_label(pi.policy.selected_action(StateId(3)).unwrap()),
            "a33"
        );
    }

    #[test]
    fn test_outcome_serialization() {
        let mdp = chain();
        let outcome = Solver::default()
            .run(&ValueIteration, &mdp, Solver::zeros(&mdp))
            .unwrap();
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["state"], "converged");
        assert_eq!(json["iterations"], 4);
    }
}
