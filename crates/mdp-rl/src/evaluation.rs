//! Policy evaluation - one Bellman expectation backup per call

use mdp_core::{check_tolerance, Mdp, Policy, Result, Values};

use crate::algorithm::{Sweep, SweepAlgorithm};

/// One synchronous sweep of
/// `v'(s) = sum_a pi(a|s) * (R(s,a) + gamma * sum_s' P(s'|s,a) * v(s'))`.
///
/// Every listed (state, action) pair must have a reward entry, including
/// pairs with probability zero.
pub fn evaluate(policy: &Policy, values: &Values, mdp: &Mdp, epsilon: f64) -> Result<Sweep> {
    check_tolerance(epsilon)?;
    mdp.check_values(values)?;
    policy.check(mdp)?;

    let new_values = policy
        .iter()
        .map(|(state, candidates)| {
            candidates
                .iter()
                .try_fold(0.0, |total, &(action, probability)| -> Result<f64> {
                    Ok(total + probability * mdp.q_value(state, action, values)?)
                })
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok(Sweep::new(values, Values::from_vec(new_values), epsilon))
}

/// Policy evaluation for a fixed policy
#[derive(Debug, Clone)]
pub struct PolicyEvaluation {
    policy: Policy,
}

impl PolicyEvaluation {
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }
}

impl SweepAlgorithm for PolicyEvaluation {
    fn name(&self) -> &str {
        "policy_evaluation"
    }

    fn sweep(&self, mdp: &Mdp, values: &Values, epsilon: f64) -> Result<Sweep> {
        evaluate(&self.policy, values, mdp, epsilon)
    }
}
