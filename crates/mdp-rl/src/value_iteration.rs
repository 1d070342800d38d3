//! Value iteration - one Bellman optimality backup per call

use mdp_core::{check_tolerance, ActionId, Mdp, MdpError, Policy, Result, StateId, Values};

use crate::algorithm::{best_action, Sweep, SweepAlgorithm};

/// One synchronous sweep of `v'(s) = max_a (R(s,a) + gamma * sum_s' P(s'|s,a) * v(s'))`.
///
/// Only actions with a reward entry in `s` take part in the maximum. A state
/// with none of them fails with [`MdpError::NoAvailableActions`].
pub fn value_iterate(values: &Values, mdp: &Mdp, epsilon: f64) -> Result<Sweep> {
    check_tolerance(epsilon)?;
    mdp.check_values(values)?;

    let new_values = mdp
        .state_ids()
        .map(|state| {
            best_action(mdp, state, mdp.legal_actions(state).iter().copied(), values)?
                .map(|(_, q)| q)
                .ok_or_else(|| no_actions(mdp, state))
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok(Sweep::new(values, Values::from_vec(new_values), epsilon))
}

/// One-step lookahead value of every available action in `state`
pub fn q_values(values: &Values, mdp: &Mdp, state: StateId) -> Result<Vec<(ActionId, f64)>> {
    mdp.check_values(values)?;
    mdp.check_state(state)?;
    mdp.legal_actions(state)
        .iter()
        .map(|&action| -> Result<(ActionId, f64)> {
            Ok((action, mdp.q_value(state, action, values)?))
        })
        .collect()
}

/// Deterministic policy taking the first best available action in every state
pub fn greedy_policy(values: &Values, mdp: &Mdp) -> Result<Policy> {
    mdp.check_values(values)?;

    let choices = mdp
        .state_ids()
        .map(|state| {
            best_action(mdp, state, mdp.legal_actions(state).iter().copied(), values)?
                .map(|(action, _)| action)
                .ok_or_else(|| no_actions(mdp, state))
        })
        .collect::<Result<Vec<ActionId>>>()?;

    Policy::deterministic(mdp, &choices)
}

fn no_actions(mdp: &Mdp, state: StateId) -> MdpError {
    MdpError::NoAvailableActions {
        state: mdp.state_label(state).to_string(),
    }
}

/// Value iteration, independent of any policy
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueIteration;

impl SweepAlgorithm for ValueIteration {
    fn name(&self) -> &str {
        "value_iteration"
    }

    fn sweep(&self, mdp: &Mdp, values: &Values, epsilon: f64) -> Result<Sweep> {
        value_iterate(values, mdp, epsilon)
    }
}
