//! Sweep algorithm trait and the result of a single sweep

use mdp_core::{max_abs_diff, ActionId, Mdp, Result, StateId, Values};
use serde::Serialize;

/// Trait for iterative dynamic-programming algorithms.
///
/// Each call performs exactly one synchronous sweep over every state and
/// returns control; the caller owns the loop.
pub trait SweepAlgorithm {
    /// Algorithm name
    fn name(&self) -> &str;

    /// Compute a new value vector from `values` alone
    fn sweep(&self, mdp: &Mdp, values: &Values, epsilon: f64) -> Result<Sweep>;
}

/// Outcome of one sweep
#[derive(Debug, Clone, Serialize)]
pub struct Sweep {
    /// Freshly allocated value vector
    pub values: Values,
    /// Largest absolute change over all states
    pub delta: f64,
    /// `delta > epsilon`
    pub changed: bool,
}

impl Sweep {
    pub(crate) fn new(previous: &Values, values: Values, epsilon: f64) -> Self {
        let delta = max_abs_diff(&values, previous);
        Self {
            values,
            delta,
            changed: delta > epsilon,
        }
    }

    /// `(new_values, changed)`
    pub fn into_parts(self) -> (Values, bool) {
        (self.values, self.changed)
    }
}

/// First action with the strictly greatest one-step lookahead value.
///
/// Later actions that only tie never replace an earlier choice. Returns
/// `None` when `actions` is empty.
pub(crate) fn best_action(
    mdp: &Mdp,
    state: StateId,
    actions: impl IntoIterator<Item = ActionId>,
    values: &Values,
) -> Result<Option<(ActionId, f64)>> {
    let mut best: Option<(ActionId, f64)> = None;
    for action in actions {
        let q = mdp.q_value(state, action, values)?;
        match best {
            Some((_, max)) if q <= max => {}
            _ => best = Some((action, q)),
        }
    }
    Ok(best)
}
