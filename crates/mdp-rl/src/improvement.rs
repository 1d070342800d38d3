//! Policy improvement - greedy one-step lookahead over each state's candidates

use mdp_core::{Mdp, MdpError, Policy, Result, Values};
use serde::Serialize;
use tracing::debug;

use crate::algorithm::best_action;

/// Result of one improvement step
#[derive(Debug, Clone, Serialize)]
pub struct Improvement {
    /// Deterministic policy over the same candidate actions
    pub policy: Policy,
    /// At least one state selects a different action than before
    pub changed: bool,
}

/// Replace every state's distribution with the greedy choice among the
/// actions already listed for it.
///
/// `Q(s,a) = R(s,a) + gamma * sum_s' P(s'|s,a) * v(s')`; the first candidate
/// with the strictly greatest value wins ties. The new policy keeps each
/// state's candidate list and order, with probability 1 on the selection
/// and 0 elsewhere. A state whose previous distribution was not
/// deterministic had no selection, so it always counts as changed.
pub fn improve(policy: &Policy, values: &Values, mdp: &Mdp) -> Result<Improvement> {
    mdp.check_values(values)?;
    policy.check(mdp)?;

    let mut changed = false;
    let mut rules = Vec::with_capacity(policy.n_states());
    for (state, candidates) in policy.iter() {
        let Some((selected, q)) =
            best_action(mdp, state, candidates.iter().map(|&(a, _)| a), values)?
        else {
            return Err(MdpError::InvalidPolicy(format!(
                "state {} has no candidate actions",
                mdp.state_label(state)
            )));
        };

        if policy.selected_action(state) != Some(selected) {
            debug!(
                state = mdp.state_label(state),
                action = mdp.action_label(selected),
                q,
                "Greedy action changed"
            );
            changed = true;
        }

        rules.push(
            candidates
                .iter()
                .map(|&(a, _)| (a, if a == selected { 1.0 } else { 0.0 }))
                .collect(),
        );
    }

    Ok(Improvement {
        policy: Policy::from_rules(mdp, rules)?,
        changed,
    })
}
