//! Stochastic and deterministic policies over a finite MDP
//!
//! A [`Policy`] holds, for every state, an ordered list of candidate actions
//! with the probability of choosing each. The order matters: policy
//! improvement breaks ties in favour of the earlier candidate.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{MdpError, Result};
use crate::model::Mdp;
use crate::types::{ActionId, StateId};

const PROBABILITY_SUM_TOLERANCE: f64 = 1e-9;

/// Per-state distributions over candidate actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    rules: Vec<Vec<(ActionId, f64)>>,
}

impl Policy {
    /// Build from raw per-state rules, indexed by state.
    ///
    /// Every state needs a non-empty list of distinct, known actions with
    /// finite non-negative probabilities.
    pub fn from_rules(mdp: &Mdp, rules: Vec<Vec<(ActionId, f64)>>) -> Result<Self> {
        if rules.len() != mdp.n_states() {
            return Err(MdpError::DimensionMismatch {
                expected: mdp.n_states(),
                got: rules.len(),
            });
        }

        for (s, rule) in rules.iter().enumerate() {
            let label = mdp.state_label(StateId(s));
            if rule.is_empty() {
                return Err(MdpError::InvalidPolicy(format!(
                    "state {label} has no candidate actions"
                )));
            }
            let mut seen = HashSet::with_capacity(rule.len());
            for &(a, p) in rule {
                if a.0 >= mdp.n_actions() {
                    return Err(MdpError::InvalidPolicy(format!(
                        "state {label} lists unknown action {a}"
                    )));
                }
                if !seen.insert(a) {
                    return Err(MdpError::InvalidPolicy(format!(
                        "state {label} lists action {} twice",
                        mdp.action_label(a)
                    )));
                }
                if !p.is_finite() || p < 0.0 {
                    return Err(MdpError::InvalidPolicy(format!(
                        "state {label} gives action {} probability {p}",
                        mdp.action_label(a)
                    )));
                }
            }
            let total: f64 = rule.iter().map(|(_, p)| p).sum();
            if (total - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
                warn!(state = %label, total, "Policy probabilities do not sum to 1");
            }
        }

        Ok(Self { rules })
    }

    /// Build from labels, e.g. `("s0", [("left", 0.5), ("right", 0.5)])`.
    ///
    /// Every state of the model must appear exactly once.
    pub fn from_labels<I, S, A, L>(mdp: &Mdp, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, L)>,
        S: AsRef<str>,
        L: IntoIterator<Item = (A, f64)>,
        A: AsRef<str>,
    {
        let mut rules: Vec<Option<Vec<(ActionId, f64)>>> = vec![None; mdp.n_states()];
        for (state, pairs) in entries {
            let s = mdp.state_id(state.as_ref())?;
            let rule = pairs
                .into_iter()
                .map(|(a, p)| -> Result<(ActionId, f64)> { Ok((mdp.action_id(a.as_ref())?, p)) })
                .collect::<Result<Vec<_>>>()?;
            if rules[s.0].replace(rule).is_some() {
                return Err(MdpError::InvalidPolicy(format!(
                    "state {} listed twice",
                    state.as_ref()
                )));
            }
        }

        let rules = rules
            .into_iter()
            .enumerate()
            .map(|(s, rule)| {
                rule.ok_or_else(|| {
                    MdpError::InvalidPolicy(format!(
                        "state {} is not covered",
                        mdp.state_label(StateId(s))
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::from_rules(mdp, rules)
    }

    /// Equiprobable over each state's legal actions
    pub fn uniform(mdp: &Mdp) -> Result<Self> {
        let rules = mdp
            .state_ids()
            .map(|s| {
                let legal = mdp.legal_actions(s);
                if legal.is_empty() {
                    return Err(MdpError::NoAvailableActions {
                        state: mdp.state_label(s).to_string(),
                    });
                }
                let p = 1.0 / legal.len() as f64;
                Ok(legal.iter().map(|&a| (a, p)).collect())
            })
            .collect::<Result<Vec<_>>>()?;

        Self::from_rules(mdp, rules)
    }

    /// Probability 1 on `choices[s]` for every state `s`, with the state's
    /// other legal actions kept as zero-probability candidates
    pub fn deterministic(mdp: &Mdp, choices: &[ActionId]) -> Result<Self> {
        if choices.len() != mdp.n_states() {
            return Err(MdpError::DimensionMismatch {
                expected: mdp.n_states(),
                got: choices.len(),
            });
        }

        let rules = mdp
            .state_ids()
            .zip(choices)
            .map(|(s, &choice)| {
                let legal = mdp.legal_actions(s);
                if !legal.contains(&choice) {
                    if choice.0 >= mdp.n_actions() {
                        return Err(MdpError::InvalidPolicy(format!(
                            "state {} selects unknown action {choice}",
                            mdp.state_label(s)
                        )));
                    }
                    return Err(mdp.missing_reward(s, choice));
                }
                Ok(legal
                    .iter()
                    .map(|&a| (a, if a == choice { 1.0 } else { 0.0 }))
                    .collect())
            })
            .collect::<Result<Vec<_>>>()?;

        Self::from_rules(mdp, rules)
    }

    /// Number of states covered
    pub fn n_states(&self) -> usize {
        self.rules.len()
    }

    /// Ensure the policy covers exactly this model's states and lists only
    /// its actions. Deserialized policies and policies built against
    /// another model are only checked here.
    pub fn check(&self, mdp: &Mdp) -> Result<()> {
        if self.rules.len() != mdp.n_states() {
            return Err(MdpError::DimensionMismatch {
                expected: mdp.n_states(),
                got: self.rules.len(),
            });
        }
        for (s, rule) in self.rules.iter().enumerate() {
            if let Some(&(a, _)) = rule.iter().find(|(a, _)| a.0 >= mdp.n_actions()) {
                return Err(MdpError::InvalidPolicy(format!(
                    "state {} lists unknown action {a}",
                    mdp.state_label(StateId(s))
                )));
            }
        }
        Ok(())
    }

    /// Candidate actions and their probabilities for `state`
    ///
    /// # Panics
    ///
    /// Panics if `state` is not below [`Policy::n_states`].
    pub fn actions(&self, state: StateId) -> &[(ActionId, f64)] {
        &self.rules[state.0]
    }

    /// Iterate `(state, candidates)` in state order
    pub fn iter(&self) -> impl Iterator<Item = (StateId, &[(ActionId, f64)])> {
        self.rules
            .iter()
            .enumerate()
            .map(|(s, rule)| (StateId(s), rule.as_slice()))
    }

    /// Probability of `action` in `state`, zero if not a candidate
    pub fn probability(&self, state: StateId, action: ActionId) -> f64 {
        self.rules[state.0]
            .iter()
            .find(|(a, _)| *a == action)
            .map_or(0.0, |&(_, p)| p)
    }

    /// The action chosen with certainty in `state`, if the state's
    /// distribution is deterministic
    pub fn selected_action(&self, state: StateId) -> Option<ActionId> {
        let rule = &self.rules[state.0];
        let mut selected = None;
        for &(a, p) in rule {
            if p == 1.0 && selected.is_none() {
                selected = Some(a);
            } else if p != 0.0 {
                return None;
            }
        }
        selected
    }

    pub fn is_deterministic(&self) -> bool {
        (0..self.rules.len()).all(|s| self.selected_action(StateId(s)).is_some())
    }
}
