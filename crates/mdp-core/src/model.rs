//! Finite MDP model and its builder
//!
//! An [`Mdp`] is immutable once built. All validation happens in
//! [`MdpBuilder::build`], so a value of this type is always well-formed:
//! labels are unique, every matrix is `n x n`, probabilities lie in `[0, 1]`
//! and the discount factor lies in `[0, 1]`.

use std::collections::{BTreeMap, HashMap, HashSet};

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{MdpError, Result};
use crate::types::{ActionId, StateId, Values};

/// Tolerance used when checking that a legal row is a distribution
const ROW_SUM_TOLERANCE: f64 = 1e-6;

/// How many reward entries a model must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardDensity {
    /// Exactly one entry per (state, action) pair
    #[default]
    Dense,
    /// Any non-empty subset; pairs without an entry are unavailable
    Sparse,
}

/// A finite, fully observed Markov Decision Process
#[derive(Debug, Clone, PartialEq)]
pub struct Mdp {
    states: Vec<String>,
    actions: Vec<String>,
    state_index: HashMap<String, StateId>,
    action_index: HashMap<String, ActionId>,
    /// One `n x n` matrix per action, indexed by `ActionId`
    transitions: Vec<Array2<f64>>,
    rewards: BTreeMap<(StateId, ActionId), f64>,
    /// Actions with a reward entry, per state, in declaration order
    legal: Vec<Vec<ActionId>>,
    gamma: f64,
}

impl Mdp {
    /// Start building a model
    pub fn builder() -> MdpBuilder {
        MdpBuilder::new()
    }

    pub fn n_states(&self) -> usize {
        self.states.len()
    }

    pub fn n_actions(&self) -> usize {
        self.actions.len()
    }

    /// State labels in index order
    pub fn states(&self) -> &[String] {
        &self.states
    }

    /// Action labels in index order
    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub fn state_ids(&self) -> impl Iterator<Item = StateId> {
        (0..self.states.len()).map(StateId)
    }

    pub fn action_ids(&self) -> impl Iterator<Item = ActionId> {
        (0..self.actions.len()).map(ActionId)
    }

    pub fn state_label(&self, state: StateId) -> &str {
        &self.states[state.0]
    }

    pub fn action_label(&self, action: ActionId) -> &str {
        &self.actions[action.0]
    }

    pub fn state_id(&self, label: &str) -> Result<StateId> {
        self.state_index
            .get(label)
            .copied()
            .ok_or_else(|| MdpError::UnknownState(label.to_string()))
    }

    pub fn action_id(&self, label: &str) -> Result<ActionId> {
        self.action_index
            .get(label)
            .copied()
            .ok_or_else(|| MdpError::UnknownAction(label.to_string()))
    }

    /// Discount factor
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Transition matrix for an action
    pub fn transition(&self, action: ActionId) -> &Array2<f64> {
        &self.transitions[action.0]
    }

    /// P(next | state, action)
    pub fn probability(&self, action: ActionId, state: StateId, next: StateId) -> f64 {
        self.transitions[action.0][[state.0, next.0]]
    }

    /// Immediate reward, `None` when the action is unavailable in `state`
    pub fn reward(&self, state: StateId, action: ActionId) -> Option<f64> {
        self.rewards.get(&(state, action)).copied()
    }

    /// All reward entries, ordered by state then action
    pub fn rewards(&self) -> impl Iterator<Item = (StateId, ActionId, f64)> + '_ {
        self.rewards.iter().map(|(&(s, a), &r)| (s, a, r))
    }

    /// Actions available in `state`, in declaration order
    pub fn legal_actions(&self, state: StateId) -> &[ActionId] {
        &self.legal[state.0]
    }

    /// Nonzero transition entries, ordered by action, then state, then next state
    pub fn transition_records(
        &self,
    ) -> impl Iterator<Item = (StateId, ActionId, StateId, f64)> + '_ {
        self.transitions.iter().enumerate().flat_map(|(a, matrix)| {
            matrix
                .indexed_iter()
                .filter(|(_, &p)| p != 0.0)
                .map(move |((s, next), &p)| (StateId(s), ActionId(a), StateId(next), p))
        })
    }

    /// Ensure a value vector has one entry per state
    pub fn check_values(&self, values: &Values) -> Result<()> {
        if values.len() != self.n_states() {
            return Err(MdpError::DimensionMismatch {
                expected: self.n_states(),
                got: values.len(),
            });
        }
        Ok(())
    }

    /// `sum_j P(action)[state][j] * values[j]`
    pub fn expected_next_value(&self, action: ActionId, state: StateId, values: &Values) -> f64 {
        self.transitions[action.0].row(state.0).dot(values)
    }

    /// One-step lookahead `R(s,a) + gamma * sum_j P(a)[s][j] * values[j]`.
    ///
    /// Fails with [`MdpError::MissingReward`] when `action` has no reward
    /// entry in `state`.
    pub fn q_value(&self, state: StateId, action: ActionId, values: &Values) -> Result<f64> {
        self.check_state(state)?;
        self.check_action(action)?;
        let reward = self
            .reward(state, action)
            .ok_or_else(|| self.missing_reward(state, action))?;
        Ok(reward + self.gamma * self.expected_next_value(action, state, values))
    }

    /// Build the error reported for an unavailable (state, action) pair.
    ///
    /// Ids outside this model are named by index.
    pub fn missing_reward(&self, state: StateId, action: ActionId) -> MdpError {
        MdpError::MissingReward {
            state: self
                .states
                .get(state.0)
                .map_or_else(|| state.to_string(), Clone::clone),
            action: self
                .actions
                .get(action.0)
                .map_or_else(|| action.to_string(), Clone::clone),
        }
    }

    /// Ensure `state` indexes into this model
    pub fn check_state(&self, state: StateId) -> Result<()> {
        if state.0 >= self.n_states() {
            return Err(MdpError::UnknownState(state.to_string()));
        }
        Ok(())
    }

    /// Ensure `action` indexes into this model
    pub fn check_action(&self, action: ActionId) -> Result<()> {
        if action.0 >= self.n_actions() {
            return Err(MdpError::UnknownAction(action.to_string()));
        }
        Ok(())
    }
}

/// Collects labels and records, then validates them into an [`Mdp`]
#[derive(Debug, Clone, Default)]
pub struct MdpBuilder {
    states: Vec<String>,
    actions: Vec<String>,
    transitions: Vec<(String, String, String, f64)>,
    rewards: Vec<(String, String, f64)>,
    gamma: Option<f64>,
    density: RewardDensity,
}

impl MdpBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(mut self, label: impl Into<String>) -> Self {
        self.states.push(label.into());
        self
    }

    pub fn states<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states.extend(labels.into_iter().map(Into::into));
        self
    }

    pub fn action(mut self, label: impl Into<String>) -> Self {
        self.actions.push(label.into());
        self
    }

    pub fn actions<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions.extend(labels.into_iter().map(Into::into));
        self
    }

    /// Record `P(next | state, action) = probability`
    pub fn transition(
        mut self,
        state: impl Into<String>,
        action: impl Into<String>,
        next: impl Into<String>,
        probability: f64,
    ) -> Self {
        self.transitions
            .push((state.into(), action.into(), next.into(), probability));
        self
    }

    /// Record `R(state, action) = reward`
    pub fn reward(mut self, state: impl Into<String>, action: impl Into<String>, reward: f64) -> Self {
        self.rewards.push((state.into(), action.into(), reward));
        self
    }

    pub fn discount(mut self, gamma: f64) -> Self {
        self.gamma = Some(gamma);
        self
    }

    pub fn reward_density(mut self, density: RewardDensity) -> Self {
        self.density = density;
        self
    }

    /// Validate everything and produce the model
    pub fn build(self) -> Result<Mdp> {
        let state_index = index_labels(&self.states, MdpError::NoStates, MdpError::DuplicateState)?;
        let action_index =
            index_labels(&self.actions, MdpError::NoActions, MdpError::DuplicateAction)?;
        let state_index: HashMap<String, StateId> =
            state_index.into_iter().map(|(l, i)| (l, StateId(i))).collect();
        let action_index: HashMap<String, ActionId> =
            action_index.into_iter().map(|(l, i)| (l, ActionId(i))).collect();

        let lookup_state = |label: &str| {
            state_index
                .get(label)
                .copied()
                .ok_or_else(|| MdpError::UnknownState(label.to_string()))
        };
        let lookup_action = |label: &str| {
            action_index
                .get(label)
                .copied()
                .ok_or_else(|| MdpError::UnknownAction(label.to_string()))
        };

        let n = self.states.len();
        let mut transitions = vec![Array2::<f64>::zeros((n, n)); self.actions.len()];
        let mut seen = HashSet::new();
        for (state, action, next, probability) in &self.transitions {
            let s = lookup_state(state)?;
            let a = lookup_action(action)?;
            let s2 = lookup_state(next)?;
            if !probability.is_finite() || !(0.0..=1.0).contains(probability) {
                return Err(MdpError::InvalidProbability {
                    state: state.clone(),
                    action: action.clone(),
                    next: next.clone(),
                    probability: *probability,
                });
            }
            if !seen.insert((a, s, s2)) {
                return Err(MdpError::DuplicateTransition {
                    state: state.clone(),
                    action: action.clone(),
                    next: next.clone(),
                });
            }
            transitions[a.0][[s.0, s2.0]] = *probability;
        }

        let mut rewards = BTreeMap::new();
        for (state, action, reward) in &self.rewards {
            let key = (lookup_state(state)?, lookup_action(action)?);
            if !reward.is_finite() {
                return Err(MdpError::InvalidReward {
                    state: state.clone(),
                    action: action.clone(),
                    reward: *reward,
                });
            }
            if rewards.insert(key, *reward).is_some() {
                return Err(MdpError::DuplicateReward {
                    state: state.clone(),
                    action: action.clone(),
                });
            }
        }
        let expected = n * self.actions.len();
        match self.density {
            RewardDensity::Dense if rewards.len() != expected => {
                return Err(MdpError::RewardCount {
                    expected,
                    got: rewards.len(),
                });
            }
            RewardDensity::Sparse if rewards.is_empty() => {
                return Err(MdpError::RewardCount { expected, got: 0 });
            }
            _ => {}
        }

        let gamma = self.gamma.ok_or(MdpError::MissingDiscount)?;
        if !gamma.is_finite() || !(0.0..=1.0).contains(&gamma) {
            return Err(MdpError::InvalidDiscount(gamma));
        }

        let mut legal = vec![Vec::new(); n];
        for &(s, a) in rewards.keys() {
            legal[s.0].push(a);
        }

        let mdp = Mdp {
            states: self.states,
            actions: self.actions,
            state_index,
            action_index,
            transitions,
            rewards,
            legal,
            gamma,
        };
        warn_on_improper_rows(&mdp);
        debug!(
            states = mdp.n_states(),
            actions = mdp.n_actions(),
            rewards = mdp.rewards.len(),
            gamma = mdp.gamma,
            "Built MDP"
        );
        Ok(mdp)
    }
}

fn index_labels(
    labels: &[String],
    empty: MdpError,
    duplicate: impl Fn(String) -> MdpError,
) -> Result<HashMap<String, usize>> {
    if labels.is_empty() {
        return Err(empty);
    }
    let mut index = HashMap::with_capacity(labels.len());
    for (i, label) in labels.iter().enumerate() {
        if index.insert(label.clone(), i).is_some() {
            return Err(duplicate(label.clone()));
        }
    }
    Ok(index)
}

/// Rows of legal (state, action) pairs should be probability distributions.
/// This is not enforced, only reported.
fn warn_on_improper_rows(mdp: &Mdp) {
    for (s, actions) in mdp.legal.iter().enumerate() {
        for &a in actions {
            let sum: f64 = mdp.transitions[a.0].row(s).sum();
            if (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
                warn!(
                    state = %mdp.states[s],
                    action = %mdp.actions[a.0],
                    sum,
                    "Transition row of an available action does not sum to 1"
                );
            }
        }
    }
}
