//! Text and JSON rendering of solver results and models

use anyhow::{Context, Result};
use mdp_core::{Convergence, Mdp, Policy, Values};
use mdp_rl::Outcome;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct StateValue {
    pub state: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StateChoice {
    pub state: String,
    /// Action taken with certainty, absent for stochastic states
    pub action: Option<String>,
    pub distribution: Vec<(String, f64)>,
}

/// Everything printed after a solver run
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub algorithm: String,
    pub state: Convergence,
    pub iterations: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rounds: Option<usize>,
    pub values: Vec<StateValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<Vec<StateChoice>>,
}

impl Report {
    pub fn new(
        algorithm: &str,
        state: Convergence,
        iterations: usize,
        values: &Values,
        mdp: &Mdp,
    ) -> Self {
        Self {
            algorithm: algorithm.to_string(),
            state,
            iterations,
            delta: None,
            rounds: None,
            values: state_values(values, mdp),
            policy: None,
        }
    }

    pub fn from_outcome(algorithm: &str, outcome: &Outcome, mdp: &Mdp) -> Self {
        Self {
            delta: Some(outcome.delta),
            ..Self::new(algorithm, outcome.state, outcome.iterations, &outcome.values, mdp)
        }
    }

    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = Some(rounds);
        self
    }

    pub fn with_policy(mut self, policy: &Policy, mdp: &Mdp) -> Self {
        self.policy = Some(
            policy
                .iter()
                .map(|(state, candidates)| StateChoice {
                    state: mdp.state_label(state).to_string(),
                    action: policy
                        .selected_action(state)
                        .map(|a| mdp.action_label(a).to_string()),
                    distribution: candidates
                        .iter()
                        .map(|&(a, p)| (mdp.action_label(a).to_string(), p))
                        .collect(),
                })
                .collect(),
        );
        self
    }

    pub fn render_text(&self, precision: usize) -> String {
        let mut lines = vec![self.summary()];

        let width = label_width(self.values.iter().map(|v| v.state.as_str()));
        lines.push(String::new());
        lines.push(format!("{:<width$}  value", "state"));
        for row in &self.values {
            lines.push(format!(
                "{:<width$}  {:.precision$}",
                row.state, row.value
            ));
        }

        if let Some(policy) = &self.policy {
            lines.push(String::new());
            lines.push(format!("{:<width$}  action", "state"));
            for choice in policy {
                let action = choice.action.clone().unwrap_or_else(|| {
                    choice
                        .distribution
                        .iter()
                        .map(|(a, p)| format!("{a}:{p:.precision$}"))
                        .collect::<Vec<_>>()
                        .join(" ")
                });
                lines.push(format!("{:<width$}  {action}", choice.state));
            }
        }

        lines.join("\n")
    }

    pub fn render_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize report")
    }

    fn summary(&self) -> String {
        let status = match self.state {
            Convergence::Converged => "converged",
            Convergence::Running => "stopped at the iteration limit",
        };
        let mut summary = format!(
            "{}: {} after {} sweeps",
            self.algorithm, status, self.iterations
        );
        if let Some(rounds) = self.rounds {
            summary.push_str(&format!(" and {rounds} improvement rounds"));
        }
        if let Some(delta) = self.delta {
            summary.push_str(&format!(" (delta {delta:e})"));
        }
        summary
    }
}

fn state_values(values: &Values, mdp: &Mdp) -> Vec<StateValue> {
    mdp.state_ids()
        .map(|s| StateValue {
            state: mdp.state_label(s).to_string(),
            value: values[s.index()],
        })
        .collect()
}

fn label_width<'a>(labels: impl Iterator<Item = &'a str>) -> usize {
    labels.map(str::len).max().unwrap_or(0).max("state".len())
}

#[derive(Debug, Clone, Serialize)]
struct TransitionRow<'a> {
    state: &'a str,
    action: &'a str,
    next: &'a str,
    probability: f64,
}

#[derive(Debug, Clone, Serialize)]
struct RewardRow<'a> {
    state: &'a str,
    action: &'a str,
    reward: f64,
}

#[derive(Debug, Clone, Serialize)]
struct ModelView<'a> {
    states: &'a [String],
    actions: &'a [String],
    transitions: Vec<TransitionRow<'a>>,
    rewards: Vec<RewardRow<'a>>,
    gamma: f64,
}

pub fn model_json(mdp: &Mdp) -> Result<String> {
    let view = ModelView {
        states: mdp.states(),
        actions: mdp.actions(),
        transitions: mdp
            .transition_records()
            .map(|(s, a, next, probability)| TransitionRow {
                state: mdp.state_label(s),
                action: mdp.action_label(a),
                next: mdp.state_label(next),
                probability,
            })
            .collect(),
        rewards: mdp
            .rewards()
            .map(|(s, a, reward)| RewardRow {
                state: mdp.state_label(s),
                action: mdp.action_label(a),
                reward,
            })
            .collect(),
        gamma: mdp.gamma(),
    };
    serde_json::to_string_pretty(&view).context("Failed to serialize model")
}

/// States, actions, one transition matrix per action, rewards and gamma
pub fn model_text(mdp: &Mdp, precision: usize) -> String {
    let width = label_width(mdp.states().iter().map(String::as_str));
    let cell = (precision + 3).max(width);
    let mut lines = vec![
        format!("States ({}): {}", mdp.n_states(), mdp.states().join(", ")),
        format!("Actions ({}): {}", mdp.n_actions(), mdp.actions().join(", ")),
        format!("Discount: {}", mdp.gamma()),
    ];

    for action in mdp.action_ids() {
        lines.push(String::new());
        lines.push(format!("P({})", mdp.action_label(action)));
        let header = mdp
            .states()
            .iter()
            .map(|s| format!("{s:>cell$}"))
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(format!("{:<width$}  {header}", ""));
        for (state, row) in mdp.state_ids().zip(mdp.transition(action).rows()) {
            let cells = row
                .iter()
                .map(|p| format!("{p:>cell$.precision$}"))
                .collect::<Vec<_>>()
                .join(" ");
            lines.push(format!("{:<width$}  {cells}", mdp.state_label(state)));
        }
    }

    lines.push(String::new());
    lines.push("Rewards".to_string());
    for (state, action, reward) in mdp.rewards() {
        lines.push(format!(
            "{:<width$}  {}  {reward}",
            mdp.state_label(state),
            mdp.action_label(action)
        ));
    }

    lines.join("\n")
}
