//! Line-oriented MDP description format
//!
//! ```text
//! s0,s1,s2                      <- states
//! a1,a2                         <- actions
//! s0 a1 s1 0.5,s0 a1 s2 0.5,... <- transitions "<state> <action> <state'> <p>"
//! s0 a1 -1.0,s0 a2 2.0,...      <- rewards "<state> <action> <reward>"
//! 0.9                           <- discount factor
//! ```
//!
//! Record lists are comma separated and fields within a record are
//! whitespace separated. Surrounding whitespace is ignored.

use std::path::Path;

use tracing::info;

use crate::error::{MdpError, Result};
use crate::model::{Mdp, RewardDensity};

const FIELDS: [&str; 5] = ["states", "actions", "transitions", "rewards", "discount factor"];

/// Parse a serialized MDP description
pub fn parse(input: &str, density: RewardDensity) -> Result<Mdp> {
    let lines: Vec<&str> = input.lines().map(str::trim).collect();
    let line = |i: usize| field_line(&lines, i);

    if let Some((extra, content)) = lines
        .iter()
        .enumerate()
        .skip(FIELDS.len())
        .find(|(_, l)| !l.is_empty())
    {
        return Err(MdpError::MalformedRecord {
            line: extra + 1,
            record: (*content).to_string(),
            reason: "unexpected content after the discount factor".to_string(),
        });
    }

    let mut builder = Mdp::builder()
        .states(parse_labels(line(0)?, 1)?)
        .actions(parse_labels(line(1)?, 2)?)
        .reward_density(density);

    for record in records(line(2)?) {
        let fields: Vec<&str> = record.split_whitespace().collect();
        let &[state, action, next, probability] = fields.as_slice() else {
            return Err(malformed(3, record, "expected '<state> <action> <state'> <probability>'"));
        };
        let probability = parse_number(probability, 3, record)?;
        builder = builder.transition(state, action, next, probability);
    }

    for record in records(line(3)?) {
        let fields: Vec<&str> = record.split_whitespace().collect();
        let &[state, action, reward] = fields.as_slice() else {
            return Err(malformed(4, record, "expected '<state> <action> <reward>'"));
        };
        let reward = parse_number(reward, 4, record)?;
        builder = builder.reward(state, action, reward);
    }

    let gamma_line = line(4)?;
    if gamma_line.is_empty() {
        return Err(MdpError::MissingDiscount);
    }
    builder = builder.discount(parse_number(gamma_line, 5, gamma_line)?);

    builder.build()
}

/// Read and parse a serialized MDP description from disk
pub fn load(path: impl AsRef<Path>, density: RewardDensity) -> Result<Mdp> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    let mdp = parse(&contents, density)?;
    info!(
        "Loaded MDP from {:?}: {} states, {} actions, gamma {}",
        path,
        mdp.n_states(),
        mdp.n_actions(),
        mdp.gamma()
    );
    Ok(mdp)
}

/// Render a model back into the five-line description.
///
/// Label order is preserved, transitions are listed action-major and only
/// nonzero probabilities are written. `parse(&write(m), _)` rebuilds `m`.
pub fn write(mdp: &Mdp) -> String {
    let transitions = mdp
        .transition_records()
        .map(|(s, a, next, p)| {
            format!(
                "{} {} {} {}",
                mdp.state_label(s),
                mdp.action_label(a),
                mdp.state_label(next),
                p
            )
        })
        .collect::<Vec<_>>()
        .join(",");
    let rewards = mdp
        .rewards()
        .map(|(s, a, r)| format!("{} {} {}", mdp.state_label(s), mdp.action_label(a), r))
        .collect::<Vec<_>>()
        .join(",");

    format!(
        "{}\n{}\n{}\n{}\n{}\n",
        mdp.states().join(","),
        mdp.actions().join(","),
        transitions,
        rewards,
        mdp.gamma()
    )
}

fn field_line<'a>(lines: &[&'a str], i: usize) -> Result<&'a str> {
    lines.get(i).copied().ok_or(MdpError::MissingLine {
        line: i + 1,
        field: FIELDS[i],
    })
}

fn parse_labels(line: &str, line_no: usize) -> Result<Vec<String>> {
    if line.is_empty() {
        return Ok(Vec::new());
    }
    line.split(',')
        .map(str::trim)
        .map(|label| {
            if label.is_empty() || label.contains(char::is_whitespace) {
                Err(malformed(line_no, label, "labels must be non-empty words"))
            } else {
                Ok(label.to_string())
            }
        })
        .collect()
}

fn records(line: &str) -> impl Iterator<Item = &str> {
    line.split(',').map(str::trim).filter(|r| !r.is_empty())
}

fn parse_number(field: &str, line: usize, record: &str) -> Result<f64> {
    field
        .parse::<f64>()
        .map_err(|e| malformed(line, record, &format!("'{field}' is not a number ({e})")))
}

fn malformed(line: usize, record: &str, reason: &str) -> MdpError {
    MdpError::MalformedRecord {
        line,
        record: record.to_string(),
        reason: reason.to_string(),
    }
}
