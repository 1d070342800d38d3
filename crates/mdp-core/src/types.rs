//! Common types used throughout the MDP crates

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{MdpError, Result};

/// State-value vector, one entry per state index
pub type Values = Array1<f64>;

/// Index of a state in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateId(pub usize);

impl StateId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index of an action in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActionId(pub usize);

impl ActionId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Progress of an iterative sweep algorithm.
///
/// Every sweep either keeps the run going (`changed = true`) or ends it.
/// `Converged` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Convergence {
    #[default]
    Running,
    Converged,
}

impl Convergence {
    /// Next state after a sweep reporting `changed`
    pub fn after_sweep(self, changed: bool) -> Self {
        match self {
            Convergence::Converged => Convergence::Converged,
            Convergence::Running if changed => Convergence::Running,
            Convergence::Running => Convergence::Converged,
        }
    }

    pub fn is_converged(self) -> bool {
        self == Convergence::Converged
    }
}

impl std::fmt::Display for Convergence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Convergence::Running => write!(f, "running"),
            Convergence::Converged => write!(f, "converged"),
        }
    }
}

/// Largest absolute per-state difference between two value vectors.
///
/// Callers must pass vectors of equal length.
pub fn max_abs_diff(a: &Values, b: &Values) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

/// Reject negative or NaN convergence thresholds
pub fn check_tolerance(epsilon: f64) -> Result<()> {
    if epsilon.is_nan() || epsilon < 0.0 {
        return Err(MdpError::InvalidTolerance(epsilon));
    }
    Ok(())
}
