//! Error types for MDP construction and dynamic-programming sweeps

use thiserror::Error;

/// Main error type for MDP operations
#[derive(Error, Debug)]
pub enum MdpError {
    #[error("MDP must declare at least one state")]
    NoStates,

    #[error("MDP must declare at least one action")]
    NoActions,

    #[error("Duplicate state label: {0}")]
    DuplicateState(String),

    #[error("Duplicate action label: {0}")]
    DuplicateAction(String),

    #[error("Unknown state: {0}")]
    UnknownState(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Line {line}: malformed record '{record}': {reason}")]
    MalformedRecord {
        line: usize,
        record: String,
        reason: String,
    },

    #[error("Missing line {line} ({field})")]
    MissingLine { line: usize, field: &'static str },

    #[error("Invalid probability {probability} for transition {state} -{action}-> {next}")]
    InvalidProbability {
        state: String,
        action: String,
        next: String,
        probability: f64,
    },

    #[error("Duplicate transition record: {state} -{action}-> {next}")]
    DuplicateTransition {
        state: String,
        action: String,
        next: String,
    },

    #[error("Duplicate reward record for ({state}, {action})")]
    DuplicateReward { state: String, action: String },

    #[error("Invalid reward {reward} for ({state}, {action})")]
    InvalidReward {
        state: String,
        action: String,
        reward: f64,
    },

    #[error("Reward count mismatch: expected {expected} (|S| x |A|), got {got}")]
    RewardCount { expected: usize, got: usize },

    #[error("Discount factor must be within [0, 1], got {0}")]
    InvalidDiscount(f64),

    #[error("No discount factor given")]
    MissingDiscount,

    #[error("No reward entry for ({state}, {action})")]
    MissingReward { state: String, action: String },

    #[error("State {state} has no available actions")]
    NoAvailableActions { state: String },

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Convergence threshold must be a non-negative number, got {0}")]
    InvalidTolerance(f64),

    #[error("Iteration limit must be at least 1")]
    InvalidIterationLimit,

    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for MDP operations
pub type Result<T> = std::result::Result<T, MdpError>;

impl MdpError {
    /// Whether the error was raised while loading or building a model
    /// rather than during a sweep.
    pub fn is_malformed_input(&self) -> bool {
        !matches!(
            self,
            MdpError::MissingReward { .. }
                | MdpError::NoAvailableActions { .. }
                | MdpError::DimensionMismatch { .. }
                | MdpError::InvalidTolerance(_)
                | MdpError::InvalidIterationLimit
                | MdpError::InvalidPolicy(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_reward_names_pair() {
        let err = MdpError::MissingReward {
            state: "s2".to_string(),
            action: "a23".to_string(),
        };
        assert_eq!(err.to_string(), "No reward entry for (s2, a23)");
        assert!(!err.is_malformed_input());
    }

    #[test]
    fn test_malformed_record_message() {
        let err = MdpError::MalformedRecord {
            line: 3,
            record: "s1 a1 s2".to_string(),
            reason: "expected 4 fields".to_string(),
        };
        assert!(err.to_string().starts_with("Line 3"));
        assert!(err.is_malformed_input());
    }
}
