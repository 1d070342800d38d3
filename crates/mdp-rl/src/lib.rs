//! MDP RL - dynamic-programming solvers for finite MDPs
//!
//! This crate provides single-sweep Bellman backups (policy evaluation,
//! policy improvement, value iteration) and a `Solver` that drives them
//! to convergence.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::float_cmp)]

pub mod algorithm;
pub mod engine;
pub mod evaluation;
pub mod improvement;
pub mod value_iteration;

#[cfg(test)]
mod fixtures;

pub use algorithm::{Sweep, SweepAlgorithm};
pub use engine::{ControlOutcome, Outcome, PolicyIterationOutcome, Solver, SolverConfig};
pub use evaluation::{evaluate, PolicyEvaluation};
pub use improvement::{improve, Improvement};
pub use value_iteration::{greedy_policy, q_values, value_iterate, ValueIteration};
