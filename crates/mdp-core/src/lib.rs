//! MDP Core - finite Markov Decision Process model and shared types
//!
//! This crate provides the immutable MDP description consumed by the
//! dynamic-programming algorithms in `mdp-rl`, the policy representation,
//! and the line-oriented file format used to load models.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::float_cmp)]

pub mod error;
pub mod format;
pub mod model;
pub mod policy;
pub mod types;

pub use error::{MdpError, Result};
pub use model::{Mdp, MdpBuilder, RewardDensity};
pub use policy::Policy;
pub use types::*;
