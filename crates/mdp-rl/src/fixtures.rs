//! Small models shared by the unit tests

use mdp_core::{format, Mdp, RewardDensity};

/// s0 -> s1 -> s2 -> s3, s3 absorbing, one action per state
pub(crate) fn chain() -> Mdp {
    Mdp::builder()
        .states(["s0", "s1", "s2", "s3"])
        .actions(["a01", "a12", "a23", "a33"])
        .transition("s0", "a01", "s1", 1.0)
        .transition("s1", "a12", "s2", 1.0)
        .transition("s2", "a23", "s3", 1.0)
        .transition("s3", "a33", "s3", 1.0)
        .reward("s0", "a01", -2.0)
        .reward("s1", "a12", -1.0)
        .reward("s2", "a23", -1.0)
        .reward("s3", "a33", 0.0)
        .discount(0.9)
        .reward_density(RewardDensity::Sparse)
        .build()
        .unwrap()
}

/// Four states where every state can move to two or three neighbours
pub(crate) fn four_state() -> Mdp {
    format::parse(
        "s0,s1,s2,s3\n\
         a01,a02,a10,a13,a20,a23,a31,a32,a33\n\
         s0 a01 s1 1.0,s0 a02 s2 1.0,s1 a10 s0 1.0,s1 a13 s3 1.0,s2 a20 s0 1.0,\
         s2 a23 s3 1.0,s3 a31 s1 1.0,s3 a32 s2 1.0,s3 a33 s3 1.0\n\
         s0 a01 -2.0,s0 a02 -3.0,s1 a10 -1.0,s1 a13 -4.0,s2 a20 -1.0,\
         s2 a23 -4.0,s3 a31 -2.0,s3 a32 -3.0,s3 a33 0\n\
         0.9\n",
        RewardDensity::Sparse,
    )
    .unwrap()
}

/// Two states, two actions, stochastic transitions
pub(crate) fn two_state() -> Mdp {
    Mdp::builder()
        .states(["low", "high"])
        .actions(["wait", "search"])
        .transition("low", "wait", "low", 1.0)
        .transition("low", "search", "low", 0.4)
        .transition("low", "search", "high", 0.6)
        .transition("high", "wait", "high", 1.0)
        .transition("high", "search", "high", 0.7)
        .transition("high", "search", "low", 0.3)
        .reward("low", "wait", 0.0)
        .reward("low", "search", 1.0)
        .reward("high", "wait", 1.0)
        .reward("high", "search", 2.0)
        .discount(0.8)
        .build()
        .unwrap()
}
