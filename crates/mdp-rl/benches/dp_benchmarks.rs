//! Dynamic-programming benchmarks
//!
//! - Single sweeps: policy evaluation, value iteration, improvement
//! - Full solver runs to convergence
//!
//! ## Hot Paths
//! 1. `Mdp::q_value()` - one row dot product per (state, action)
//! 2. `value_iterate()` - |S| x |A| lookaheads per sweep
//! 3. `Solver::run()` - sweep loop and delta bookkeeping

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mdp_core::{Mdp, Policy};
use mdp_rl::{evaluate, improve, value_iterate, Solver, SolverConfig, ValueIteration};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SIZES: [usize; 4] = [10, 50, 100, 200];
const ACTIONS: usize = 4;
const EPSILON: f64 = 1e-6;

/// Each (state, action) reaches up to four random successors
fn random_mdp(n_states: usize, n_actions: usize) -> Mdp {
    let mut rng = StdRng::seed_from_u64(n_states as u64);
    let states: Vec<String> = (0..n_states).map(|i| format!("s{i}")).collect();
    let actions: Vec<String> = (0..n_actions).map(|i| format!("a{i}")).collect();

    let mut builder = Mdp::builder()
        .states(states.clone())
        .actions(actions.clone())
        .discount(0.95);

    for state in &states {
        for action in &actions {
            let mut successors: Vec<usize> = (0..4).map(|_| rng.gen_range(0..n_states)).collect();
            successors.sort_unstable();
            successors.dedup();
            let p = 1.0 / successors.len() as f64;
            for next in successors {
                builder = builder.transition(state.as_str(), action.as_str(), states[next].as_str(), p);
            }
            builder = builder.reward(state.as_str(), action.as_str(), rng.gen_range(-1.0..1.0));
        }
    }

    builder.build().expect("benchmark model is valid")
}

// ============================================================================
// Single sweeps
// ============================================================================

fn bench_value_iterate(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep/value_iterate");
    for size in SIZES {
        let mdp = random_mdp(size, ACTIONS);
        let values = Solver::zeros(&mdp);
        group.throughput(Throughput::Elements((size * ACTIONS) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &mdp, |b, mdp| {
            b.iter(|| value_iterate(black_box(&values), mdp, EPSILON));
        });
    }
    group.finish();
}

fn bench_evaluate_uniform(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep/evaluate_uniform");
    for size in SIZES {
        let mdp = random_mdp(size, ACTIONS);
        let policy = Policy::uniform(&mdp).expect("every state has actions");
        let values = Solver::zeros(&mdp);
        group.bench_with_input(BenchmarkId::from_parameter(size), &mdp, |b, mdp| {
            b.iter(|| evaluate(&policy, black_box(&values), mdp, EPSILON));
        });
    }
    group.finish();
}

fn bench_improve(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep/improve");
    for size in SIZES {
        let mdp = random_mdp(size, ACTIONS);
        let policy = Policy::uniform(&mdp).expect("every state has actions");
        let values = Solver::zeros(&mdp);
        group.bench_with_input(BenchmarkId::from_parameter(size), &mdp, |b, mdp| {
            b.iter(|| improve(&policy, black_box(&values), mdp));
        });
    }
    group.finish();
}

// ============================================================================
// Solver runs
// ============================================================================

fn bench_solver_value_iteration(c: &mut Criterion) {
    let solver = Solver::new(SolverConfig {
        epsilon: EPSILON,
        max_iterations: 10_000,
    })
    .expect("valid config");

    let mut group = c.benchmark_group("solver/value_iteration");
    group.sample_size(20);
    for size in [10, 50, 100] {
        let mdp = random_mdp(size, ACTIONS);
        group.bench_with_input(BenchmarkId::from_parameter(size), &mdp, |b, mdp| {
            b.iter(|| solver.run(&ValueIteration, mdp, Solver::zeros(mdp)));
        });
    }
    group.finish();
}

fn bench_solver_policy_iteration(c: &mut Criterion) {
    let solver = Solver::new(SolverConfig {
        epsilon: EPSILON,
        max_iterations: 10_000,
    })
    .expect("valid config");

    let mut group = c.benchmark_group("solver/policy_iteration");
    group.sample_size(10);
    for size in [10, 50] {
        let mdp = random_mdp(size, ACTIONS);
        let policy = Policy::uniform(&mdp).expect("every state has actions");
        group.bench_with_input(BenchmarkId::from_parameter(size), &mdp, |b, mdp| {
            b.iter(|| solver.policy_iteration(policy.clone(), mdp, Solver::zeros(mdp)));
        });
    }
    group.finish();
}

// ============================================================================
// Criterion Groups
// ============================================================================

criterion_group!(
    name = sweep_benchmarks;
    config = Criterion::default();
    targets =
        bench_value_iterate,
        bench_evaluate_uniform,
        bench_improve,
);

criterion_group!(
    name = solver_benchmarks;
    config = Criterion::default();
    targets =
        bench_solver_value_iteration,
        bench_solver_policy_iteration,
);

criterion_main!(sweep_benchmarks, solver_benchmarks);
