//! End-to-end tests for the `mdp` binary

use std::path::Path;
use std::process::{Command, Output};

const CHAIN: &str = "\
s0,s1,s2,s3
a01,a12,a23,a33
s0 a01 s1 1.0,s1 a12 s2 1.0,s2 a23 s3 1.0,s3 a33 s3 1.0
s0 a01 -2.0,s1 a12 -1.0,s2 a23 -1.0,s3 a33 0
0.9
";

const CHOICE: &str = "\
start,left,right
go_left,go_right,stay
start go_left left 1.0,start go_right right 1.0,left stay left 1.0,right stay right 1.0,\
left go_left left 1.0,left go_right left 1.0,right go_left right 1.0,right go_right right 1.0,\
start stay start 1.0
start go_left 1,start go_right 2,start stay 0,left go_left 0,left go_right 0,left stay 0,\
right go_left 0,right go_right 0,right stay 0
0.5
";

/// Run the binary in `dir` with no config file or log filter leaking in
fn mdp(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mdp"))
        .args(args)
        .current_dir(dir)
        .env("HOME", dir)
        .env_remove("MDP_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run mdp")
}

fn write_model(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path.to_string_lossy().to_string()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_value_iteration_json() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_model(dir.path(), "chain.mdp", CHAIN);

    let output = mdp(
        dir.path(),
        &["value-iteration", &model, "--sparse-rewards", "--json"],
    );
    assert!(output.status.success(), "{output:?}");

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["algorithm"], "value_iteration");
    assert_eq!(json["state"], "converged");
    assert_eq!(json["iterations"], 4);
    assert_eq!(json["values"][3]["value"], 0.0);
    assert_eq!(json["policy"][0]["action"], "a01");
}

#[test]
fn test_dense_loader_rejects_sparse_model() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_model(dir.path(), "chain.mdp", CHAIN);

    let output = mdp(dir.path(), &["value-iteration", &model]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load MDP"), "{stderr}");
}

#[test]
fn test_policy_iteration_picks_better_branch() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_model(dir.path(), "choice.mdp", CHOICE);

    let output = mdp(dir.path(), &["policy-iteration", &model, "--json"]);
    assert!(output.status.success(), "{output:?}");

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["state"], "converged");
    assert_eq!(json["policy"][0]["state"], "start");
    assert_eq!(json["policy"][0]["action"], "go_right");
    assert_eq!(json["values"][0]["value"], 2.0);
}

#[test]
fn test_evaluate_text_output() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_model(dir.path(), "choice.mdp", CHOICE);

    let output = mdp(dir.path(), &["evaluate", &model, "--policy", "first"]);
    assert!(output.status.success(), "{output:?}");

    let text = stdout(&output);
    assert!(text.starts_with("policy_evaluation: converged"), "{text}");
    assert!(text.contains("start  1.0000"), "{text}");
}

#[test]
fn test_config_file_in_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_model(dir.path(), "chain.mdp", CHAIN);
    std::fs::write(
        dir.path().join("mdp.toml"),
        "[loader]\nsparse_rewards = true\n\n[output]\njson = true\n",
    )
    .unwrap();

    let output = mdp(dir.path(), &["value-iteration", &model, "-n", "1"]);
    assert!(output.status.success(), "{output:?}");

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["iterations"], 1);
    assert_eq!(json["state"], "running");
}

#[test]
fn test_show_canonical_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_model(dir.path(), "chain.mdp", CHAIN);

    let first = mdp(dir.path(), &["show", &model, "--canonical", "--sparse-rewards"]);
    assert!(first.status.success(), "{first:?}");
    let canonical = stdout(&first);

    let copy = write_model(dir.path(), "copy.mdp", &canonical);
    let second = mdp(dir.path(), &["show", &copy, "--canonical", "--sparse-rewards"]);
    assert_eq!(stdout(&second), canonical);
}

#[test]
fn test_invalid_epsilon_flag() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_model(dir.path(), "chain.mdp", CHAIN);

    let output = mdp(
        dir.path(),
        &["value-iteration", &model, "--sparse-rewards", "--epsilon=-1"],
    );
    assert!(!output.status.success());
}
