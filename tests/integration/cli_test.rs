use std::path::PathBuf;
use std::process::{Command, Output};

fn get_binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_rule-equiv"))
}

fn run(args: &[&str]) -> Output {
    Command::new(get_binary_path())
        .args(args)
        .output()
        .expect("Failed to execute rule-equiv")
}

fn check_success(output: &Output) -> String {
    if !output.status.success() {
        panic!(
            "Command failed with status: {:?}\nstderr: {}\nstdout: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr),
            String::from_utf8_lossy(&output.stdout)
        );
    }
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_equiv_reports_counterexample() {
    let stdout = check_success(&run(&["equiv"]));
    assert!(stdout.contains("Old workflow: old [c_updater, pad, d_updater]"));
    assert!(
        stdout.contains("Not equivalent"),
        "ticket workflows should diverge:\n{}",
        stdout
    );
    assert!(stdout.contains("differing:"));
}

#[test]
fn test_equiv_enumerates_several() {
    let stdout = check_success(&run(&["equiv", "--count", "3", "--sample", "16", "--seed", "7"]));
    assert!(stdout.contains("Counterexample 3:"));
    assert!(stdout.contains("stopped: limit reached"));
    assert!(stdout.contains("Sampling found"));
}

#[test]
fn test_equiv_observed_field_mask() {
    // Only `a` and `b` are never written, so observing them proves equivalence
    let stdout = check_success(&run(&["equiv", "--observe", "a,b"]));
    assert!(stdout.contains("Equivalent within 3 steps"), "{}", stdout);
}

#[test]
fn test_reach_default_goal() {
    let stdout = check_success(&run(&["reach"]));
    assert!(stdout.contains("Reachable"));
    assert!(stdout.contains("t=0 {a=7, b=5}"), "{}", stdout);
}

#[test]
fn test_reach_unreachable_goal() {
    let stdout = check_success(&run(&["reach", "--target", "a=21"]));
    assert!(stdout.contains("Unreachable within 2 steps"));
}

#[test]
fn test_overlap() {
    let stdout = check_success(&run(&["overlap"]));
    assert!(stdout.contains("Overlapping"));
}

#[test]
fn test_bad_target_fails() {
    let output = run(&["reach", "--target", "nonsense"]);
    assert!(!output.status.success(), "malformed target should fail");
    assert!(String::from_utf8_lossy(&output.stderr).contains("FIELD=VALUE"));
}

#[test]
fn test_requires_subcommand() {
    let output = run(&[]);
    assert!(!output.status.success(), "Command should fail without subcommand");
}
