//! Integration tests for the tourney binary
//!
//! Each call is a separate process, the way an orchestrator drives it.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;

// ============================================================================
// TEST FIXTURES
// ============================================================================

struct Slot {
    _dir: tempfile::TempDir,
    path: PathBuf,
}

impl Slot {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        Self { _dir: dir, path }
    }

    fn run(&self, args: &[&str]) -> Output {
        tourney(&self.path, args)
    }

    fn ok_json(&self, args: &[&str]) -> Value {
        let out = self.run(args);
        assert_eq!(code(&out), 0, "{:?} failed: {}", args, stderr(&out));
        serde_json::from_slice(&out.stdout).unwrap()
    }

    fn select(&self) -> String {
        self.ok_json(&["select"])["agent_id"].as_str().unwrap().to_string()
    }

    fn bytes(&self) -> Vec<u8> {
        std::fs::read(&self.path).unwrap()
    }
}

fn tourney(state: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tourney"))
        .arg("--state")
        .arg(state)
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("TOURNEY_STATE")
        .output()
        .unwrap()
}

fn code(out: &Output) -> i32 {
    out.status.code().unwrap()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).to_string()
}

// ============================================================================
// EXIT CODES
// ============================================================================

#[test]
fn test_no_command_is_usage_error() {
    let slot = Slot::new();
    let out = slot.run(&[]);
    assert_eq!(code(&out), 1);
    assert!(!stderr(&out).is_empty());
}

#[test]
fn test_unknown_command_is_usage_error() {
    let slot = Slot::new();
    assert_eq!(code(&slot.run(&["launch"])), 1);
}

#[test]
fn test_help_exits_zero() {
    let slot = Slot::new();
    assert_eq!(code(&slot.run(&["--help"])), 0);
}

#[test]
fn test_init_validation() {
    let slot = Slot::new();
    assert_eq!(code(&slot.run(&["init"])), 1);
    assert_eq!(code(&slot.run(&["init", "--agents", "0"])), 1);
    assert_eq!(code(&slot.run(&["init", "--agents", "-2"])), 1);
    assert_eq!(code(&slot.run(&["init", "--agents", "three"])), 1);
    assert_eq!(code(&slot.run(&["init", "--agents", "100000000000"])), 1);
    assert_eq!(code(&slot.run(&["init", "--agents", "18446744073709551615"])), 1);
    assert!(!slot.path.exists());

    let ack = slot.ok_json(&["init", "--agents", "3", "--seed", "42"]);
    assert_eq!(ack["agents"], 3);
    assert_eq!(ack["seed"], 42);
}

#[test]
fn test_stateful_commands_need_init() {
    let slot = Slot::new();
    for args in [vec!["select"], vec!["update", "agent_0", "0.5"], vec!["status"], vec!["winner"]] {
        assert_eq!(code(&slot.run(&args)), 2, "{:?}", args);
    }

    slot.ok_json(&["init", "--agents", "2"]);
    slot.ok_json(&["reset"]);
    for args in [vec!["select"], vec!["update", "agent_0", "0.5"], vec!["status"], vec!["winner"]] {
        let out = slot.run(&args);
        assert_eq!(code(&out), 2, "{:?}", args);
        assert_eq!(stderr(&out).trim().lines().count(), 1);
    }
}

#[test]
fn test_reset_always_succeeds() {
    let slot = Slot::new();
    assert_eq!(code(&slot.run(&["reset"])), 0);
    assert_eq!(code(&slot.run(&["reset"])), 0);
}

#[test]
fn test_update_errors_leave_state_identical() {
    let slot = Slot::new();
    slot.ok_json(&["init", "--agents", "3", "--seed", "7"]);
    slot.ok_json(&["update", "agent_1", "0.4"]);
    let before = slot.bytes();

    assert_eq!(code(&slot.run(&["update", "agent_99", "0.5"])), 3);
    assert_eq!(code(&slot.run(&["update", "nobody", "0.5"])), 3);
    for bad in ["1.5", "-0.5", "abc", "NaN"] {
        assert_eq!(code(&slot.run(&["update", "agent_0", bad])), 1, "score {}", bad);
    }
    assert_eq!(slot.bytes(), before);

    for good in ["0", "1", "0.0", "1.0", "0.333"] {
        slot.ok_json(&["update", "agent_0", good]);
    }
}

#[test]
fn test_corrupt_state_exit_code() {
    let slot = Slot::new();
    std::fs::write(&slot.path, "not json at all").unwrap();
    let out = slot.run(&["status"]);
    assert_eq!(code(&out), 4);
    assert!(stderr(&out).contains("corrupt"));

    assert_eq!(code(&slot.run(&["reset"])), 0);
    assert_eq!(code(&slot.run(&["status"])), 2);
}

#[test]
fn test_non_utf8_state_is_corruption() {
    let slot = Slot::new();
    std::fs::write(&slot.path, [0xff, 0xfe, 0x00, 0x7b]).unwrap();
    for args in [vec!["select"], vec!["status"], vec!["winner"]] {
        assert_eq!(code(&slot.run(&args)), 4, "{:?}", args);
    }
}

// ============================================================================
// TOURNAMENT BEHAVIOR ACROSS PROCESSES
// ============================================================================

#[test]
fn test_cross_process_determinism() {
    let run_once = || {
        let slot = Slot::new();
        slot.ok_json(&["init", "--agents", "3", "--seed", "2024"]);
        (0..12)
            .map(|i| {
                let id = slot.select();
                let score = format!("{}", (i % 4) as f64 / 4.0);
                slot.ok_json(&["update", &id, &score]);
                id
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(run_once(), run_once());
}

#[test]
fn test_status_snapshot() {
    let slot = Slot::new();
    slot.ok_json(&["init", "--agents", "2", "--seed", "1"]);
    slot.ok_json(&["update", "agent_0", "0.8"]);
    slot.ok_json(&["update", "agent_0", "0.6"]);
    slot.ok_json(&["update", "agent_1", "0.1"]);

    let status = slot.ok_json(&["status"]);
    let agents = status["agents"].as_array().unwrap();
    assert_eq!(agents.len(), 2);
    assert_eq!(agents[0]["id"], "agent_0");
    assert_eq!(agents[0]["evaluations"], 2);
    assert!((agents[0]["mean_score"].as_f64().unwrap() - 0.7).abs() < 1e-9);
    assert!(agents[1]["std_dev"].as_f64().unwrap() > 0.0);
    assert_eq!(status["total_evaluations"], 3);
    assert!(status["convergence_progress"].as_f64().is_some());
    assert!(status["estimated_evaluations_remaining"].as_u64().is_some());

    let winner = slot.ok_json(&["winner"]);
    assert_eq!(winner["winner_id"], "agent_0");
    assert!(winner["complete"].is_boolean());
}

#[test]
fn test_single_agent_via_cli() {
    let slot = Slot::new();
    slot.ok_json(&["init", "--agents", "1"]);
    for score in ["0.1", "0.9"] {
        assert_eq!(slot.select(), "agent_0");
        slot.ok_json(&["update", "agent_0", score]);
    }
    assert_eq!(slot.ok_json(&["winner"])["winner_id"], "agent_0");
}

#[test]
fn test_pretty_output_is_still_json() {
    let slot = Slot::new();
    slot.ok_json(&["init", "--agents", "2", "--seed", "3"]);
    let out = slot.run(&["--pretty", "status"]);
    assert_eq!(code(&out), 0);
    assert!(String::from_utf8_lossy(&out.stdout).contains('\n'));
    let parsed: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(parsed["agent_count"], 2);
}
