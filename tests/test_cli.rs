use assert_cmd::prelude::*;
use predicates::prelude::*;

use std::env;
use std::fs;
use std::process::Command;

const TEST_CONFIG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/resources/test_config.toml");

#[test]
fn test_cli() {
    let mut cmd = Command::cargo_bin("shoesim").expect("Calling binary failed");
    cmd.assert().failure();
}

#[test]
fn test_version() {
    let expected_version = "shoesim 0.1.0\n";
    let mut cmd = Command::cargo_bin("shoesim").expect("Calling binary failed");
    cmd.arg("--version")
        .assert()
        .stdout(expected_version);
}

#[test]
fn test_subcommand_version() {
    let expected = "argument '--version' which wasn't expected";

    let mut cmd = Command::cargo_bin("shoesim").expect("Calling binary failed");
    cmd.arg("config")
        .arg("--version")
        .assert()
        .stderr(predicate::str::contains(expected));
}

#[test]
fn test_config_dump() {
    let mut cmd = Command::cargo_bin("shoesim").expect("Calling binary failed");
    cmd.arg("-c")
        .arg(TEST_CONFIG)
        .arg("-p")
        .arg("late_close")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("initial_stock: 0"))
        .stdout(predicate::str::contains("reject_late_drop_offs"));
}

#[test]
fn test_unknown_preset() {
    let mut cmd = Command::cargo_bin("shoesim").expect("Calling binary failed");
    cmd.arg("-p")
        .arg("no_such_preset")
        .arg("config")
        .assert()
        .failure();
}

#[test]
fn test_run_writes_trace() {
    let out_dir = env::temp_dir().join(format!("shoesim-test-{}", std::process::id()));

    let mut cmd = Command::cargo_bin("shoesim").expect("Calling binary failed");
    cmd.env("SHOESIM_OUTPUT_DIR", &out_dir)
        .arg("-c")
        .arg(TEST_CONFIG)
        .arg("run")
        .arg("--seed")
        .arg("cli test")
        .assert()
        .success()
        .stdout(predicate::str::contains("average repair time (min):"))
        .stdout(predicate::str::contains("peak queue length:"));

    let trace = fs::read_to_string(out_dir.join("trace.csv")).expect("trace written");
    assert!(trace.starts_with("event_no,event,clock"));
    assert!(trace.lines().nth(1).unwrap().starts_with("0,Initial,0.00"));

    let summary = fs::read_to_string(out_dir.join("summary.json")).expect("summary written");
    assert!(summary.contains("\"seed\": \"cli test\""));

    fs::remove_dir_all(&out_dir).ok();
}
