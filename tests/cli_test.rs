use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_simulation_run_prints_summary() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("betsettle"));
    cmd.args(["--rounds", "2", "--accounts", "4", "--seed", "42"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("round 1:"))
        .stdout(predicate::str::contains("round 2:"))
        .stdout(predicate::str::contains("settled payments:"))
        .stdout(predicate::str::contains("withdrawals:"));

    Ok(())
}

#[test]
fn test_zero_rounds_settles_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("betsettle"));
    cmd.args(["--rounds", "0"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("settled payments: 0"));

    Ok(())
}
