use std::process::{Command, ExitStatus};

use crate::project_root;

pub fn xtest() -> Result<(), anyhow::Error> {
    println!("Running unit tests...");
    run_unit_test()?;
    println!("Running integration tests...");
    run_integration_test()?;
    Ok(())
}

pub fn run_unit_test() -> Result<ExitStatus, anyhow::Error> {
    let test = Command::new("cargo")
        .current_dir(project_root())
        .args([
            "test",
            "-p",
            "connection-check",
            "-p",
            "common",
            "--lib",
            "--bins",
        ])
        .status()?;
    Ok(test)
}

pub fn run_integration_test() -> Result<ExitStatus, anyhow::Error> {
    let test = Command::new("cargo")
        .current_dir(project_root())
        .args(["test", "-p", "connection-check", "--test", "integration"])
        .status()?;
    Ok(test)
}
