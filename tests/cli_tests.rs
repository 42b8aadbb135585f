use anyhow::Result;
use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PLAN: &str = r#"
goal = "all"

[variables]
CC = "cc"

[targets.all]
deps = ["prog"]
file = "Makefile"
line = 1

[targets.prog]
recipe = ["$(CC) -o prog prog.c"]
file = "Makefile"
line = 4
"#;

fn write_plan(dir: &Path) -> Result<PathBuf> {
    let path = dir.join("plan.toml");
    fs::write(&path, PLAN)?;
    Ok(path)
}

fn cli_command(home: &Path) -> Result<Command> {
    let mut cmd = cargo_bin_cmd!("makedbg");
    cmd.env("HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("MAKEDBG_CONFIG")
        .current_dir(home);
    Ok(cmd)
}

#[test]
fn commands_lists_registry() -> Result<()> {
    let home = TempDir::new()?;
    cli_command(home.path())?
        .arg("commands")
        .assert()
        .success()
        .stdout(predicate::str::contains("break     (b)"))
        .stdout(predicate::str::contains("where     (T) [backtrace, bt]"));
    Ok(())
}

#[test]
fn run_to_completion() -> Result<()> {
    let home = TempDir::new()?;
    let plan = write_plan(home.path())?;

    cli_command(home.path())?
        .args(["run", "--no-editing"])
        .arg(&plan)
        .write_stdin("continue\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("cc -o prog prog.c"))
        .stdout(predicate::str::contains("Build terminated."));
    Ok(())
}

#[test]
fn run_with_breakpoint_and_quit_code() -> Result<()> {
    let home = TempDir::new()?;
    let plan = write_plan(home.path())?;

    cli_command(home.path())?
        .args(["run", "--no-editing", "--break", "prog"])
        .arg(&plan)
        .write_stdin("print CC\nquit 4\n")
        .assert()
        .code(4)
        .stdout(predicate::str::contains("-> (Makefile:4)"))
        .stdout(predicate::str::contains("CC = cc"))
        .stdout(predicate::str::contains("cc -o prog").not());
    Ok(())
}

#[test]
fn run_stop_then_end_of_input() -> Result<()> {
    let home = TempDir::new()?;
    let plan = write_plan(home.path())?;

    cli_command(home.path())?
        .args(["run", "--no-editing", "--stop"])
        .arg(&plan)
        .arg("prog")
        .assert()
        .success()
        .stdout(predicate::str::contains("-> (Makefile:4)\nprog"));
    Ok(())
}

#[test]
fn missing_plan_fails() -> Result<()> {
    let home = TempDir::new()?;
    cli_command(home.path())?
        .args(["run", "--no-editing", "nowhere.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reading plan"));
    Ok(())
}

#[test]
fn init_then_config() -> Result<()> {
    let home = TempDir::new()?;
    cli_command(home.path())?.arg("init").assert().success();
    assert!(home.path().join(".makedbg/config.toml").exists());

    cli_command(home.path())?
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[debugger]"))
        .stdout(predicate::str::contains("prompt = \"makedbg\""));
    Ok(())
}
