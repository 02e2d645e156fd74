use std::process::{Command, Output};

use anyhow::Context as _;

fn status_code(status: std::process::ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

async fn run_searchbench(args: &'static [&'static str]) -> anyhow::Result<Output> {
    let exe = env!("CARGO_BIN_EXE_searchbench");
    tokio::task::spawn_blocking(move || Command::new(exe).args(args).output())
        .await
        .context("spawn_blocking join")?
        .context("run searchbench binary")
}

fn ensure_exit(out: &Output, expected: i32) -> anyhow::Result<()> {
    anyhow::ensure!(
        status_code(out.status) == expected,
        "expected exit code {expected}, got {}\nstdout:\n{}\nstderr:\n{}",
        status_code(out.status),
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
    Ok(())
}

#[test]
fn invalid_flags_exit_30() -> anyhow::Result<()> {
    let exe = env!("CARGO_BIN_EXE_searchbench");

    let out = Command::new(exe)
        .arg("run")
        .arg("--timeout")
        .arg("10x")
        .output()
        .context("run searchbench binary")?;

    ensure_exit(&out, 30)
}

#[test]
fn help_exits_0() -> anyhow::Result<()> {
    let exe = env!("CARGO_BIN_EXE_searchbench");
    let out = Command::new(exe)
        .arg("--help")
        .output()
        .context("run searchbench binary")?;

    ensure_exit(&out, 0)
}

#[tokio::test]
async fn zero_workers_exit_30() -> anyhow::Result<()> {
    let out = run_searchbench(&["run", "--conn", "0", "--requests", "1", "--quiet"]).await?;
    ensure_exit(&out, 30)?;
    anyhow::ensure!(out.stdout.is_empty(), "no report expected for rejected config");
    Ok(())
}

#[tokio::test]
async fn unsupported_scheme_exit_30() -> anyhow::Result<()> {
    let out = run_searchbench(&["run", "--host", "ftp://127.0.0.1:21", "--quiet"]).await?;
    ensure_exit(&out, 30)
}

#[tokio::test]
async fn missing_scenario_file_exit_30() -> anyhow::Result<()> {
    let out = run_searchbench(&[
        "run",
        "--scenarios",
        "./definitely-missing-scenarios.yaml",
        "--quiet",
    ])
    .await?;
    ensure_exit(&out, 30)
}

#[tokio::test]
async fn failing_host_still_exits_0() -> anyhow::Result<()> {
    let out = run_searchbench(&[
        "run",
        "--host",
        "127.0.0.1:1",
        "--conn",
        "1",
        "--queue-capacity",
        "1",
        "--requests",
        "3",
        "--quiet",
    ])
    .await?;
    ensure_exit(&out, 0)?;

    let stdout = String::from_utf8_lossy(&out.stdout);
    let rows: Vec<_> = stdout.lines().skip(2).collect();
    anyhow::ensure!(rows.len() == 3, "expected three scenario rows:\n{stdout}");
    for row in rows {
        let cols: Vec<_> = row.split_whitespace().collect();
        anyhow::ensure!(
            cols[1] == "3" && cols[3] == "n/a" && cols[4] == "3" && cols[5] == "0",
            "unexpected row: {row}"
        );
    }
    Ok(())
}
