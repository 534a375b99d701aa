//! End-to-end tests for the `download-models` binary. None of these reach
//! the network: the hub endpoint points at a closed or local port.

use assert_cmd::Command;
use predicates::prelude::*;

const CATALOG_FILES: &[&str] = &[
    "qwen2-0_5b-instruct-q4_k_m.gguf",
    "Llama-3.2-1B-Instruct-Q4_K_M.gguf",
    "smollm2-1.7b-instruct-q4_k_m.gguf",
    "Phi-3-mini-4k-instruct-q4.gguf",
];

fn download_models() -> Command {
    let mut cmd = Command::cargo_bin("download-models").unwrap();
    cmd.env("HF_ENDPOINT", "http://127.0.0.1:9")
        .env_remove("HUGGINGFACE_TOKEN")
        .env_remove("HF_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn list_prints_catalog_and_exits_zero() {
    download_models()
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Available models:"))
        .stdout(predicate::str::contains(
            "- phi-3-mini: microsoft/Phi-3-mini-4k-instruct-gguf -> Phi-3-mini-4k-instruct-q4.gguf",
        ));
}

#[test]
fn missing_models_flag_is_an_error() {
    download_models()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--models is required"));
}

#[test]
fn unknown_model_fails_before_creating_directory() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    let destination = temp.path().join("models");

    download_models()
        .arg("--directory")
        .arg(&destination)
        .args(["--models", "qwen2-0.5b,bogus-model"])
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("unknown model identifiers: bogus-model"));

    assert!(!destination.exists());
    Ok(())
}

#[test]
fn skip_existing_rerun_has_nothing_to_do() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    for name in CATALOG_FILES {
        std::fs::write(temp.path().join(name), b"weights")?;
    }
    let report = temp.path().join("report.json");

    download_models()
        .arg("--directory")
        .arg(temp.path())
        .args(["--models", "all", "--skip-existing", "--report"])
        .arg(&report)
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("No downloads required"))
        .stderr(predicate::str::contains("\u{1b}[").not());

    let parsed: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(report)?)?;
    assert_eq!(parsed["nothing_to_do"], serde_json::json!(true));
    assert_eq!(parsed["outcomes"].as_array().map(Vec::len), Some(4));
    Ok(())
}

#[test]
fn unreachable_hub_is_a_fetch_failure() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;

    download_models()
        .arg("--directory")
        .arg(temp.path())
        .args(["--models", "phi-3-mini"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to download phi-3-mini"));

    assert!(!temp.path().join("Phi-3-mini-4k-instruct-q4.gguf").exists());
    Ok(())
}

/// A hub that accepts the connection and never answers must not make the
/// binary ignore Ctrl-C.
#[cfg(unix)]
#[test]
fn sigint_aborts_a_stalled_download_with_code_130() -> anyhow::Result<()> {
    use std::net::TcpListener;
    use std::process::{Command as StdCommand, Stdio};
    use std::time::{Duration, Instant};

    let listener = TcpListener::bind("127.0.0.1:0")?;
    listener.set_nonblocking(true)?;
    let endpoint = format!("http://{}", listener.local_addr()?);
    let temp = tempfile::tempdir()?;

    let mut child = StdCommand::new(env!("CARGO_BIN_EXE_download-models"))
        .env("HF_ENDPOINT", &endpoint)
        .env_remove("HUGGINGFACE_TOKEN")
        .env_remove("HF_TOKEN")
        .env_remove("RUST_LOG")
        .arg("--directory")
        .arg(temp.path())
        .args(["--models", "phi-3-mini"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    let deadline = Instant::now() + Duration::from_secs(20);
    let _stalled = loop {
        match listener.accept() {
            Ok((stream, _)) => break stream,
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                if Instant::now() > deadline {
                    let _ = child.kill();
                    anyhow::bail!("download-models never connected to the hub");
                }
                std::thread::sleep(Duration::from_millis(20));
            }
            Err(err) => return Err(err.into()),
        }
    };
    std::thread::sleep(Duration::from_millis(300));

    let pid = libc::pid_t::try_from(child.id())?;
    // SAFETY: `pid` is our own still-running child.
    assert_eq!(unsafe { libc::kill(pid, libc::SIGINT) }, 0);

    let deadline = Instant::now() + Duration::from_secs(15);
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() > deadline {
            let _ = child.kill();
            anyhow::bail!("download-models still running 15s after SIGINT");
        }
        std::thread::sleep(Duration::from_millis(50));
    };

    assert_eq!(status.code(), Some(130));
    assert!(!temp.path().join("Phi-3-mini-4k-instruct-q4.gguf").exists());
    assert!(!temp.path().join("Phi-3-mini-4k-instruct-q4.gguf.incomplete").exists());
    Ok(())
}
