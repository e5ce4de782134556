use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use serde_json::Value;

pub const SECRET: &str = "Zm9vYmFy";

pub fn crate_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// mapsign with a clean environment: no credentials unless the test sets them.
pub fn mapsign_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mapsign"));
    cmd.current_dir(crate_root())
        .env_remove("MAPS_API_KEY")
        .env_remove("MAPS_URL_SIGNING_SECRET")
        .env_remove("RUST_LOG");
    cmd
}

/// Run mapsign, assert exit code, return parsed JSON stdout.
pub fn mapsign_json(cmd: &mut Command, args: &[&str], expected_exit: i32) -> Value {
    let out = cmd.args(args).output().expect("failed to run mapsign");
    assert_exit(&out, args, expected_exit);
    serde_json::from_slice(&out.stdout).unwrap_or_else(|e| {
        panic!(
            "invalid JSON from: mapsign {}\n{e}\nstdout: {}",
            args.join(" "),
            String::from_utf8_lossy(&out.stdout)
        )
    })
}

/// Run mapsign, return stdout as string (exit 0 expected).
pub fn mapsign_stdout(cmd: &mut Command, args: &[&str]) -> String {
    let out = cmd.args(args).output().expect("failed to run mapsign");
    assert_exit(&out, args, 0);
    String::from_utf8_lossy(&out.stdout).trim().to_string()
}

/// Run mapsign with `input` on stdin.
pub fn mapsign_with_stdin(cmd: &mut Command, args: &[&str], input: &str) -> Output {
    let mut child = cmd
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn mapsign");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    child.wait_with_output().expect("failed to wait on mapsign")
}

pub fn assert_exit(out: &Output, args: &[&str], expected: i32) {
    assert_eq!(
        out.status.code().unwrap_or(-1),
        expected,
        "exit mismatch for: mapsign {}\nstdout: {}\nstderr: {}",
        args.join(" "),
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
}
