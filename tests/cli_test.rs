use assert_cmd::Command;
use predicates::prelude::*;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn fileutil() -> Command {
    Command::cargo_bin("fileutil").unwrap()
}

fn aged_file(dir: &std::path::Path, name: &str, age_secs: u64) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, "x").unwrap();
    let file = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
    file.set_modified(SystemTime::now() - Duration::from_secs(age_secs))
        .unwrap();
    path
}

// ─── Help & version ──────────────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    fileutil()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sweep"))
        .stdout(predicate::str::contains("lines"))
        .stdout(predicate::str::contains("download"))
        .stdout(predicate::str::contains("mkdir"));
}

#[test]
fn test_version_flag() {
    fileutil()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fileutil"));
}

// ─── Sweep ───────────────────────────────────────────────────────────────────

#[test]
fn test_sweep_removes_old_files() {
    let tmp = TempDir::new().unwrap();
    let old = aged_file(tmp.path(), "a.txt", 10);
    let fresh = aged_file(tmp.path(), "b.txt", 1);

    fileutil()
        .args(["sweep", "--older-than", "5s", "--no-color"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 file"));

    assert!(!old.exists());
    assert!(fresh.exists());
}

#[test]
fn test_sweep_dry_run_keeps_files() {
    let tmp = TempDir::new().unwrap();
    let old = aged_file(tmp.path(), "old.log", 120);

    fileutil()
        .args(["sweep", "--older-than", "1m", "--dry-run", "--no-color"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("would be removed"))
        .stdout(predicate::str::contains("old.log"));

    assert!(old.exists());
}

#[test]
fn test_sweep_json_output() {
    let tmp = TempDir::new().unwrap();
    aged_file(tmp.path(), "abcfile", 60);
    aged_file(tmp.path(), "xyzfile", 60);

    fileutil()
        .args(["sweep", "--older-than", "5s", "--prefix", "abc", "--format", "json"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"files_scanned\": 2"))
        .stdout(predicate::str::contains("abcfile"));

    assert!(tmp.path().join("xyzfile").exists());
}

#[test]
fn test_sweep_missing_root_fails() {
    let tmp = TempDir::new().unwrap();
    fileutil()
        .args(["sweep", "--older-than", "5s"])
        .arg(tmp.path().join("nope"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot walk"));
}

#[test]
fn test_sweep_bad_regex_fails() {
    let tmp = TempDir::new().unwrap();
    fileutil()
        .args(["sweep", "--older-than", "5s", "--regex", "(oops"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid filename pattern"));
}

// ─── Lines ───────────────────────────────────────────────────────────────────

#[test]
fn test_lines_from_file_with_head() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("in.txt");
    std::fs::write(&path, "one\ntwo\nthree\n").unwrap();

    fileutil()
        .args(["lines", "--head", "2"])
        .arg(&path)
        .assert()
        .success()
        .stdout("one\ntwo\n");
}

#[test]
fn test_lines_from_piped_stdin() {
    fileutil()
        .arg("lines")
        .write_stdin("alpha\r\nbeta\n")
        .assert()
        .success()
        .stdout("alpha\nbeta\n");
}

#[test]
fn test_lines_head_exits_while_stdin_stays_open() {
    use std::io::Write;
    use std::process::Stdio;
    use std::time::Instant;

    let mut child = std::process::Command::new(assert_cmd::cargo::cargo_bin("fileutil"))
        .args(["lines", "--head", "1"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    // Write some lines but keep the pipe open, like a stalled producer
    let mut stdin = child.stdin.take().unwrap();
    stdin.write_all(b"a\nb\nc\n").unwrap();
    stdin.flush().unwrap();

    let started = Instant::now();
    let status = loop {
        if let Some(status) = child.try_wait().unwrap() {
            break Some(status);
        }
        if started.elapsed() > Duration::from_secs(5) {
            break None;
        }
        std::thread::sleep(Duration::from_millis(20));
    };

    drop(stdin);
    if status.is_none() {
        let _ = child.kill();
    }
    let output = child.wait_with_output().unwrap();

    let status = status.expect("lines --head should exit without waiting for stdin to close");
    assert!(status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "a\n");
}

#[cfg(unix)]
#[test]
fn test_lines_from_file_redirected_stdin() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("in.txt");
    std::fs::write(&path, "first\nsecond\n").unwrap();

    let output = std::process::Command::new(assert_cmd::cargo::cargo_bin("fileutil"))
        .arg("lines")
        .stdin(std::fs::File::open(&path).unwrap())
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "first\nsecond\n");
}

#[cfg(unix)]
#[test]
fn test_lines_without_input_fails() {
    let output = std::process::Command::new(assert_cmd::cargo::cargo_bin("fileutil"))
        .arg("lines")
        .stdin(std::fs::File::open("/dev/null").unwrap())
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No input"));
}

#[test]
fn test_lines_too_long_fails() {
    fileutil()
        .args(["lines", "--max-line-bytes", "4"])
        .write_stdin("ok\nmuch too long\n")
        .assert()
        .failure()
        .stdout("ok\n")
        .stderr(predicate::str::contains("exceeds the 4-byte line buffer"));
}

#[test]
fn test_lines_missing_file_fails() {
    fileutil()
        .args(["lines", "/definitely/not/here.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot open"));
}

// ─── Mkdir & exists ──────────────────────────────────────────────────────────

#[test]
fn test_mkdir_then_exists() {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("a/b");
    let file = tmp.path().join("f.txt");
    std::fs::write(&file, "x").unwrap();

    fileutil().arg("mkdir").arg(&a).assert().success();

    fileutil()
        .arg("exists")
        .arg(&a)
        .assert()
        .success()
        .stdout("folder\n");
    fileutil()
        .arg("exists")
        .arg(&file)
        .assert()
        .success()
        .stdout("file\n");
    fileutil()
        .arg("exists")
        .arg(tmp.path().join("missing"))
        .assert()
        .success()
        .stdout("missing\n");
}

// ─── Vdisk ───────────────────────────────────────────────────────────────────

#[test]
fn test_vdisk_help_lists_flags() {
    fileutil()
        .args(["vdisk", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--file"))
        .stdout(predicate::str::contains("--size-gb"))
        .stdout(predicate::str::contains("--mount-point"))
        .stdout(predicate::str::contains("--no-truncate"))
        .stdout(predicate::str::contains("--mount ").not());
}

// ─── Completions ─────────────────────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    fileutil()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fileutil"));
}
