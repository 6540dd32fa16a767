use std::fs::{self, File};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command, Stdio};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

fn file_with_mode(path: &Path, mode: u32) {
    File::create(path).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
}

fn dir_with_mode(path: &Path, mode: u32) {
    fs::create_dir(path).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
}

/// Files `a` (rwxr-xr-x), `b` and `c` (rw-r--r--)
fn scenario() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    file_with_mode(&temp_dir.path().join("a"), 0o755);
    file_with_mode(&temp_dir.path().join("c"), 0o644);
    file_with_mode(&temp_dir.path().join("b"), 0o644);
    temp_dir
}

#[test]
fn spfind_prints_sorted_matches_and_total() {
    let temp_dir = scenario();
    let root = temp_dir.path().display().to_string();

    cargo_bin_cmd!("spfind")
        .args(["-d", &root, "-p", "rw-r--r--"])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{root}/b\n{root}/c\nTotal matches: 2\n")))
        .stderr(predicate::str::is_empty());
}

#[test]
fn pfind_prints_each_match_once() {
    let temp_dir = scenario();
    let root = temp_dir.path().display().to_string();

    let output = cargo_bin_cmd!("pfind")
        .args(["-d", &root, "-p", "rw-r--r--"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let mut lines: Vec<String> =
        String::from_utf8(output).unwrap().lines().map(str::to_owned).collect();
    lines.sort();
    assert_eq!(lines, vec![format!("{root}/b"), format!("{root}/c")]);
}

#[test]
fn no_matches_is_success() {
    let temp_dir = scenario();
    let root = temp_dir.path().display().to_string();

    cargo_bin_cmd!("spfind")
        .args(["-d", &root, "-p", "---------"])
        .assert()
        .success()
        .stdout(predicate::str::diff("Total matches: 0\n"));
}

#[test]
fn pattern_starting_with_a_dash_matches() {
    let temp_dir = scenario();
    let root = temp_dir.path().display().to_string();
    file_with_mode(&temp_dir.path().join("sealed"), 0o000);

    cargo_bin_cmd!("spfind")
        .args(["-d", &root, "-p", "---------"])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{root}/sealed\nTotal matches: 1\n")))
        .stderr(predicate::str::is_empty());

    cargo_bin_cmd!("pfind")
        .args(["-d", &root, "--permissions", "---------"])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{root}/sealed\n")));
}

#[test]
fn matches_come_out_sorted_and_counted() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let mut expected = 0;
    for (i, dir) in ["zeta", "alpha", "Mid", "beta"].iter().enumerate() {
        dir_with_mode(&root.join(dir), 0o700);
        for j in (0..5).rev() {
            let mode = if (i + j) % 2 == 0 { 0o640 } else { 0o600 };
            file_with_mode(&root.join(dir).join(format!("f{j}-{i}")), mode);
            if mode == 0o640 {
                expected += 1;
            }
        }
    }

    let root = root.display().to_string();
    let output = cargo_bin_cmd!("spfind")
        .args(["-d", &root, "-p", "rw-r-----"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();
    let mut lines: Vec<&str> = text.lines().collect();
    let summary = lines.pop().unwrap();

    assert_eq!(summary, format!("Total matches: {expected}"));
    assert_eq!(lines.len(), expected);
    assert!(lines.windows(2).all(|pair| pair[0] <= pair[1]), "unsorted: {lines:?}");
}

#[test]
fn wrong_length_pattern_is_rejected_up_front() {
    let temp_dir = scenario();
    let root = temp_dir.path().display().to_string();

    for mut cmd in [cargo_bin_cmd!("pfind"), cargo_bin_cmd!("spfind")] {
        cmd.args(["-d", &root, "-p", "rwx"])
            .assert()
            .failure()
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("rwx"));
    }
}

#[test]
fn foreign_character_is_rejected() {
    cargo_bin_cmd!("spfind")
        .args(["-d", ".", "-p", "rw-r--r-s"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty());
}

#[test]
fn pfind_missing_root_names_the_path() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing").display().to_string();

    cargo_bin_cmd!("pfind")
        .args(["-d", &missing, "-p", "rw-r--r--"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(format!("Error: Cannot stat '{missing}'")));
}

#[test]
fn spfind_missing_root_forwards_diagnostic_and_fails() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing").display().to_string();

    cargo_bin_cmd!("spfind")
        .args(["-d", &missing, "-p", "rw-r--r--"])
        .assert()
        .failure()
        .stdout(predicate::str::diff("Total matches: 0\n"))
        .stderr(predicate::str::contains(missing));
}

#[test]
fn root_that_is_a_file_fails() {
    let temp_dir = scenario();
    let file = temp_dir.path().join("a").display().to_string();

    cargo_bin_cmd!("pfind")
        .args(["-d", &file, "-p", "rw-r--r--"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a directory"));
}

#[test]
fn diagnostics_fail_the_run_but_matches_still_arrive() {
    let temp_dir = scenario();
    let root = temp_dir.path();
    let locked = root.join("locked");
    dir_with_mode(&locked, 0o000);
    if fs::read_dir(&locked).is_ok() {
        // privileged user: nothing is unreadable
        return;
    }
    let root = root.display().to_string();

    cargo_bin_cmd!("spfind")
        .args(["-d", &root, "-p", "rw-r--r--"])
        .assert()
        .failure()
        .stdout(predicate::str::diff(format!("{root}/b\n{root}/c\nTotal matches: 2\n")))
        .stderr(
            predicate::str::contains("Cannot open directory")
                .and(predicate::str::contains("locked")),
        );

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o700)).unwrap();
}

#[test]
fn pfind_fails_cleanly_when_stderr_reader_is_gone() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing");

    let mut child = Command::new(env!("CARGO_BIN_EXE_pfind"))
        .arg("-d")
        .arg(&missing)
        .args(["-p", "rw-r--r--"])
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    drop(child.stderr.take());

    assert_eq!(child.wait().unwrap().code(), Some(1));
}

#[test]
fn log_filter_can_be_raised_from_the_environment() {
    let temp_dir = scenario();
    let root = temp_dir.path().display().to_string();

    // pfind logs to its diagnostic channel too, so the verdict is not checked
    cargo_bin_cmd!("spfind")
        .env("PERMFIND_LOG", "permfind=debug")
        .args(["-d", &root, "-p", "rw-r--r--"])
        .assert()
        .stdout(predicate::str::ends_with("Total matches: 2\n"))
        .stderr(predicate::str::contains("spawned").and(predicate::str::contains("reaped")));
}

#[test]
fn help_exits_zero() {
    for mut cmd in [cargo_bin_cmd!("pfind"), cargo_bin_cmd!("spfind")] {
        cmd.arg("-h")
            .assert()
            .success()
            .stdout(
                predicate::str::contains("--directory")
                    .and(predicate::str::contains("--permissions")),
            );
    }
}

#[test]
fn no_arguments_prints_usage_and_fails() {
    cargo_bin_cmd!("spfind")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
