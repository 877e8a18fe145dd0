use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use assert_cmd::Command;
use predicates::prelude::*;

static TEST_ROOT_COUNTER: AtomicU64 = AtomicU64::new(0);

fn test_root() -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!(
        "appswap-cli-tests-{}-{}",
        std::process::id(),
        TEST_ROOT_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    let _ = fs::remove_dir_all(&path);
    fs::create_dir_all(&path).expect("must create test root");
    path
}

fn appswap() -> Command {
    let mut cmd = Command::cargo_bin("appswap").expect("binary must build");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("must create parent");
    }
    fs::write(path, contents).expect("must write file");
}

#[test]
fn two_arguments_exit_with_code_one_and_leave_target_alone() {
    let root = test_root();
    let target = root.join("install");
    write(&target.join("app"), "old app");

    appswap()
        .arg(root.join("staging"))
        .arg(&target)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error: Invalid arguments"))
        .stderr(predicate::str::contains("got 2"));

    assert_eq!(fs::read_to_string(target.join("app")).unwrap(), "old app");
    assert_eq!(fs::read_dir(&target).unwrap().count(), 1);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn missing_source_exits_with_code_two() {
    let root = test_root();

    appswap()
        .arg(root.join("missing"))
        .arg(root.join("install"))
        .arg("app")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("source directory not found"));

    assert!(!root.join("install").exists());
    let _ = fs::remove_dir_all(&root);
}

#[test]
fn missing_executable_after_copy_exits_with_code_four() {
    let root = test_root();
    let source = root.join("staging");
    write(&source.join("data.json"), "{}");

    appswap()
        .arg(&source)
        .arg(root.join("install"))
        .arg("appswap-fixture-absent")
        .assert()
        .code(4);

    assert!(root.join("install").join("data.json").is_file());
    let _ = fs::remove_dir_all(&root);
}

#[cfg(unix)]
#[test]
fn update_copies_payload_and_restarts_app() {
    use std::os::unix::fs::PermissionsExt;

    let root = test_root();
    let source = root.join("staging");
    let target = root.join("install");
    let app = source.join("appswap-fixture-app");
    write(&app, "#!/bin/sh\nexit 0\n");
    fs::set_permissions(&app, fs::Permissions::from_mode(0o755)).expect("must chmod");
    write(&source.join("sub").join("lib.so"), "lib v2");
    write(&target.join("LocalConfig.ini"), "server=prod");

    appswap()
        .arg(format!("{}/", source.display()))
        .arg(&target)
        .arg("appswap-fixture-app")
        .assert()
        .success();

    assert!(target.join("appswap-fixture-app").is_file());
    assert_eq!(
        fs::read_to_string(target.join("sub").join("lib.so")).unwrap(),
        "lib v2"
    );
    assert_eq!(
        fs::read_to_string(target.join("LocalConfig.ini")).unwrap(),
        "server=prod"
    );
    assert!(!target.join("_update_backup_").exists());

    let _ = fs::remove_dir_all(&root);
}
