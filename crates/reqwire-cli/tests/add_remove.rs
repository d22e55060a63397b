use std::fs;
use std::path::Path;

mod common;
use common::reqwire;

fn init_main(dir: &Path) {
    reqwire(dir).args(["init", "-t", "main"]).assert().success();
}

fn offline_add(dir: &Path, specifier: &str) {
    reqwire(dir)
        .args([
            "add",
            "--no-resolve-versions",
            "--no-resolve-canonical-names",
            "-t",
            "main",
            specifier,
        ])
        .assert()
        .success();
}

fn main_in(dir: &Path) -> String {
    fs::read_to_string(dir.join("requirements/src/main.in")).expect("read main.in")
}

#[test]
fn add_requires_init_first() {
    let temp = tempfile::tempdir().expect("tempdir");
    let assert = reqwire(temp.path())
        .args(["add", "flask"])
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("reqwire init"));
}

#[test]
fn offline_add_writes_the_specifier_as_typed() {
    let temp = tempfile::tempdir().expect("tempdir");
    init_main(temp.path());
    offline_add(temp.path(), "flask");
    assert!(main_in(temp.path()).ends_with("flask\n"));
}

#[test]
fn pinned_add_needs_no_resolution() {
    let temp = tempfile::tempdir().expect("tempdir");
    init_main(temp.path());
    reqwire(temp.path())
        .args([
            "add",
            "--no-resolve-canonical-names",
            "-t",
            "main",
            "flask==0.11.1",
        ])
        .assert()
        .success();
    assert!(main_in(temp.path()).ends_with("flask==0.11.1\n"));
}

#[test]
fn editable_packages_use_the_editable_flag() {
    let temp = tempfile::tempdir().expect("tempdir");
    init_main(temp.path());
    reqwire(temp.path())
        .args([
            "add",
            "--no-resolve-versions",
            "--no-resolve-canonical-names",
            "-t",
            "main",
            "-e",
            "./pkg/local",
        ])
        .assert()
        .success();
    assert!(main_in(temp.path()).contains("-e ./pkg/local\n"));
}

#[test]
fn add_deduplicates_repeated_specifiers() {
    let temp = tempfile::tempdir().expect("tempdir");
    init_main(temp.path());
    offline_add(temp.path(), "flask==0.11.1");
    offline_add(temp.path(), "flask == 0.11.1");
    let contents = main_in(temp.path());
    assert_eq!(contents.matches("flask==0.11.1").count(), 1);
}

#[test]
fn remove_drops_only_matching_names() {
    let temp = tempfile::tempdir().expect("tempdir");
    init_main(temp.path());
    offline_add(temp.path(), "flask==0.11.1");
    offline_add(temp.path(), "requests==2.32.3");

    reqwire(temp.path())
        .args(["remove", "-t", "main", "flask"])
        .assert()
        .success();
    let contents = main_in(temp.path());
    assert!(!contents.contains("flask"));
    assert!(contents.contains("requests==2.32.3"));
}

#[test]
fn remove_of_an_absent_package_is_a_quiet_noop() {
    let temp = tempfile::tempdir().expect("tempdir");
    init_main(temp.path());
    offline_add(temp.path(), "flask==0.11.1");
    let before = fs::read(temp.path().join("requirements/src/main.in")).expect("read");

    reqwire(temp.path())
        .args(["remove", "-t", "main", "uvicorn"])
        .assert()
        .success();
    let after = fs::read(temp.path().join("requirements/src/main.in")).expect("read");
    assert_eq!(before, after);
}
