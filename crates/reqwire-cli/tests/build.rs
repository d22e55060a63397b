mod common;
use common::reqwire;

#[test]
fn build_requires_init_first() {
    let temp = tempfile::tempdir().expect("tempdir");
    let assert = reqwire(temp.path()).args(["build", "-a"]).assert().failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("reqwire init"));
}

#[test]
fn build_requires_a_tag_selection() {
    let temp = tempfile::tempdir().expect("tempdir");
    reqwire(temp.path()).args(["init", "-t", "main"]).assert().success();
    let assert = reqwire(temp.path()).arg("build").assert().failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("--all") && stderr.contains("--tag"));
}

#[test]
fn all_conflicts_with_explicit_tags() {
    let temp = tempfile::tempdir().expect("tempdir");
    reqwire(temp.path()).args(["init", "-t", "main"]).assert().success();
    reqwire(temp.path())
        .args(["build", "-a", "-t", "main"])
        .assert()
        .failure();
}
