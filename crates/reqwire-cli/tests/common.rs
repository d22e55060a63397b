#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;

/// A `reqwire` invocation rooted in `dir`, isolated from ambient
/// environment configuration.
pub fn reqwire(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("reqwire").expect("reqwire binary");
    cmd.current_dir(dir);
    for key in [
        "REQWIRE_DIR_BASE",
        "REQWIRE_DIR_SOURCE",
        "REQWIRE_DIR_BUILD",
        "PIP_INDEX_URL",
        "PIP_EXTRA_INDEX_URL",
    ] {
        cmd.env_remove(key);
    }
    cmd
}
