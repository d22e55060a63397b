use std::fs;
use std::process::Command;

use indexmap::IndexSet;
use reqwire_core::{ReqwireError, ResolveAll, Result, Specifier};

/// Full-graph resolution through an external `pip-compile` executable.
///
/// Constraints are staged into a temporary source file, compiled with
/// `--output-file` into a sibling temporary path, and the pinned result is
/// parsed back into specifiers.
pub struct PipCompileResolver {
    extra_options: Vec<String>,
}

impl PipCompileResolver {
    pub fn new(extra_options: Vec<String>) -> Self {
        Self { extra_options }
    }
}

impl ResolveAll for PipCompileResolver {
    fn resolve_all(
        &self,
        constraints: &IndexSet<Specifier>,
        prereleases: bool,
    ) -> Result<IndexSet<Specifier>> {
        let binary = which::which("pip-compile").map_err(|err| ReqwireError::Resolution {
            reason: format!("pip-compile not found: {err}"),
        })?;
        let staging = tempfile::tempdir().map_err(|err| ReqwireError::Resolution {
            reason: format!("failed to stage constraints: {err}"),
        })?;
        let source = staging.path().join("constraints.in");
        let output = staging.path().join("constraints.txt");

        let mut body = String::new();
        for specifier in constraints {
            body.push_str(specifier.render());
            body.push('\n');
        }
        fs::write(&source, body).map_err(|err| ReqwireError::io("write", &source, err))?;

        let mut command = Command::new(binary);
        command.arg("--quiet").arg("--output-file").arg(&output);
        if prereleases {
            command.arg("--pre");
        }
        command.args(&self.extra_options);
        command.arg(&source);
        tracing::debug!(command = ?command, "running pip-compile");
        let status = command.status().map_err(|err| ReqwireError::Resolution {
            reason: format!("failed to run pip-compile: {err}"),
        })?;
        if !status.success() {
            return Err(ReqwireError::Resolution {
                reason: format!("pip-compile exited with {status}"),
            });
        }

        let compiled =
            fs::read_to_string(&output).map_err(|err| ReqwireError::io("read", &output, err))?;
        let mut resolved = IndexSet::new();
        for line in compiled.lines() {
            let line = match line.find(" #") {
                Some(idx) => line[..idx].trim(),
                None => line.trim(),
            };
            if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
                continue;
            }
            resolved.insert(Specifier::parse(line)?);
        }
        Ok(resolved)
    }
}
