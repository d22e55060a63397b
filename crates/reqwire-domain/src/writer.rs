use std::io::Write;
use std::path::Path;

use indexmap::IndexSet;
use tempfile::NamedTempFile;

use crate::error::{ReqwireError, Result};
use crate::specifier::Specifier;

/// Write `requirements` to `path`, replacing any existing file atomically.
///
/// The body is the set rendered in sorted-by-rendered-string order, one
/// specifier per line with a trailing newline; `header` is written verbatim
/// first. The content is written to a temporary file in the destination
/// directory and persisted over the target, so a concurrent reader sees
/// either the old file or the new one, never a truncated mix. Rewriting an
/// already canonical set with the same header is byte-identical.
pub fn write_requirements(
    path: &Path,
    requirements: &IndexSet<Specifier>,
    header: Option<&str>,
) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged =
        NamedTempFile::new_in(parent).map_err(|err| ReqwireError::io("stage", path, err))?;

    if let Some(header) = header {
        staged
            .write_all(header.as_bytes())
            .map_err(|err| ReqwireError::io("write", path, err))?;
    }
    let mut sorted: Vec<&Specifier> = requirements.iter().collect();
    sorted.sort();
    for specifier in sorted {
        writeln!(staged, "{specifier}").map_err(|err| ReqwireError::io("write", path, err))?;
    }

    staged
        .persist(path)
        .map_err(|err| ReqwireError::io("replace", path, err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn set(lines: &[&str]) -> IndexSet<Specifier> {
        lines
            .iter()
            .map(|line| Specifier::parse(line).expect("parse"))
            .collect()
    }

    #[test]
    fn body_is_sorted_with_trailing_newline() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("main.in");
        write_requirements(&path, &set(&["requests>=2.0", "flask==0.11.1"]), None)
            .expect("write");
        let contents = fs::read_to_string(&path).expect("read");
        assert_eq!(contents, "flask==0.11.1\nrequests>=2.0\n");
    }

    #[test]
    fn header_is_written_verbatim_before_the_body() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("main.in");
        write_requirements(&path, &set(&["flask"]), Some("# header\n")).expect("write");
        let contents = fs::read_to_string(&path).expect("read");
        assert_eq!(contents, "# header\nflask\n");
    }

    #[test]
    fn rewriting_a_canonical_set_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("main.in");
        let requirements = set(&["flask==0.11.1", "requests>=2.0", "uvicorn"]);
        write_requirements(&path, &requirements, Some("# header\n")).expect("first write");
        let first = fs::read(&path).expect("read");
        write_requirements(&path, &requirements, Some("# header\n")).expect("second write");
        let second = fs::read(&path).expect("read");
        assert_eq!(first, second);
    }

    #[test]
    fn existing_file_is_replaced_whole() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("main.in");
        fs::write(&path, "stale content\n").expect("seed");
        write_requirements(&path, &set(&["flask"]), None).expect("write");
        assert_eq!(fs::read_to_string(&path).expect("read"), "flask\n");
    }
}
