use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;

use crate::error::{ReqwireError, Result};
use crate::specifier::{canonicalize_package_name, Specifier};

/// A nested `-r`/`-c` include: the reference exactly as written in the
/// parent file, plus the parsed file it points at.
#[derive(Clone, Debug)]
pub struct NestedRef {
    reference: String,
    file: RequirementFile,
}

impl NestedRef {
    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn file(&self) -> &RequirementFile {
        &self.file
    }
}

/// The structured in-memory model of one requirements file.
///
/// Specifiers are held in an ordered set sorted by rendered form, so
/// iteration order is deterministic while membership stays set-based. Index
/// URLs keep declaration order with the primary URL first. Nested includes
/// are parsed recursively; a file re-entered while still on the parse stack
/// fails with [`ReqwireError::CyclicInclude`] rather than recursing forever.
#[derive(Clone, Debug)]
pub struct RequirementFile {
    path: PathBuf,
    requirements: IndexSet<Specifier>,
    index_urls: IndexSet<String>,
    nested_cfiles: Vec<NestedRef>,
    nested_rfiles: Vec<NestedRef>,
}

impl RequirementFile {
    /// Build a model for `path`, eagerly parsing the file when it exists.
    /// A missing file yields an empty model.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.exists() {
            let mut stack = IndexSet::new();
            parse_file(&path, &mut stack)
        } else {
            Ok(Self::empty(path))
        }
    }

    /// Build a model around an explicit specifier set without touching disk.
    pub fn with_requirements(path: impl Into<PathBuf>, requirements: IndexSet<Specifier>) -> Self {
        let mut file = Self::empty(path.into());
        file.requirements = requirements;
        file.requirements.sort();
        file
    }

    fn empty(path: PathBuf) -> Self {
        Self {
            path,
            requirements: IndexSet::new(),
            index_urls: IndexSet::new(),
            nested_cfiles: Vec::new(),
            nested_rfiles: Vec::new(),
        }
    }

    /// Re-parse the file from disk, replacing the specifier set, index URLs,
    /// and both nested reference sets.
    pub fn reload(&mut self) -> Result<()> {
        let mut stack = IndexSet::new();
        let parsed = parse_file(&self.path, &mut stack)?;
        self.requirements = parsed.requirements;
        self.index_urls = parsed.index_urls;
        self.nested_cfiles = parsed.nested_cfiles;
        self.nested_rfiles = parsed.nested_rfiles;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn requirements(&self) -> &IndexSet<Specifier> {
        &self.requirements
    }

    pub fn index_urls(&self) -> &IndexSet<String> {
        &self.index_urls
    }

    /// The primary index URL, when any index URL is declared.
    pub fn index_url(&self) -> Option<&str> {
        self.index_urls.first().map(String::as_str)
    }

    /// Every declared index URL after the primary one.
    pub fn extra_index_urls(&self) -> Vec<String> {
        self.index_urls.iter().skip(1).cloned().collect()
    }

    pub fn nested_cfiles(&self) -> &[NestedRef] {
        &self.nested_cfiles
    }

    pub fn nested_rfiles(&self) -> &[NestedRef] {
        &self.nested_rfiles
    }

    pub fn nested_cfile_refs(&self) -> Vec<String> {
        self.nested_cfiles
            .iter()
            .map(|nested| nested.reference.clone())
            .collect()
    }

    pub fn nested_rfile_refs(&self) -> Vec<String> {
        self.nested_rfiles
            .iter()
            .map(|nested| nested.reference.clone())
            .collect()
    }

    /// Union new specifiers into the set, keeping it sorted by rendering.
    /// An addition whose rendered form is already present is a no-op.
    pub fn extend_requirements(&mut self, additions: impl IntoIterator<Item = Specifier>) {
        for specifier in additions {
            self.requirements.insert(specifier);
        }
        self.requirements.sort();
    }

    /// Remove every specifier whose package name matches `name`
    /// (name-only comparison under canonical name folding) and return the
    /// removed entries.
    pub fn remove_by_name(&mut self, name: &str) -> Vec<Specifier> {
        let target = canonicalize_package_name(name);
        let removed: Vec<Specifier> = self
            .requirements
            .iter()
            .filter(|specifier| specifier_matches_name(specifier, &target))
            .cloned()
            .collect();
        if !removed.is_empty() {
            self.requirements
                .retain(|specifier| !specifier_matches_name(specifier, &target));
        }
        removed
    }
}

fn specifier_matches_name(specifier: &Specifier, canonical_target: &str) -> bool {
    specifier
        .name()
        .is_some_and(|name| canonicalize_package_name(&name) == canonical_target)
}

fn parse_file(path: &Path, stack: &mut IndexSet<PathBuf>) -> Result<RequirementFile> {
    let canonical = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if !stack.insert(canonical.clone()) {
        return Err(ReqwireError::CyclicInclude {
            path: path.to_path_buf(),
        });
    }
    let parsed = parse_lines(path, stack);
    stack.shift_remove(&canonical);
    parsed
}

fn parse_lines(path: &Path, stack: &mut IndexSet<PathBuf>) -> Result<RequirementFile> {
    tracing::debug!(path=%path.display(), "parsing requirements file");
    let contents =
        fs::read_to_string(path).map_err(|err| ReqwireError::io("read", path, err))?;
    let base_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut specifiers = Vec::new();
    let mut primary_index = None;
    let mut extra_indexes = Vec::new();
    let mut nested_cfiles: Vec<NestedRef> = Vec::new();
    let mut nested_rfiles: Vec<NestedRef> = Vec::new();

    for raw_line in contents.lines() {
        let line = strip_comment(raw_line);
        if line.is_empty() {
            continue;
        }
        if let Some(target) = option_value(line, &["--requirement", "-r"]) {
            let file = parse_file(&join_reference(base_dir, target), stack)?;
            nested_rfiles.push(NestedRef {
                reference: target.to_string(),
                file,
            });
        } else if let Some(target) = option_value(line, &["--constraint", "-c"]) {
            let file = parse_file(&join_reference(base_dir, target), stack)?;
            nested_cfiles.push(NestedRef {
                reference: target.to_string(),
                file,
            });
        } else if let Some(url) = option_value(line, &["--index-url", "-i"]) {
            primary_index = Some(url.to_string());
        } else if let Some(url) = option_value(line, &["--extra-index-url"]) {
            extra_indexes.push(url.to_string());
        } else if line.starts_with("-e ") || line.starts_with("--editable ") {
            specifiers.push(Specifier::parse(line)?);
        } else if line.starts_with('-') {
            // Other dashed lines are options for the installer, not requirements.
            continue;
        } else {
            specifiers.push(Specifier::parse(line)?);
        }
    }

    specifiers.sort();
    let mut requirements: IndexSet<Specifier> = specifiers.into_iter().collect();
    // Own specifiers never shadow content attributed to included requirement files.
    requirements.retain(|specifier| {
        !nested_rfiles
            .iter()
            .any(|nested| nested.file.requirements.contains(specifier))
    });

    let mut index_urls = IndexSet::new();
    if let Some(primary) = primary_index {
        index_urls.insert(primary);
    }
    index_urls.extend(extra_indexes);

    Ok(RequirementFile {
        path: path.to_path_buf(),
        requirements,
        index_urls,
        nested_cfiles,
        nested_rfiles,
    })
}

fn strip_comment(line: &str) -> &str {
    let trimmed = line.trim();
    if let Some(idx) = trimmed.find('#') {
        let before = &trimmed[..idx];
        if idx == 0 || before.chars().last().is_some_and(char::is_whitespace) {
            return before.trim_end();
        }
    }
    trimmed
}

fn option_value<'a>(line: &'a str, aliases: &[&str]) -> Option<&'a str> {
    for alias in aliases {
        if let Some(rest) = line.strip_prefix(alias) {
            if rest.starts_with([' ', '=']) {
                let value = rest.trim_start_matches([' ', '=']).trim();
                if !value.is_empty() {
                    return Some(value);
                }
            }
        }
    }
    None
}

fn join_reference(base_dir: &Path, target: &str) -> PathBuf {
    let target = Path::new(target);
    if target.is_absolute() {
        target.to_path_buf()
    } else {
        base_dir.join(target)
    }
}
