use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use pep440_rs::{Operator, Version, VersionSpecifiers};
use pep508_rs::{Requirement, VersionOrUrl};

use crate::error::{ReqwireError, Result};

/// A single parsed requirement line.
///
/// Identity is the canonical rendering: two specifiers parsed from
/// differently formatted but semantically identical lines compare equal and
/// hash identically, so they collapse inside a set. The type is immutable
/// after construction; name rewrites go through [`Specifier::with_name`],
/// which returns a new value and leaves the original untouched.
#[derive(Clone, Debug)]
pub struct Specifier {
    kind: SpecifierKind,
    options: Vec<String>,
    rendered: String,
}

#[derive(Clone, Debug)]
enum SpecifierKind {
    Requirement(Box<Requirement>),
    Editable(String),
}

impl Specifier {
    /// Parse one requirement line.
    ///
    /// Recognized forms: plain names, pep508 requirements with extras,
    /// version operators and environment markers, direct URL requirements
    /// (`name @ url`), editable installs (`-e`/`--editable`), and trailing
    /// inline options (`--hash=...`), which are preserved verbatim.
    pub fn parse(line: &str) -> Result<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Err(malformed(line, "empty specifier"));
        }
        let (head, options) = split_inline_options(trimmed);
        let kind = if let Some(rest) = head
            .strip_prefix("-e ")
            .or_else(|| head.strip_prefix("--editable "))
        {
            let target = rest.trim();
            if target.is_empty() {
                return Err(malformed(line, "editable specifier without a target"));
            }
            SpecifierKind::Editable(target.to_string())
        } else if head.starts_with('-') {
            return Err(malformed(line, "not a requirement specifier"));
        } else {
            let requirement = Requirement::from_str(head)
                .map_err(|err| malformed(line, &err.to_string()))?;
            SpecifierKind::Requirement(Box::new(requirement))
        };
        Ok(Self::from_parts(kind, options))
    }

    fn from_parts(kind: SpecifierKind, options: Vec<String>) -> Self {
        let rendered = render(&kind, &options);
        Self {
            kind,
            options,
            rendered,
        }
    }

    /// The canonical textual form; the single source of truth for equality,
    /// hashing, and on-disk ordering.
    pub fn render(&self) -> &str {
        &self.rendered
    }

    /// The package name as written, or `None` for editable installs.
    pub fn name(&self) -> Option<String> {
        match &self.kind {
            SpecifierKind::Requirement(req) => Some(req.name.to_string()),
            SpecifierKind::Editable(_) => None,
        }
    }

    pub fn is_editable(&self) -> bool {
        matches!(self.kind, SpecifierKind::Editable(_))
    }

    /// The editable target or direct URL, if any.
    pub fn link(&self) -> Option<String> {
        match &self.kind {
            SpecifierKind::Editable(target) => Some(target.clone()),
            SpecifierKind::Requirement(req) => match &req.version_or_url {
                Some(VersionOrUrl::Url(url)) => Some(url.to_string()),
                _ => None,
            },
        }
    }

    pub fn version_specifiers(&self) -> Option<&VersionSpecifiers> {
        match &self.kind {
            SpecifierKind::Requirement(req) => match &req.version_or_url {
                Some(VersionOrUrl::VersionSpecifier(specifiers)) => Some(specifiers),
                _ => None,
            },
            SpecifierKind::Editable(_) => None,
        }
    }

    /// The environment marker expression, if any.
    pub fn marker(&self) -> Option<String> {
        match &self.kind {
            SpecifierKind::Requirement(req) => req.marker.as_ref().map(ToString::to_string),
            SpecifierKind::Editable(_) => None,
        }
    }

    /// Whether the constraint pins an exact version (`==`/`===`, nothing else).
    pub fn is_pinned(&self) -> bool {
        let Some(specifiers) = self.version_specifiers() else {
            return false;
        };
        let mut iter = specifiers.iter();
        let Some(first) = iter.next() else {
            return false;
        };
        iter.next().is_none()
            && matches!(first.operator(), Operator::Equal | Operator::ExactEqual)
    }

    /// A copy of this specifier under a different package name.
    ///
    /// Editable specifiers carry no name and are returned unchanged.
    pub fn with_name(&self, name: &str) -> Result<Self> {
        match &self.kind {
            SpecifierKind::Editable(_) => Ok(self.clone()),
            SpecifierKind::Requirement(req) => {
                let line = render_requirement(req, name);
                let requirement = Requirement::from_str(&line)
                    .map_err(|err| malformed(&line, &err.to_string()))?;
                Ok(Self::from_parts(
                    SpecifierKind::Requirement(Box::new(requirement)),
                    self.options.clone(),
                ))
            }
        }
    }

    /// A copy of this specifier pinned to an exact version, keeping name,
    /// extras, and markers. Inline options are dropped: they described the
    /// unpinned line, not the chosen release.
    pub fn pinned_to(&self, version: &Version) -> Result<Self> {
        match &self.kind {
            SpecifierKind::Editable(_) => Ok(self.clone()),
            SpecifierKind::Requirement(req) => {
                let mut line = req.name.to_string();
                push_extras(&mut line, req);
                line.push_str("==");
                line.push_str(&version.to_string());
                if let Some(marker) = &req.marker {
                    line.push_str(" ; ");
                    line.push_str(&marker.to_string());
                }
                Self::parse(&line)
            }
        }
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

impl PartialEq for Specifier {
    fn eq(&self, other: &Self) -> bool {
        self.rendered == other.rendered
    }
}

impl Eq for Specifier {}

impl Hash for Specifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rendered.hash(state);
    }
}

impl PartialOrd for Specifier {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Specifier {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rendered.cmp(&other.rendered)
    }
}

/// Lowercase a package name and fold `_`/`.` separators to `-`.
pub fn canonicalize_package_name(name: &str) -> String {
    name.to_ascii_lowercase().replace(['_', '.'], "-")
}

fn render(kind: &SpecifierKind, options: &[String]) -> String {
    let mut out = match kind {
        SpecifierKind::Requirement(req) => render_requirement(req, &req.name.to_string()),
        SpecifierKind::Editable(target) => format!("-e {target}"),
    };
    for option in options {
        out.push(' ');
        out.push_str(option);
    }
    out
}

fn render_requirement(req: &Requirement, name: &str) -> String {
    let mut out = String::from(name);
    push_extras(&mut out, req);
    match &req.version_or_url {
        Some(VersionOrUrl::VersionSpecifier(specifiers)) => {
            let rendered: Vec<String> = specifiers.iter().map(ToString::to_string).collect();
            out.push_str(&rendered.join(","));
        }
        Some(VersionOrUrl::Url(url)) => {
            out.push_str(" @ ");
            out.push_str(&url.to_string());
        }
        None => {}
    }
    if let Some(marker) = &req.marker {
        out.push_str(" ; ");
        out.push_str(&marker.to_string());
    }
    out
}

fn push_extras(out: &mut String, req: &Requirement) {
    if req.extras.is_empty() {
        return;
    }
    out.push('[');
    let extras: Vec<String> = req.extras.iter().map(ToString::to_string).collect();
    out.push_str(&extras.join(","));
    out.push(']');
}

fn split_inline_options(line: &str) -> (&str, Vec<String>) {
    match line.find(" --") {
        Some(idx) => {
            let (head, tail) = line.split_at(idx);
            let options = tail.split_whitespace().map(str::to_string).collect();
            (head.trim_end(), options)
        }
        None => (line, Vec::new()),
    }
}

fn malformed(line: &str, reason: &str) -> ReqwireError {
    ReqwireError::MalformedSpecifier {
        line: line.to_string(),
        reason: reason.to_string(),
    }
}
