use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use time::OffsetDateTime;

use reqwire_domain::{
    build_source_header, write_requirements, ReqwireError, RequirementFile, Result, Specifier,
};

use crate::config::Config;
use crate::index::resolve_canonical_name;
use crate::resolve::{resolve_specifier, BestMatch, ResolveAll};

/// Knobs for building a specifier set during `add`.
#[derive(Clone, Copy, Debug)]
pub struct BuildOptions {
    /// Write the resolved exact pin instead of the constraint as typed.
    pub pin: bool,
    /// Allow prerelease versions to satisfy loose specifiers.
    pub prereleases: bool,
    /// Query the package indexes for canonical package names.
    pub resolve_canonical_names: bool,
    /// Query the package indexes for the best matching version.
    pub resolve_versions: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            pin: true,
            prereleases: false,
            resolve_canonical_names: true,
            resolve_versions: true,
        }
    }
}

/// One `add` invocation across one or more tags.
#[derive(Clone, Debug)]
pub struct AddRequest {
    pub specifiers: Vec<String>,
    pub tags: Vec<String>,
    pub options: BuildOptions,
}

#[derive(Debug, Default)]
pub struct InitReport {
    pub created: Vec<PathBuf>,
}

#[derive(Debug, Default)]
pub struct AddReport {
    pub written: Vec<PathBuf>,
}

#[derive(Debug, Default)]
pub struct RemoveReport {
    /// `(tag, rendered specifier)` pairs actually removed.
    pub removed: Vec<(String, String)>,
}

#[derive(Debug, Default)]
pub struct BuildReport {
    pub written: Vec<PathBuf>,
}

/// Path of a tagged requirements file under `working_directory/prefix`.
pub fn build_filename(
    working_directory: &Path,
    tag_name: &str,
    extension: &str,
    prefix: &str,
) -> PathBuf {
    working_directory
        .join(prefix)
        .join(format!("{tag_name}{extension}"))
}

/// Create one directory level under the requirements directory.
pub fn init_source_dir(working_directory: &Path, name: &str, exist_ok: bool) -> Result<PathBuf> {
    fs::create_dir_all(working_directory)
        .map_err(|err| ReqwireError::io("create", working_directory, err))?;
    let path = working_directory.join(name);
    match fs::create_dir(&path) {
        Ok(()) => Ok(path),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists && exist_ok => Ok(path),
        Err(err) => Err(ReqwireError::io("create", &path, err)),
    }
}

/// Seed the requirements directory layout plus one source file per tag.
pub fn init(
    config: &Config,
    force: bool,
    index_url: Option<&str>,
    extra_index_urls: &[String],
    tags: &[String],
) -> Result<InitReport> {
    let mut report = InitReport::default();
    report
        .created
        .push(init_source_dir(&config.directory, &config.source_dir, force)?);
    report
        .created
        .push(init_source_dir(&config.directory, &config.build_dir, force)?);
    for tag_name in tags {
        report
            .created
            .push(init_source_file(config, tag_name, index_url, extra_index_urls)?);
    }
    Ok(report)
}

/// Seed a tag's source file with a generated header.
///
/// An existing file keeps its requirements and nested references. A
/// CLI-declared index URL that conflicts with the primary index URL already
/// recorded in the file is a configuration error, never a silent override.
pub fn init_source_file(
    config: &Config,
    tag_name: &str,
    index_url: Option<&str>,
    extra_index_urls: &[String],
) -> Result<PathBuf> {
    let path = config.source_file(tag_name);
    let file = RequirementFile::new(&path)?;
    if let (Some(declared), Some(existing)) = (index_url, file.index_url()) {
        if declared != existing {
            return Err(ReqwireError::IndexUrlMismatch {
                declared: declared.to_string(),
                existing: existing.to_string(),
                path,
            });
        }
    }

    let primary = index_url
        .map(str::to_string)
        .or_else(|| file.index_url().map(str::to_string));
    let mut extras: IndexSet<String> = file.extra_index_urls().into_iter().collect();
    extras.extend(extra_index_urls.iter().cloned());
    let extras: Vec<String> = extras
        .into_iter()
        .filter(|url| Some(url.as_str()) != primary.as_deref())
        .collect();

    let header = build_source_header(
        primary.as_deref(),
        &extras,
        &file.nested_cfile_refs(),
        &file.nested_rfile_refs(),
        OffsetDateTime::now_utc(),
    );
    write_requirements(&path, file.requirements(), Some(&header))?;
    Ok(path)
}

/// The `add` flow: resolve the given specifier lines once per tag and union
/// them into each tag's source file.
///
/// Index URLs declared by any requested tag apply to lookups for all of
/// them, so a single `--extra-index-url` declaration covers the whole
/// invocation. Tags are processed strictly in order; when resolution fails
/// partway, files written for earlier tags stay on disk.
pub fn add(config: &Config, request: &AddRequest, best_match: &dyn BestMatch) -> Result<AddReport> {
    let mut lookup_index_urls = IndexSet::new();
    for tag_name in &request.tags {
        let path = config.source_file(tag_name);
        if path.exists() {
            let file = RequirementFile::new(&path)?;
            lookup_index_urls.extend(file.index_urls().iter().cloned());
        }
    }

    let mut report = AddReport::default();
    for tag_name in &request.tags {
        tracing::info!(tag = %tag_name, "saving requirements");
        let path = extend_source_file(
            config,
            tag_name,
            &request.specifiers,
            &lookup_index_urls,
            request.options,
            best_match,
        )?;
        report.written.push(path);
    }
    Ok(report)
}

/// Merge newly resolved specifiers into one tag's source file and rewrite
/// it with a header carrying the file's own index URLs and nested
/// references.
pub fn extend_source_file(
    config: &Config,
    tag_name: &str,
    specifiers: &[String],
    lookup_index_urls: &IndexSet<String>,
    options: BuildOptions,
    best_match: &dyn BestMatch,
) -> Result<PathBuf> {
    let path = config.source_file(tag_name);
    let mut file = RequirementFile::new(&path)?;
    let additions = build_specifier_set(specifiers, lookup_index_urls, options, best_match)?;
    file.extend_requirements(additions);
    rewrite_source_file(&file)?;
    Ok(path)
}

/// Build the deduplicated specifier set for one `add` invocation.
pub fn build_specifier_set(
    specifiers: &[String],
    index_urls: &IndexSet<String>,
    options: BuildOptions,
    best_match: &dyn BestMatch,
) -> Result<IndexSet<Specifier>> {
    let mut lines: Vec<&String> = specifiers.iter().collect();
    lines.sort();

    let mut out = IndexSet::new();
    for line in lines {
        let resolved = resolve_specifier(
            line,
            options.prereleases,
            options.resolve_versions,
            index_urls,
            best_match,
        )?;
        let mut specifier = if options.pin {
            resolved
        } else {
            Specifier::parse(line)?
        };
        if options.resolve_canonical_names && !specifier.is_editable() {
            if let Some(name) = specifier.name() {
                let canonical = resolve_canonical_name(&name, index_urls)?;
                specifier = specifier.with_name(&canonical)?;
            }
        }
        out.insert(specifier);
    }
    Ok(out)
}

/// The `remove` flow: drop every specifier matching the given package names
/// from each tag's source file. Names absent from a file are logged and
/// skipped; a file nothing was removed from is left byte-for-byte intact.
pub fn remove(config: &Config, tags: &[String], specifiers: &[String]) -> Result<RemoveReport> {
    let mut report = RemoveReport::default();
    for tag_name in tags {
        let path = config.source_file(tag_name);
        if !path.exists() {
            tracing::warn!(path = %path.display(), "requirements file does not exist");
            continue;
        }
        let mut file = RequirementFile::new(&path)?;
        let mut changed = false;
        for raw in specifiers {
            let target = Specifier::parse(raw)?;
            let Some(name) = target.name() else {
                continue;
            };
            let removed = file.remove_by_name(&name);
            if removed.is_empty() {
                tracing::info!(package = %name, tag = %tag_name, "package not present; nothing to remove");
                continue;
            }
            changed = true;
            for specifier in removed {
                tracing::info!(package = %name, tag = %tag_name, "removed");
                report
                    .removed
                    .push((tag_name.clone(), specifier.render().to_string()));
            }
        }
        if changed {
            rewrite_source_file(&file)?;
        }
    }
    Ok(report)
}

/// The `build` flow for explicit tags, or for every source file present
/// when `tags` is empty.
pub fn build(
    config: &Config,
    tags: &[String],
    prereleases: bool,
    resolver: &dyn ResolveAll,
) -> Result<BuildReport> {
    let dest_dir = config.build_path();
    if !dest_dir.exists() {
        fs::create_dir_all(&dest_dir).map_err(|err| ReqwireError::io("create", &dest_dir, err))?;
    }
    let tags = if tags.is_empty() {
        source_tags(config)?
    } else {
        tags.to_vec()
    };

    let mut report = BuildReport::default();
    for tag_name in &tags {
        tracing::info!(tag = %tag_name, "building");
        report
            .written
            .push(build_tag(config, tag_name, prereleases, resolver)?);
    }
    Ok(report)
}

/// Resolve one tag's source constraints into its fully pinned build file.
pub fn build_tag(
    config: &Config,
    tag_name: &str,
    prereleases: bool,
    resolver: &dyn ResolveAll,
) -> Result<PathBuf> {
    let source = config.source_file(tag_name);
    let file = RequirementFile::new(&source)?;
    let pinned = resolver.resolve_all(file.requirements(), prereleases)?;
    let dest = config.build_file(tag_name);
    let header = build_source_header(
        file.index_url(),
        &file.extra_index_urls(),
        &[],
        &[],
        OffsetDateTime::now_utc(),
    );
    write_requirements(&dest, &pinned, Some(&header))?;
    Ok(dest)
}

fn rewrite_source_file(file: &RequirementFile) -> Result<()> {
    let header = build_source_header(
        file.index_url(),
        &file.extra_index_urls(),
        &file.nested_cfile_refs(),
        &file.nested_rfile_refs(),
        OffsetDateTime::now_utc(),
    );
    write_requirements(file.path(), file.requirements(), Some(&header))
}

fn source_tags(config: &Config) -> Result<Vec<String>> {
    let dir = config.source_path();
    let entries = fs::read_dir(&dir).map_err(|err| ReqwireError::io("read", &dir, err))?;
    let mut tags = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| ReqwireError::io("read", &dir, err))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(stem) = name.strip_suffix(config.extension.as_str()) {
            if !stem.is_empty() {
                tags.push(stem.to_string());
            }
        }
    }
    tags.sort();
    Ok(tags)
}
