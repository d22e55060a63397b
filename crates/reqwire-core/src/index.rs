use std::fmt::Display;
use std::io::{BufRead, BufReader};
use std::str::FromStr;
use std::time::Duration;

use indexmap::IndexSet;
use pep440_rs::Version;
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;

use reqwire_domain::{canonicalize_package_name, ReqwireError, Result};

/// The default public package index.
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org/simple";

const USER_AGENT: &str = concat!("reqwire/", env!("CARGO_PKG_VERSION"));
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Ask each package index, in order, for the canonical spelling of `name`.
///
/// Each listing page is scanned as a stream of anchor text in document
/// order; within a page the last anchor whose lowercase form equals the
/// lowercased search name wins, and the stream is abandoned as soon as a
/// match state is reached. An index without a match does not stop the
/// search; the next index URL is consulted. With no index URLs provided the
/// default public index is queried.
pub fn resolve_canonical_name(name: &str, index_urls: &IndexSet<String>) -> Result<String> {
    for index_url in urls_or_default(index_urls) {
        if let Some(canonical) = scan_listing(index_url, name)? {
            return Ok(canonical);
        }
    }
    Err(ReqwireError::PackageNotFound {
        name: name.to_string(),
    })
}

/// Collect the release versions published for `name` on one index, newest
/// and oldest alike, from the file anchors of its project page. A missing
/// project page yields an empty list, not an error.
pub fn scan_package_releases(index_url: &str, name: &str) -> Result<Vec<Version>> {
    let canonical = canonicalize_package_name(name);
    let url = format!("{}/{}/", index_url.trim_end_matches('/'), canonical);
    let response = fetch(&url)?;
    if response.status() == StatusCode::NOT_FOUND {
        return Ok(Vec::new());
    }
    if !response.status().is_success() {
        return Err(index_error(&url, &format!("status {}", response.status())));
    }

    let mut scanner = AnchorScanner::new(None);
    let reader = BufReader::new(response);
    for line in reader.lines() {
        let line = line.map_err(|err| index_error(&url, &err))?;
        scanner.feed(&line);
    }
    Ok(scanner
        .into_collected()
        .iter()
        .filter_map(|filename| version_from_filename(filename, &canonical))
        .collect())
}

pub(crate) fn urls_or_default(index_urls: &IndexSet<String>) -> Vec<&str> {
    if index_urls.is_empty() {
        vec![DEFAULT_INDEX_URL]
    } else {
        index_urls.iter().map(String::as_str).collect()
    }
}

fn scan_listing(index_url: &str, name: &str) -> Result<Option<String>> {
    let response = fetch(index_url)?;
    if !response.status().is_success() {
        return Err(index_error(
            index_url,
            &format!("status {}", response.status()),
        ));
    }
    let mut scanner = AnchorScanner::new(Some(name));
    let reader = BufReader::new(response);
    for line in reader.lines() {
        let line = line.map_err(|err| index_error(index_url, &err))?;
        scanner.feed(&line);
        if scanner.found() {
            break;
        }
    }
    Ok(scanner.last_match().map(str::to_string))
}

fn fetch(url: &str) -> Result<Response> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|err| index_error(url, &err))?;
    client.get(url).send().map_err(|err| index_error(url, &err))
}

fn index_error(url: &str, reason: &dyn Display) -> ReqwireError {
    ReqwireError::Index {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScanState {
    /// Between anchors.
    Waiting,
    /// Inside an anchor element, accumulating its text.
    Collecting,
    /// An anchor matching the search was just closed.
    Found,
}

/// Streaming scanner for package-index pages. Tracks anchor elements across
/// fed chunks and records every anchor's text content in document order.
struct AnchorScanner {
    search: Option<String>,
    state: ScanState,
    in_tag: bool,
    tag: String,
    text: String,
    collected: Vec<String>,
}

impl AnchorScanner {
    fn new(search: Option<&str>) -> Self {
        Self {
            search: search.map(str::to_lowercase),
            state: ScanState::Waiting,
            in_tag: false,
            tag: String::new(),
            text: String::new(),
            collected: Vec::new(),
        }
    }

    fn feed(&mut self, chunk: &str) {
        for ch in chunk.chars() {
            if self.in_tag {
                if ch == '>' {
                    self.in_tag = false;
                    self.handle_tag();
                } else {
                    self.tag.push(ch);
                }
            } else if ch == '<' {
                self.in_tag = true;
                self.tag.clear();
            } else if self.state == ScanState::Collecting {
                self.text.push(ch);
            }
        }
    }

    fn handle_tag(&mut self) {
        let tag = self.tag.trim().to_ascii_lowercase();
        if tag == "a" || tag.starts_with("a ") {
            self.state = ScanState::Collecting;
            self.text.clear();
        } else if tag == "/a" && self.state == ScanState::Collecting {
            let text = self.text.trim().to_string();
            let matched = self
                .search
                .as_deref()
                .is_some_and(|search| text.to_lowercase() == search);
            self.collected.push(text);
            self.state = if matched {
                ScanState::Found
            } else {
                ScanState::Waiting
            };
        }
    }

    fn found(&self) -> bool {
        self.state == ScanState::Found
    }

    /// The last collected anchor text equal to the search, ignoring case.
    fn last_match(&self) -> Option<&str> {
        let search = self.search.as_deref()?;
        self.collected
            .iter()
            .rev()
            .find(|text| text.to_lowercase() == search)
            .map(String::as_str)
    }

    fn into_collected(self) -> Vec<String> {
        self.collected
    }
}

fn version_from_filename(filename: &str, canonical_name: &str) -> Option<Version> {
    if let Some(stem) = filename.strip_suffix(".whl") {
        let mut parts = stem.split('-');
        let distribution = parts.next()?;
        let version = parts.next()?;
        if canonicalize_package_name(distribution) != canonical_name {
            return None;
        }
        return Version::from_str(version).ok();
    }
    let stem = filename
        .strip_suffix(".tar.gz")
        .or_else(|| filename.strip_suffix(".tar.bz2"))
        .or_else(|| filename.strip_suffix(".zip"))?;
    for (idx, ch) in stem.char_indices() {
        if ch != '-' && ch != '_' {
            continue;
        }
        if canonicalize_package_name(&stem[..idx]) == canonical_name {
            if let Ok(version) = Version::from_str(&stem[idx + 1..]) {
                return Some(version);
            }
        }
    }
    None
}
