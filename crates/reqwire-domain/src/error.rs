use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, ReqwireError>;

#[derive(Debug, thiserror::Error)]
pub enum ReqwireError {
    #[error("malformed specifier {line:?}: {reason}")]
    MalformedSpecifier { line: String, reason: String },

    #[error("no package index lists a package named {name:?}")]
    PackageNotFound { name: String },

    #[error("no candidate found for {specifier:?}")]
    NoCandidateFound { specifier: String },

    #[error(
        "index URL {declared:?} conflicts with {existing:?} recorded in {}",
        .path.display()
    )]
    IndexUrlMismatch {
        declared: String,
        existing: String,
        path: PathBuf,
    },

    #[error("cyclic include: {} is included by one of its own includes", .path.display())]
    CyclicInclude { path: PathBuf },

    #[error("index request for {url} failed: {reason}")]
    Index { url: String, reason: String },

    #[error("dependency resolution failed: {reason}")]
    Resolution { reason: String },

    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReqwireError {
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
