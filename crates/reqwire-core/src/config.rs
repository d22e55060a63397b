use std::path::PathBuf;

pub const DEFAULT_SOURCE_DIR: &str = "src";
pub const DEFAULT_BUILD_DIR: &str = "lck";
pub const DEFAULT_EXTENSION: &str = ".in";

/// Tags seeded by `init` when none are requested.
pub const DEFAULT_INIT_TAGS: &[&str] = &["docs", "main", "qa", "test"];
/// Tag targeted by `add` and `remove` when none is requested.
pub const DEFAULT_TAG: &str = "main";

/// Explicit configuration for one invocation.
///
/// Built at the CLI boundary from flags and environment-backed defaults and
/// passed through every entry point; core components never consult the
/// process environment themselves.
#[derive(Clone, Debug)]
pub struct Config {
    /// The requirements directory.
    pub directory: PathBuf,
    /// Source subdirectory, relative to `directory`.
    pub source_dir: String,
    /// Build subdirectory, relative to `directory`.
    pub build_dir: String,
    /// Extension for requirement source files, including the dot.
    pub extension: String,
}

impl Config {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            source_dir: DEFAULT_SOURCE_DIR.to_string(),
            build_dir: DEFAULT_BUILD_DIR.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    pub fn source_path(&self) -> PathBuf {
        self.directory.join(&self.source_dir)
    }

    pub fn build_path(&self) -> PathBuf {
        self.directory.join(&self.build_dir)
    }

    /// Path of a tag's human-edited source file.
    pub fn source_file(&self, tag_name: &str) -> PathBuf {
        self.source_path()
            .join(format!("{tag_name}{}", self.extension))
    }

    /// Path of a tag's generated build file.
    pub fn build_file(&self, tag_name: &str) -> PathBuf {
        self.build_path().join(format!("{tag_name}.txt"))
    }
}
