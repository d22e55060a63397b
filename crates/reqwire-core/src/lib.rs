#![deny(clippy::all, warnings)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod config;
pub mod index;
pub mod resolve;
pub mod scaffold;

pub use config::{
    Config, DEFAULT_BUILD_DIR, DEFAULT_EXTENSION, DEFAULT_INIT_TAGS, DEFAULT_SOURCE_DIR,
    DEFAULT_TAG,
};
pub use index::{resolve_canonical_name, scan_package_releases, DEFAULT_INDEX_URL};
pub use resolve::{resolve_specifier, BestMatch, PackageIndexResolver, ResolveAll};
pub use scaffold::{
    add, build, build_filename, build_specifier_set, build_tag, extend_source_file, init,
    init_source_dir, init_source_file, remove, AddReport, AddRequest, BuildOptions, BuildReport,
    InitReport, RemoveReport,
};

pub use reqwire_domain::{
    build_source_header, canonicalize_package_name, write_requirements, NestedRef, ReqwireError,
    RequirementFile, Result, Specifier, MODELINES_HEADER,
};
