#![deny(clippy::all, warnings)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod error;
pub mod header;
pub mod requirement_file;
pub mod specifier;
pub mod writer;

pub use error::{ReqwireError, Result};
pub use header::{build_source_header, MODELINES_HEADER};
pub use requirement_file::{NestedRef, RequirementFile};
pub use specifier::{canonicalize_package_name, Specifier};
pub use writer::write_requirements;
