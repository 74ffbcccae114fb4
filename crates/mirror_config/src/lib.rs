//! Configuration management for the package mirror.
//!
//! This crate validates and materializes typed configuration objects from an
//! INI-style configuration source:
//!
//! - [`ConfigSource`] wraps the section/key-value text format, normalizes
//!   option names, expands `${section:option}` interpolation lazily, and owns
//!   the validated-object cache.
//! - [`legacy_reference`] evaluates the deprecated `{{ section_option }}`
//!   embedded-reference syntax that predates native interpolation.
//! - [`FieldSpec`] tables describe the validated shape of a configuration
//!   section; [`resolve_section`] drives per-field lookup, coercion, and
//!   validation against a source.
//! - [`MirrorConfiguration`] is the typed model for the `[mirror]` section,
//!   obtained through [`ConfigSource::get_validated`], which guarantees one
//!   validation pass per model type per source.

pub mod comparison;
pub mod errors;
pub mod field;
pub mod legacy_reference;
pub mod mirror;
pub mod resolver;
pub mod simple;
pub mod source;

// Re-export for convenient access
pub use comparison::ComparisonMethod;
pub use errors::{ConfigurationError, ConfigurationResult};
pub use field::{FieldKind, FieldSpec, FieldValue, Validator};
pub use legacy_reference::{
    eval_legacy_reference, eval_legacy_reference_or, has_legacy_reference,
};
pub use mirror::{MirrorConfiguration, DEFAULT_ROOT_URI};
pub use resolver::{resolve_section, ResolvedFields};
pub use simple::{SimpleDigest, SimpleFormat};
pub use source::{ConfigModel, ConfigSource};
