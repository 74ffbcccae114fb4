//! Configuration system error types.
//!
//! Domain-specific errors for reading the INI-style configuration source,
//! coercing option strings to their declared types, and validating typed
//! configuration models.
//!
//! Every message that concerns a single option embeds both the section name
//! and the option name. Users diagnose configuration problems solely from
//! these messages, so that is a hard contract.

use thiserror::Error;

/// Configuration system errors.
///
/// These errors occur when reading configuration text, expanding
/// `${section:option}` interpolation, resolving deprecated
/// `{{ section_option }}` references, or populating and validating a typed
/// configuration model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// The configuration file could not be opened or read.
    #[error("Failed to read configuration file {path}: {reason}")]
    FileAccess { path: String, reason: String },

    /// The configuration text is not valid INI syntax.
    #[error("Invalid configuration syntax at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// A requested or referenced section does not exist.
    #[error("Configuration file missing required section '[{section}]'")]
    SectionMissing { section: String },

    /// A directly requested or interpolated option does not exist.
    #[error("No option '{option}' in section '[{section}]'")]
    OptionMissing { section: String, option: String },

    /// A `${...}` placeholder could not be expanded.
    #[error("Config section '[{section}]' option '{option}': bad interpolation: {reason}")]
    Interpolation {
        section: String,
        option: String,
        reason: String,
    },

    /// A required option has no value in the configuration source.
    #[error("Config section '[{section}]' missing required option '{option}'")]
    RequiredOptionMissing { section: String, option: String },

    /// An option value could not be coerced to its declared type.
    #[error("Config section '[{section}]' option '{option}': can't convert option '{option}' to expected type '{type_name}': {reason}")]
    OptionType {
        section: String,
        option: String,
        type_name: &'static str,
        reason: String,
    },

    /// An option value was coerced successfully but violates a constraint.
    #[error("Config section '[{section}]' option '{option}': {reason}")]
    OptionValidation {
        section: String,
        option: String,
        reason: String,
    },

    /// A `{{ section_option }}` value does not match the reference grammar.
    #[error("Unable to parse config option reference from '{value}'")]
    ReferenceSyntax { value: String },

    /// A `{{ section_option }}` reference points at an option that does not
    /// exist in the configuration source.
    #[error("Config option reference to missing option '{option}' in section '[{section}]'")]
    ReferenceNotFound { section: String, option: String },
}

/// Result type alias for configuration operations.
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
