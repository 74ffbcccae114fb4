//! Resolver for the deprecated `{{ section_option }}` reference syntax.
//!
//! This syntax let one option embed the value of another, for example
//! `diff-file = {{ mirror_directory }}/new-files`, and predates the
//! adapter's native `${section:option}` interpolation. It is retained for
//! backward compatibility only; new configurations should use extended
//! interpolation instead.
//!
//! A reference has the shape `<prefix>{{ <section>_<option> }}<suffix>`.
//! Whitespace around the inner section and option names is tolerated; the
//! separator between the two is a single underscore, so section names must
//! not contain one. The referenced value is fetched *interpolated*, so
//! native `${...}` syntax inside the target is honored.

use std::sync::OnceLock;

use regex::Regex;

use crate::errors::{ConfigurationError, ConfigurationResult};
use crate::source::{normalize_option_name, ConfigSource};

// Section names are at least two characters, disallow '_' (that is our
// separator) and surrounding whitespace; option names can contain anything
// but must start and end with a non-whitespace character. The prefix is
// greedy, so the reference parsed is the one opened by the last '{{' on the
// line.
const LEGACY_REFERENCE_PATTERN: &str = r"^(?P<pre>.*)\{\{\s*(?P<section>[^_\s][^_]*[^_\s])\s*_\s*(?P<option>\S(?:.*\S)?)\s*\}\}(?P<post>.*)$";

fn legacy_reference_parts() -> &'static Regex {
    static PARTS: OnceLock<Regex> = OnceLock::new();
    PARTS.get_or_init(|| {
        Regex::new(LEGACY_REFERENCE_PATTERN).expect("legacy reference pattern is valid")
    })
}

/// Cheap pre-check: does `value` contain a `{{ ... }}` brace pair?
///
/// A `true` result only means the value *looks like* it contains a legacy
/// reference; [`eval_legacy_reference`] applies the strict grammar.
pub fn has_legacy_reference(value: &str) -> bool {
    match value.split_once("{{") {
        Some((_, rest)) => match rest.split_once("}}") {
            Some((inner, _)) => !inner.is_empty(),
            None => false,
        },
        None => false,
    }
}

/// Evaluate the legacy reference embedded in `value` against `source`.
///
/// On success returns `prefix + referenced value + suffix`, supporting
/// references embedded mid-string, not only whole-value references.
///
/// # Errors
///
/// [`ConfigurationError::ReferenceSyntax`] when `value` does not match the
/// reference grammar, and [`ConfigurationError::ReferenceNotFound`] when the
/// referenced section or option does not exist in the source.
///
/// # Examples
///
/// ```rust
/// use mirror_config::{eval_legacy_reference, ConfigSource};
///
/// let mut source = ConfigSource::new();
/// source.read_string("[mirror]\ndirectory = /srv/pypi\n").unwrap();
///
/// let resolved =
///     eval_legacy_reference(&source, "{{ mirror_directory }}/new-files").unwrap();
/// assert_eq!(resolved, "/srv/pypi/new-files");
/// ```
pub fn eval_legacy_reference(source: &ConfigSource, value: &str) -> ConfigurationResult<String> {
    let parts = legacy_reference_parts()
        .captures(value)
        .ok_or_else(|| ConfigurationError::ReferenceSyntax {
            value: value.to_string(),
        })?;

    let section = &parts["section"];
    let option = &parts["option"];
    let resolved = source.get_opt(section, option)?.ok_or_else(|| {
        ConfigurationError::ReferenceNotFound {
            section: section.to_string(),
            option: normalize_option_name(option),
        }
    })?;

    Ok(format!("{}{}{}", &parts["pre"], resolved, &parts["post"]))
}

/// Like [`eval_legacy_reference`], but any resolution failure returns
/// `fallback` instead of an error.
pub fn eval_legacy_reference_or(source: &ConfigSource, value: &str, fallback: &str) -> String {
    match eval_legacy_reference(source, value) {
        Ok(resolved) => resolved,
        Err(_) => fallback.to_string(),
    }
}

#[cfg(test)]
#[path = "legacy_reference_tests.rs"]
mod tests;
