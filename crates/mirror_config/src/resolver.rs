//! Validation engine: populates a model's field values from a config source.
//!
//! [`resolve_section`] walks a [`FieldSpec`] table in declaration order and,
//! for each field: resolves the on-disk key, checks required-ness, fetches
//! and coerces the raw string, applies the deprecated `{{ section_option }}`
//! reference syntax where the field allows it, and runs the declared
//! validators. The result is a [`ResolvedFields`] bag the model constructor
//! drains, applying declared defaults for whatever stayed absent.
//!
//! An empty string counts as "no value" for every field: it falls through to
//! the field's default, or is a missing-option error for required fields.

use std::collections::HashMap;

use tracing::{error, warn};

use crate::errors::{ConfigurationError, ConfigurationResult};
use crate::field::{FieldSpec, FieldValue};
use crate::legacy_reference::{eval_legacy_reference, has_legacy_reference};
use crate::source::ConfigSource;

/// Field values resolved from one configuration section.
///
/// Produced by [`resolve_section`]. Values are keyed by the field's model
/// name (not the on-disk alias); `take_*` accessors remove and return them,
/// so a model constructor can finish with `unwrap_or`-style defaults.
#[derive(Debug, Default)]
pub struct ResolvedFields {
    values: HashMap<&'static str, FieldValue>,
}

impl ResolvedFields {
    /// Whether a value was resolved for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Remove and return a string field.
    pub fn take_string(&mut self, name: &str) -> Option<String> {
        match self.values.remove(name) {
            Some(FieldValue::Str(value)) => Some(value),
            _ => None,
        }
    }

    /// Remove and return a boolean field.
    pub fn take_bool(&mut self, name: &str) -> Option<bool> {
        match self.values.remove(name) {
            Some(FieldValue::Bool(value)) => Some(value),
            _ => None,
        }
    }

    /// Remove and return an integer field.
    pub fn take_int(&mut self, name: &str) -> Option<i64> {
        match self.values.remove(name) {
            Some(FieldValue::Int(value)) => Some(value),
            _ => None,
        }
    }

    /// Remove and return a float field.
    pub fn take_float(&mut self, name: &str) -> Option<f64> {
        match self.values.remove(name) {
            Some(FieldValue::Float(value)) => Some(value),
            _ => None,
        }
    }

    /// Remove and return a path field.
    pub fn take_path(&mut self, name: &str) -> Option<std::path::PathBuf> {
        match self.values.remove(name) {
            Some(FieldValue::Path(value)) => Some(value),
            _ => None,
        }
    }
}

/// Resolve every field in `fields` from `section` of `source`.
///
/// # Errors
///
/// - [`ConfigurationError::SectionMissing`] when the section is absent.
/// - [`ConfigurationError::RequiredOptionMissing`] for a required field with
///   no value (absent or empty).
/// - [`ConfigurationError::OptionType`] when a value cannot be coerced to
///   the field's kind.
/// - [`ConfigurationError::OptionValidation`] when a validator rejects the
///   coerced value.
///
/// A `{{ section_option }}` reference that fails to resolve is not an
/// error here: it is logged and the field is treated as absent, so the
/// model's default applies.
pub fn resolve_section(
    source: &ConfigSource,
    section: &str,
    fields: &[FieldSpec],
) -> ConfigurationResult<ResolvedFields> {
    if !source.has_section(section) {
        return Err(ConfigurationError::SectionMissing {
            section: section.to_string(),
        });
    }

    let mut resolved = ResolvedFields::default();
    for field in fields {
        let option = field.option_name();

        // Empty counts as "no value" for every field.
        let raw = source
            .get_opt(section, option)?
            .filter(|value| !value.trim().is_empty());

        let Some(mut value) = raw else {
            if field.required {
                return Err(ConfigurationError::RequiredOptionMissing {
                    section: section.to_string(),
                    option: option.to_string(),
                });
            }
            continue;
        };

        if field.allows_legacy_reference && has_legacy_reference(&value) {
            warn!(
                "Found section reference using '{{{{ }}}}' in '{option}'. Use the built-in \
                 extended interpolation instead, for example '${{mirror:directory}}/new-files'"
            );
            // A reference that does not resolve leaves the field without a
            // value, so the model's default applies.
            value = match eval_legacy_reference(source, &value) {
                Ok(resolved) => resolved,
                Err(reference_error) => {
                    error!(
                        "Invalid section reference in '{option}' key: {reference_error}. \
                         Using the default value instead"
                    );
                    continue;
                }
            };
        }

        let converted = field.kind.convert(section, option, value)?;

        for validator in field.validators {
            if let Err(reason) = validator.check(&converted) {
                return Err(ConfigurationError::OptionValidation {
                    section: section.to_string(),
                    option: option.to_string(),
                    reason,
                });
            }
        }

        resolved.values.insert(field.name, converted);
    }

    Ok(resolved)
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
