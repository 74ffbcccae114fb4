//! Declarative field metadata for typed configuration models.
//!
//! A configuration model describes its shape as a `const` table of
//! [`FieldSpec`] records: one per field, carrying the on-disk option name,
//! the semantic type, required-ness, and validation constraints. The
//! validation engine ([`crate::resolver::resolve_section`]) consumes the
//! table; the model itself never touches raw option strings.

use std::path::PathBuf;

use crate::errors::{ConfigurationError, ConfigurationResult};
use crate::source::{parse_bool_value, parse_float_value, parse_int_value};

/// Semantic type of a configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Str,
    Bool,
    Int,
    Float,
    Path,
}

impl FieldKind {
    /// The type name used in coercion error messages.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Path => "path",
        }
    }

    /// Coerce a non-empty option string to a [`FieldValue`] of this kind.
    pub(crate) fn convert(
        self,
        section: &str,
        option: &str,
        value: String,
    ) -> ConfigurationResult<FieldValue> {
        let converted = match self {
            Self::Str => Ok(FieldValue::Str(value)),
            Self::Path => Ok(FieldValue::Path(PathBuf::from(value))),
            Self::Bool => parse_bool_value(&value).map(FieldValue::Bool),
            Self::Int => parse_int_value(&value).map(FieldValue::Int),
            Self::Float => parse_float_value(&value).map(FieldValue::Float),
        };
        converted.map_err(|reason| ConfigurationError::OptionType {
            section: section.to_string(),
            option: option.to_string(),
            type_name: self.type_name(),
            reason,
        })
    }
}

/// One field value coerced to its semantic type.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    Path(PathBuf),
}

/// A constraint applied to a coerced field value.
///
/// Constraints that do not apply to the value's kind are vacuously
/// satisfied; the field table pairs each validator with a matching kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Validator {
    /// String value must be non-empty.
    NotEmpty,
    /// Integer value must be strictly greater than the bound.
    IntGt(i64),
    /// Integer value must be greater than or equal to the bound.
    IntGe(i64),
    /// Integer value must be less than or equal to the bound.
    IntLe(i64),
    /// Float value must be strictly greater than the bound.
    FloatGt(f64),
}

impl Validator {
    /// Check `value` against this constraint.
    ///
    /// The `Err` payload is the user-facing reason, e.g. `"must be > 0"`.
    pub fn check(self, value: &FieldValue) -> Result<(), String> {
        match (self, value) {
            (Self::NotEmpty, FieldValue::Str(text)) if text.is_empty() => {
                Err("must have a value".to_string())
            }
            (Self::IntGt(bound), FieldValue::Int(int)) if *int <= bound => {
                Err(format!("must be > {bound}"))
            }
            (Self::IntGe(bound), FieldValue::Int(int)) if *int < bound => {
                Err(format!("must be ≥ {bound}"))
            }
            (Self::IntLe(bound), FieldValue::Int(int)) if *int > bound => {
                Err(format!("must be ≤ {bound}"))
            }
            (Self::FloatGt(bound), FieldValue::Float(float)) if *float <= bound => {
                Err(format!("must be > {bound}"))
            }
            _ => Ok(()),
        }
    }
}

/// Declarative description of one configuration field.
///
/// A field is either required (no declared default; it is an error for the
/// option to be missing from the source) or its model applies a default when
/// the option is absent. Exactly one of those holds per field.
///
/// # Examples
///
/// ```rust
/// use mirror_config::{FieldKind, FieldSpec, Validator};
///
/// const FIELDS: &[FieldSpec] = &[
///     FieldSpec::required("directory", FieldKind::Path),
///     FieldSpec::optional("workers", FieldKind::Int)
///         .with_validators(&[Validator::IntGt(0), Validator::IntLe(10)]),
/// ];
///
/// assert!(FIELDS[0].required);
/// assert_eq!(FIELDS[1].option_name(), "workers");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// The field name in the model.
    pub name: &'static str,
    /// The on-disk option key, when it differs from `name`.
    pub alias: Option<&'static str>,
    /// Semantic type the option string is coerced to.
    pub kind: FieldKind,
    /// Whether the option must appear, non-empty, in the source.
    pub required: bool,
    /// Whether the deprecated `{{ section_option }}` syntax is honored for
    /// this field's value.
    pub allows_legacy_reference: bool,
    /// Constraints applied in order; the first failure aborts validation.
    pub validators: &'static [Validator],
}

impl FieldSpec {
    /// A field that must appear in the configuration source.
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            alias: None,
            kind,
            required: true,
            allows_legacy_reference: false,
            validators: &[],
        }
    }

    /// A field whose model applies a default when the option is absent.
    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            alias: None,
            kind,
            required: false,
            allows_legacy_reference: false,
            validators: &[],
        }
    }

    /// Set the on-disk option key.
    pub const fn with_alias(mut self, alias: &'static str) -> Self {
        self.alias = Some(alias);
        self
    }

    /// Attach validation constraints.
    pub const fn with_validators(mut self, validators: &'static [Validator]) -> Self {
        self.validators = validators;
        self
    }

    /// Honor the deprecated `{{ section_option }}` syntax for this field.
    pub const fn with_legacy_reference(mut self) -> Self {
        self.allows_legacy_reference = true;
        self
    }

    /// The on-disk option key (the alias when one is set, the field name
    /// otherwise).
    pub fn option_name(&self) -> &'static str {
        match self.alias {
            Some(alias) => alias,
            None => self.name,
        }
    }
}

#[cfg(test)]
#[path = "field_tests.rs"]
mod tests;
