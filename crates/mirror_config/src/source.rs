//! INI-style configuration source with interpolation and a validated-object
//! cache.
//!
//! [`ConfigSource`] wraps the raw section/key-value text format the mirror is
//! configured with: `[section]` headers, `key = value` assignments (the
//! delimiter is exactly `=`), full-line `#`/`;` comments, and indented
//! continuation lines that join the previous value with a newline. Option
//! names are normalized identically on write and on lookup (ASCII lowercase,
//! `-` replaced with `_`) so `Hash-Index`, `hash_index`, and `HASH_INDEX` all
//! address the same entry. Section names are case-sensitive and kept
//! verbatim.
//!
//! Values may reference other options with `${option}` (same section) or
//! `${section:option}`; placeholders are expanded lazily at read time. `$$`
//! escapes a literal `$`.
//!
//! The source also owns the validated-object cache: requesting the same
//! [`ConfigModel`] twice through [`ConfigSource::get_validated`] returns the
//! identical instance and runs validation exactly once.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::errors::{ConfigurationError, ConfigurationResult};

/// Maximum `${...}` expansion depth before interpolation is aborted.
const MAX_INTERPOLATION_DEPTH: usize = 10;

/// A typed configuration model that can be populated from a [`ConfigSource`].
///
/// Implementations read one section of the source, coerce and validate every
/// option, and produce an immutable instance. [`ConfigSource::get_validated`]
/// memoizes the result per model type.
pub trait ConfigModel: Sized + Send + Sync + 'static {
    /// The configuration section this model is populated from.
    const SECTION: &'static str;

    /// Populate and validate an instance from `source`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] naming the offending section and
    /// option for any missing, malformed, or out-of-range value.
    fn from_config_source(source: &ConfigSource) -> ConfigurationResult<Self>;
}

/// Normalize an option name for storage and lookup.
pub fn normalize_option_name(name: &str) -> String {
    name.to_ascii_lowercase().replace('-', "_")
}

/// An in-memory, section/key-value configuration source.
///
/// # Examples
///
/// ```rust
/// use mirror_config::ConfigSource;
///
/// let mut source = ConfigSource::new();
/// source
///     .read_string("[mirror]\ndirectory = /srv/pypi\nworkers = 3\n")
///     .expect("valid configuration");
///
/// assert_eq!(source.get("mirror", "directory").unwrap(), "/srv/pypi");
/// assert_eq!(source.get_int("mirror", "workers").unwrap(), 3);
/// ```
///
/// # Concurrency
///
/// Configuration is expected to be loaded once at process start, before
/// concurrent work begins. The validated-object cache is guarded by a mutex
/// held across the check-then-populate sequence, so a concurrent first call
/// to [`ConfigSource::get_validated`] cannot run validation twice; loading
/// (`read_string`/`load_file`) takes `&mut self` and is not meant to race
/// with readers.
pub struct ConfigSource {
    sections: HashMap<String, HashMap<String, String>>,
    validated: Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl ConfigSource {
    /// Create an empty configuration source.
    pub fn new() -> Self {
        Self {
            sections: HashMap::new(),
            validated: Mutex::new(HashMap::new()),
        }
    }

    /// Create a source populated from one configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::FileAccess`] when the file cannot be
    /// read and [`ConfigurationError::Parse`] for malformed content.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigurationResult<Self> {
        let mut source = Self::new();
        source.load_file(path)?;
        Ok(source)
    }

    /// Read one configuration file into this source.
    ///
    /// May be called more than once to layer files; later assignments
    /// override earlier ones option by option.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> ConfigurationResult<()> {
        let path = path.as_ref();
        debug!("Loading configuration file: {}", path.display());
        let text =
            std::fs::read_to_string(path).map_err(|err| ConfigurationError::FileAccess {
                path: path.display().to_string(),
                reason: err.to_string(),
            })?;
        self.read_string(&text)
    }

    /// Parse configuration text into this source.
    ///
    /// Like [`ConfigSource::load_file`], repeated calls merge: later
    /// assignments override earlier ones.
    pub fn read_string(&mut self, text: &str) -> ConfigurationResult<()> {
        let mut current_section: Option<String> = None;
        let mut current_option: Option<String> = None;

        for (index, raw_line) in text.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw_line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            // An indented line continues the previous option's value.
            if raw_line.starts_with(char::is_whitespace) {
                let entry = match (&current_section, &current_option) {
                    (Some(section), Some(option)) => self
                        .sections
                        .get_mut(section)
                        .and_then(|options| options.get_mut(option)),
                    _ => None,
                };
                match entry {
                    Some(value) => {
                        value.push('\n');
                        value.push_str(trimmed);
                        continue;
                    }
                    None => {
                        return Err(ConfigurationError::Parse {
                            line,
                            reason: format!(
                                "continuation line without a preceding option: '{trimmed}'"
                            ),
                        })
                    }
                }
            }

            if let Some(header) = trimmed.strip_prefix('[') {
                let name = header
                    .strip_suffix(']')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| ConfigurationError::Parse {
                        line,
                        reason: format!("malformed section header: '{trimmed}'"),
                    })?;
                self.sections.entry(name.to_string()).or_default();
                current_section = Some(name.to_string());
                current_option = None;
                continue;
            }

            let (key, value) = trimmed
                .split_once('=')
                .ok_or_else(|| ConfigurationError::Parse {
                    line,
                    reason: format!("expected 'key = value', got '{trimmed}'"),
                })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(ConfigurationError::Parse {
                    line,
                    reason: "option name missing before '='".to_string(),
                });
            }
            let section = current_section
                .clone()
                .ok_or_else(|| ConfigurationError::Parse {
                    line,
                    reason: format!("option '{key}' assigned before any section header"),
                })?;

            let option = normalize_option_name(key);
            self.sections
                .entry(section)
                .or_default()
                .insert(option.clone(), value.trim().to_string());
            current_option = Some(option);
        }

        Ok(())
    }

    /// Whether the source contains `section`.
    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// Whether `section` contains `option` (name-normalized).
    pub fn has_option(&self, section: &str, option: &str) -> bool {
        self.sections
            .get(section)
            .is_some_and(|options| options.contains_key(&normalize_option_name(option)))
    }

    /// All section names, sorted.
    pub fn sections(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sections.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The stored value of an option, without interpolation.
    pub fn get_raw_opt(&self, section: &str, option: &str) -> Option<&str> {
        self.sections
            .get(section)?
            .get(&normalize_option_name(option))
            .map(String::as_str)
    }

    /// The interpolated value of an option.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::SectionMissing`] / [`ConfigurationError::OptionMissing`]
    /// when the option is absent, and interpolation errors naming the missing
    /// target when a `${...}` placeholder cannot be expanded.
    pub fn get(&self, section: &str, option: &str) -> ConfigurationResult<String> {
        let normalized = normalize_option_name(option);
        let options =
            self.sections
                .get(section)
                .ok_or_else(|| ConfigurationError::SectionMissing {
                    section: section.to_string(),
                })?;
        let raw = options
            .get(&normalized)
            .ok_or_else(|| ConfigurationError::OptionMissing {
                section: section.to_string(),
                option: normalized.clone(),
            })?;
        self.interpolate(section, &normalized, raw, 0)
    }

    /// The interpolated value of an option, or `None` when absent.
    ///
    /// Interpolation failures are still errors; only the absence of the
    /// requested option itself maps to `None`.
    pub fn get_opt(&self, section: &str, option: &str) -> ConfigurationResult<Option<String>> {
        let normalized = normalize_option_name(option);
        let raw = self
            .sections
            .get(section)
            .and_then(|options| options.get(&normalized));
        match raw {
            Some(raw) => self.interpolate(section, &normalized, raw, 0).map(Some),
            None => Ok(None),
        }
    }

    /// The value of an option coerced to a boolean.
    ///
    /// Accepts, case-insensitively, `1`/`yes`/`true`/`on` and
    /// `0`/`no`/`false`/`off`.
    pub fn get_bool(&self, section: &str, option: &str) -> ConfigurationResult<bool> {
        let value = self.get(section, option)?;
        parse_bool_value(&value).map_err(|reason| type_error(section, option, "bool", reason))
    }

    /// Like [`ConfigSource::get_bool`] but `None` when the option is absent.
    pub fn get_bool_opt(&self, section: &str, option: &str) -> ConfigurationResult<Option<bool>> {
        match self.get_opt(section, option)? {
            Some(value) => parse_bool_value(&value)
                .map(Some)
                .map_err(|reason| type_error(section, option, "bool", reason)),
            None => Ok(None),
        }
    }

    /// The value of an option coerced to an integer.
    ///
    /// Underscores are accepted between digits, matching common numeric
    /// literal grouping; anything else is a conversion failure.
    pub fn get_int(&self, section: &str, option: &str) -> ConfigurationResult<i64> {
        let value = self.get(section, option)?;
        parse_int_value(&value).map_err(|reason| type_error(section, option, "int", reason))
    }

    /// Like [`ConfigSource::get_int`] but `None` when the option is absent.
    pub fn get_int_opt(&self, section: &str, option: &str) -> ConfigurationResult<Option<i64>> {
        match self.get_opt(section, option)? {
            Some(value) => parse_int_value(&value)
                .map(Some)
                .map_err(|reason| type_error(section, option, "int", reason)),
            None => Ok(None),
        }
    }

    /// The value of an option coerced to a float.
    pub fn get_float(&self, section: &str, option: &str) -> ConfigurationResult<f64> {
        let value = self.get(section, option)?;
        parse_float_value(&value).map_err(|reason| type_error(section, option, "float", reason))
    }

    /// Like [`ConfigSource::get_float`] but `None` when the option is absent.
    pub fn get_float_opt(&self, section: &str, option: &str) -> ConfigurationResult<Option<f64>> {
        match self.get_opt(section, option)? {
            Some(value) => parse_float_value(&value)
                .map(Some)
                .map_err(|reason| type_error(section, option, "float", reason)),
            None => Ok(None),
        }
    }

    /// The value of an option as a path.
    pub fn get_path(&self, section: &str, option: &str) -> ConfigurationResult<PathBuf> {
        self.get(section, option).map(PathBuf::from)
    }

    /// Like [`ConfigSource::get_path`] but `None` when the option is absent.
    pub fn get_path_opt(&self, section: &str, option: &str) -> ConfigurationResult<Option<PathBuf>> {
        Ok(self.get_opt(section, option)?.map(PathBuf::from))
    }

    /// The validated configuration model `M`, populated from this source.
    ///
    /// Validation runs at most once per model type per source: the first call
    /// populates the cache, later calls return the identical shared instance.
    /// A failed validation is not cached and will be retried on the next
    /// request.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mirror_config::{ConfigSource, MirrorConfiguration};
    ///
    /// let mut source = ConfigSource::new();
    /// source.read_string("[mirror]\ndirectory = /srv/pypi\n").unwrap();
    ///
    /// let first = source.get_validated::<MirrorConfiguration>().unwrap();
    /// let second = source.get_validated::<MirrorConfiguration>().unwrap();
    /// assert!(std::sync::Arc::ptr_eq(&first, &second));
    /// ```
    pub fn get_validated<M: ConfigModel>(&self) -> ConfigurationResult<Arc<M>> {
        // The lock is held across validation so a concurrent first access
        // cannot populate the same entry twice.
        let mut validated = self.validated.lock().unwrap();
        if let Some(existing) = validated.get(&TypeId::of::<M>()) {
            if let Ok(typed) = Arc::clone(existing).downcast::<M>() {
                debug!(
                    "Validated config cache hit: {}",
                    std::any::type_name::<M>()
                );
                return Ok(typed);
            }
        }

        debug!("Validating configuration model: {}", std::any::type_name::<M>());
        let instance = Arc::new(M::from_config_source(self)?);
        validated.insert(
            TypeId::of::<M>(),
            Arc::clone(&instance) as Arc<dyn Any + Send + Sync>,
        );
        Ok(instance)
    }

    fn interpolate(
        &self,
        section: &str,
        option: &str,
        raw: &str,
        depth: usize,
    ) -> ConfigurationResult<String> {
        if depth > MAX_INTERPOLATION_DEPTH {
            return Err(ConfigurationError::Interpolation {
                section: section.to_string(),
                option: option.to_string(),
                reason: format!("maximum interpolation depth ({MAX_INTERPOLATION_DEPTH}) exceeded"),
            });
        }

        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(index) = rest.find('$') {
            out.push_str(&rest[..index]);
            let after = &rest[index + 1..];
            if let Some(tail) = after.strip_prefix('$') {
                out.push('$');
                rest = tail;
            } else if let Some(tail) = after.strip_prefix('{') {
                let end = tail.find('}').ok_or_else(|| ConfigurationError::Interpolation {
                    section: section.to_string(),
                    option: option.to_string(),
                    reason: format!("unterminated '${{' placeholder in '{raw}'"),
                })?;
                let target = &tail[..end];
                let (target_section, target_option) = match target.split_once(':') {
                    Some((target_section, target_option)) => (
                        target_section.trim().to_string(),
                        normalize_option_name(target_option.trim()),
                    ),
                    None => (section.to_string(), normalize_option_name(target.trim())),
                };
                let options = self.sections.get(&target_section).ok_or_else(|| {
                    ConfigurationError::SectionMissing {
                        section: target_section.clone(),
                    }
                })?;
                let value =
                    options
                        .get(&target_option)
                        .ok_or_else(|| ConfigurationError::OptionMissing {
                            section: target_section.clone(),
                            option: target_option.clone(),
                        })?;
                let expanded =
                    self.interpolate(&target_section, &target_option, value, depth + 1)?;
                out.push_str(&expanded);
                rest = &tail[end + 1..];
            } else {
                return Err(ConfigurationError::Interpolation {
                    section: section.to_string(),
                    option: option.to_string(),
                    reason: format!("'$' must be followed by '$' or '{{' in '{raw}'"),
                });
            }
        }
        out.push_str(rest);
        Ok(out)
    }
}

impl Default for ConfigSource {
    fn default() -> Self {
        Self::new()
    }
}

// The cached models are type-erased trait objects, so only the raw
// configuration data is shown.
impl fmt::Debug for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigSource")
            .field("sections", &self.sections)
            .finish_non_exhaustive()
    }
}

fn type_error(
    section: &str,
    option: &str,
    type_name: &'static str,
    reason: String,
) -> ConfigurationError {
    ConfigurationError::OptionType {
        section: section.to_string(),
        option: normalize_option_name(option),
        type_name,
        reason,
    }
}

/// Coerce an option string to a boolean.
pub(crate) fn parse_bool_value(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Ok(true),
        "0" | "no" | "false" | "off" => Ok(false),
        other => Err(format!(
            "'{other}' is not a recognized boolean; accepted values are 1/yes/true/on and 0/no/false/off"
        )),
    }
}

/// Coerce an option string to an integer.
///
/// Underscores are accepted only between digits; a leading, trailing, or
/// doubled underscore is a conversion failure.
pub(crate) fn parse_int_value(value: &str) -> Result<i64, String> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix(['+', '-'])
        .unwrap_or(trimmed);
    if digits.is_empty() {
        return Err(format!("invalid integer literal '{trimmed}'"));
    }
    let bytes = digits.as_bytes();
    for (index, byte) in bytes.iter().enumerate() {
        match byte {
            b'0'..=b'9' => {}
            b'_' => {
                let prev_is_digit =
                    index > 0 && bytes[index - 1].is_ascii_digit();
                let next_is_digit = bytes
                    .get(index + 1)
                    .is_some_and(u8::is_ascii_digit);
                if !prev_is_digit || !next_is_digit {
                    return Err(format!("invalid integer literal '{trimmed}'"));
                }
            }
            _ => return Err(format!("invalid integer literal '{trimmed}'")),
        }
    }
    trimmed
        .replace('_', "")
        .parse::<i64>()
        .map_err(|err| format!("invalid integer literal '{trimmed}': {err}"))
}

/// Coerce an option string to a float, with the same underscore rule as
/// [`parse_int_value`].
pub(crate) fn parse_float_value(value: &str) -> Result<f64, String> {
    let trimmed = value.trim();
    let chars: Vec<char> = trimmed.chars().collect();
    for (index, ch) in chars.iter().enumerate() {
        if *ch == '_' {
            let prev_is_digit = index > 0 && chars[index - 1].is_ascii_digit();
            let next_is_digit = chars
                .get(index + 1)
                .is_some_and(char::is_ascii_digit);
            if !prev_is_digit || !next_is_digit {
                return Err(format!("invalid float literal '{trimmed}'"));
            }
        }
    }
    trimmed
        .replace('_', "")
        .parse::<f64>()
        .map_err(|_| format!("invalid float literal '{trimmed}'"))
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;
