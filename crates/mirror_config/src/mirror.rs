//! The validated configuration model for the `[mirror]` section.
//!
//! [`MirrorConfiguration`] is populated through
//! [`ConfigSource::get_validated`], which drives the field table below
//! through the validation engine and then applies the dynamic defaults that
//! depend on other fields' final values (`root_uri`, `diff_file`).

use std::path::PathBuf;

use tracing::warn;

use crate::comparison::ComparisonMethod;
use crate::errors::{ConfigurationError, ConfigurationResult};
use crate::field::{FieldKind, FieldSpec, Validator};
use crate::resolver::{resolve_section, ResolvedFields};
use crate::simple::{SimpleDigest, SimpleFormat};
use crate::source::{ConfigModel, ConfigSource};

/// Fallback for `root_uri` when release files are not mirrored locally.
pub const DEFAULT_ROOT_URI: &str = "https://files.pythonhosted.org";

const WORKER_RANGE: &[Validator] = &[Validator::IntGt(0), Validator::IntLe(10)];
const POSITIVE_TIMEOUT: &[Validator] = &[Validator::FloatGt(0.0)];

/// Field table for the `[mirror]` section, in declaration order.
///
/// `directory` is the only option without a default; every other field's
/// default is applied during construction below. Choice options
/// (`simple_format`, `compare_method`, `digest_name`) resolve as strings and
/// are converted to their enums at construction, so unknown names surface as
/// validation errors naming the option.
const MIRROR_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("directory", FieldKind::Path),
    FieldSpec::optional("storage_backend_name", FieldKind::Str)
        .with_alias("storage_backend")
        .with_validators(&[Validator::NotEmpty]),
    FieldSpec::optional("master_url", FieldKind::Str)
        .with_alias("master")
        .with_validators(&[Validator::NotEmpty]),
    FieldSpec::optional("proxy_url", FieldKind::Str).with_alias("proxy"),
    FieldSpec::optional("download_mirror_url", FieldKind::Str).with_alias("download_mirror"),
    FieldSpec::optional("download_mirror_no_fallback", FieldKind::Bool),
    FieldSpec::optional("save_release_files", FieldKind::Bool).with_alias("release_files"),
    FieldSpec::optional("save_json", FieldKind::Bool).with_alias("json"),
    FieldSpec::optional("simple_format", FieldKind::Str),
    FieldSpec::optional("compare_method", FieldKind::Str),
    FieldSpec::optional("digest_name", FieldKind::Str),
    FieldSpec::optional("root_uri", FieldKind::Str),
    FieldSpec::optional("hash_index", FieldKind::Bool),
    FieldSpec::optional("keep_index_versions", FieldKind::Int)
        .with_validators(&[Validator::IntGe(0)]),
    // str rather than path so '{{ }}' references resolve before conversion
    FieldSpec::optional("diff_file", FieldKind::Str).with_legacy_reference(),
    FieldSpec::optional("diff_append_epoch", FieldKind::Bool),
    FieldSpec::optional("stop_on_error", FieldKind::Bool),
    FieldSpec::optional("timeout", FieldKind::Float).with_validators(POSITIVE_TIMEOUT),
    FieldSpec::optional("global_timeout", FieldKind::Float).with_validators(POSITIVE_TIMEOUT),
    FieldSpec::optional("workers", FieldKind::Int).with_validators(WORKER_RANGE),
    FieldSpec::optional("verifiers", FieldKind::Int).with_validators(WORKER_RANGE),
    FieldSpec::optional("log_config", FieldKind::Path),
    FieldSpec::optional("cleanup", FieldKind::Bool),
];

/// Validated configuration for the mirror subsystem.
///
/// Immutable once constructed; obtain shared instances through
/// [`ConfigSource::get_validated`].
///
/// # Examples
///
/// ```rust
/// use mirror_config::{ConfigSource, MirrorConfiguration};
///
/// let mut source = ConfigSource::new();
/// source.read_string("[mirror]\ndirectory = /srv/pypi\n").unwrap();
///
/// let config = source.get_validated::<MirrorConfiguration>().unwrap();
/// assert_eq!(config.workers, 3);
/// assert_eq!(config.master_url, "https://pypi.org");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorConfiguration {
    /// Where the mirrored packages are written. The only required option.
    pub directory: PathBuf,
    pub storage_backend_name: String,
    pub master_url: String,
    pub proxy_url: Option<String>,
    pub download_mirror_url: Option<String>,
    pub download_mirror_no_fallback: bool,
    pub save_release_files: bool,
    pub save_json: bool,
    pub simple_format: SimpleFormat,
    pub compare_method: ComparisonMethod,
    pub digest_name: SimpleDigest,
    /// Base URI for release-file links in the generated index pages. Gets a
    /// non-empty dynamic default when `save_release_files` is disabled.
    pub root_uri: String,
    pub hash_index: bool,
    pub keep_index_versions: usize,
    /// Always a concrete path; defaults to `<directory>/mirrored-files`.
    pub diff_file: PathBuf,
    pub diff_append_epoch: bool,
    pub stop_on_error: bool,
    pub timeout: f64,
    pub global_timeout: f64,
    pub workers: usize,
    pub verifiers: usize,
    pub log_config: Option<PathBuf>,
    /// Deprecated, retained for compatibility.
    pub cleanup: bool,
}

impl ConfigModel for MirrorConfiguration {
    const SECTION: &'static str = "mirror";

    fn from_config_source(source: &ConfigSource) -> ConfigurationResult<Self> {
        let mut fields = resolve_section(source, Self::SECTION, MIRROR_FIELDS)?;

        let directory = match fields.take_path("directory") {
            Some(directory) => directory,
            // resolve_section enforces required fields; this is unreachable
            // unless the field table changes.
            None => {
                return Err(ConfigurationError::RequiredOptionMissing {
                    section: Self::SECTION.to_string(),
                    option: "directory".to_string(),
                })
            }
        };

        if fields.contains("cleanup") {
            warn!(
                "Option 'cleanup' in section '[{}]' is deprecated and will be removed in a \
                 future release",
                Self::SECTION
            );
        }

        let simple_format = take_choice(
            &mut fields,
            "simple_format",
            SimpleFormat::from_option_value,
            SimpleFormat::All,
        )?;
        let compare_method = take_choice(
            &mut fields,
            "compare_method",
            ComparisonMethod::from_option_value,
            ComparisonMethod::Hash,
        )?;
        let digest_name = take_choice(
            &mut fields,
            "digest_name",
            SimpleDigest::from_option_value,
            SimpleDigest::Sha256,
        )?;

        let save_release_files = fields.take_bool("save_release_files").unwrap_or(true);

        // Dynamic defaults: these only fill fields the user left unset,
        // never override explicitly supplied values.
        let root_uri = match fields.take_string("root_uri") {
            Some(uri) => uri,
            None if !save_release_files => {
                warn!(
                    "Inconsistent config: 'root_uri' should be set when 'release-files' is \
                     disabled. Please set 'root-uri' in the [mirror] section of your config \
                     file. Using default value '{DEFAULT_ROOT_URI}'"
                );
                DEFAULT_ROOT_URI.to_string()
            }
            None => String::new(),
        };
        let diff_file = match fields.take_string("diff_file") {
            Some(path) => PathBuf::from(path),
            None => directory.join("mirrored-files"),
        };

        Ok(Self {
            directory,
            storage_backend_name: fields
                .take_string("storage_backend_name")
                .unwrap_or_else(|| "filesystem".to_string()),
            master_url: fields
                .take_string("master_url")
                .unwrap_or_else(|| "https://pypi.org".to_string()),
            proxy_url: fields.take_string("proxy_url"),
            download_mirror_url: fields.take_string("download_mirror_url"),
            download_mirror_no_fallback: fields
                .take_bool("download_mirror_no_fallback")
                .unwrap_or(false),
            save_release_files,
            save_json: fields.take_bool("save_json").unwrap_or(false),
            simple_format,
            compare_method,
            digest_name,
            root_uri,
            hash_index: fields.take_bool("hash_index").unwrap_or(false),
            keep_index_versions: fields
                .take_int("keep_index_versions")
                .map(|count| count as usize)
                .unwrap_or(0),
            diff_file,
            diff_append_epoch: fields.take_bool("diff_append_epoch").unwrap_or(false),
            stop_on_error: fields.take_bool("stop_on_error").unwrap_or(false),
            timeout: fields.take_float("timeout").unwrap_or(10.0),
            global_timeout: fields.take_float("global_timeout").unwrap_or(1800.0),
            workers: fields
                .take_int("workers")
                .map(|count| count as usize)
                .unwrap_or(3),
            verifiers: fields
                .take_int("verifiers")
                .map(|count| count as usize)
                .unwrap_or(3),
            log_config: fields.take_path("log_config"),
            cleanup: fields.take_bool("cleanup").unwrap_or(false),
        })
    }
}

/// Convert a resolved choice-option string with `parse`, or use `default`
/// when the option was absent. Unknown names become validation errors naming
/// the option.
fn take_choice<T>(
    fields: &mut ResolvedFields,
    option: &'static str,
    parse: fn(&str) -> Result<T, String>,
    default: T,
) -> ConfigurationResult<T> {
    match fields.take_string(option) {
        Some(value) => parse(&value).map_err(|reason| ConfigurationError::OptionValidation {
            section: MirrorConfiguration::SECTION.to_string(),
            option: option.to_string(),
            reason,
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
#[path = "mirror_tests.rs"]
mod tests;
