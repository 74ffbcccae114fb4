//! Simple-index choice options: page format and digest algorithm.

use std::fmt;

/// Which simple-index page formats the mirror writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SimpleFormat {
    #[default]
    All,
    Html,
    Json,
}

impl SimpleFormat {
    /// Parse a configuration option value, case-insensitively.
    ///
    /// The `Err` payload is a user-facing reason listing the accepted names.
    pub fn from_option_value(value: &str) -> Result<Self, String> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ALL" => Ok(Self::All),
            "HTML" => Ok(Self::Html),
            "JSON" => Ok(Self::Json),
            other => Err(format!(
                "'{other}' is not a valid simple-index format; must be one of: ALL, HTML, JSON"
            )),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Html => "HTML",
            Self::Json => "JSON",
        }
    }
}

impl fmt::Display for SimpleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Digest algorithm recorded in simple-index pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SimpleDigest {
    Md5,
    #[default]
    Sha256,
}

impl SimpleDigest {
    /// Parse a configuration option value, case-insensitively.
    pub fn from_option_value(value: &str) -> Result<Self, String> {
        match value.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "sha256" => Ok(Self::Sha256),
            other => Err(format!(
                "'{other}' is not a valid digest name; must be one of: md5, sha256"
            )),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for SimpleDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "simple_tests.rs"]
mod tests;
