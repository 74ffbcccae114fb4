//! Method used for checking freshness of files on disk.

use std::fmt;

/// How an on-disk file is compared against upstream metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ComparisonMethod {
    /// Compare by content digest.
    #[default]
    Hash,
    /// Compare by size and modification time.
    Stat,
}

impl ComparisonMethod {
    /// Parse a configuration option value, case-insensitively.
    pub fn from_option_value(value: &str) -> Result<Self, String> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hash" => Ok(Self::Hash),
            "stat" => Ok(Self::Stat),
            other => Err(format!(
                "'{other}' is not a valid file comparison method; must be one of: hash, stat"
            )),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hash => "hash",
            Self::Stat => "stat",
        }
    }
}

impl fmt::Display for ComparisonMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "comparison_tests.rs"]
mod tests;
