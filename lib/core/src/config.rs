use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a tag string is cut into vocabulary tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenizerDialect {
    /// Lowercase, replace the tag delimiter with a space, split on whitespace.
    /// "Sci-Fi" and "sci-fi" become the same token.
    Whitespace,
    /// Split on the tag delimiter only, keep the original casing.
    Delimited,
}

/// How a queried title is matched against catalog titles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookupPolicy {
    Exact,
    /// Lowercased comparison; the first catalog row wins on collisions
    CaseInsensitive,
}

impl FromStr for TokenizerDialect {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "whitespace" | "words" => Ok(TokenizerDialect::Whitespace),
            "delimited" | "tags" => Ok(TokenizerDialect::Delimited),
            other => Err(format!("unknown tokenizer dialect '{}'", other)),
        }
    }
}

impl FromStr for LookupPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exact" => Ok(LookupPolicy::Exact),
            "case-insensitive" | "case_insensitive" | "ci" => Ok(LookupPolicy::CaseInsensitive),
            other => Err(format!("unknown lookup policy '{}'", other)),
        }
    }
}

impl fmt::Display for TokenizerDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenizerDialect::Whitespace => write!(f, "whitespace"),
            TokenizerDialect::Delimited => write!(f, "delimited"),
        }
    }
}

impl fmt::Display for LookupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupPolicy::Exact => write!(f, "exact"),
            LookupPolicy::CaseInsensitive => write!(f, "case-insensitive"),
        }
    }
}

/// Configuration for an engine, fixed at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub dialect: TokenizerDialect,
    pub stopwords: bool,
    pub lookup: LookupPolicy,
    pub default_top_n: usize,
    pub tag_delimiter: char,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dialect: TokenizerDialect::Whitespace,
            stopwords: true,
            lookup: LookupPolicy::Exact,
            default_top_n: 5,
            tag_delimiter: '|',
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.default_top_n == 0 {
            return Err(Error::InvalidConfig(
                "default_top_n must be positive".to_string(),
            ));
        }
        if self.tag_delimiter.is_whitespace() {
            return Err(Error::InvalidConfig(
                "tag delimiter cannot be whitespace".to_string(),
            ));
        }
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn with_dialect(mut self, dialect: TokenizerDialect) -> Self {
        self.dialect = dialect;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_lookup(mut self, lookup: LookupPolicy) -> Self {
        self.lookup = lookup;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_stopwords(mut self, stopwords: bool) -> Self {
        self.stopwords = stopwords;
        self
    }
}
