//! Case metadata extraction
//!
//! Cases describe themselves either with an explicit [`CaseMeta`] attached at
//! registration, or with free-text documentation carrying `key: value` lines:
//!
//! ```text
//! title: Transfer succeeds
//! describe: Moves funds between two accounts
//! level: 1
//! tag: smoke,transfer
//! ```
//!
//! [`DocParser`] is the adapter for the free-text form. It never fails; absent
//! or malformed lines degrade to empty strings and the default level.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Priority level used when a case declares none
pub const DEFAULT_LEVEL: u32 = 2;

/// Structured metadata for one case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseMeta {
    /// Display title
    pub title: String,
    /// Longer description
    pub description: String,
    /// Priority level, lower is more important
    pub level: u32,
    /// Free-form labels
    pub tags: Vec<String>,
}

impl Default for CaseMeta {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            level: DEFAULT_LEVEL,
            tags: Vec::new(),
        }
    }
}

impl CaseMeta {
    /// Create metadata with a title and default everything else
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the priority level
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    /// Set the tags
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Parser for `key: value` metadata embedded in documentation text
pub struct DocParser;

impl DocParser {
    /// Parse every supported field out of `docs`
    pub fn parse(docs: Option<&str>) -> CaseMeta {
        let mut description = Self::content(docs, "describe");
        if description.is_empty() {
            description = Self::content(docs, "description");
        }

        CaseMeta {
            title: Self::content(docs, "title"),
            description,
            level: Self::level(docs),
            tags: Self::tags(docs),
        }
    }

    /// Value of the first `<key>: <value>` line, or an empty string
    pub fn content(docs: Option<&str>, key: &str) -> String {
        let Some(docs) = docs.filter(|d| !d.is_empty()) else {
            return String::new();
        };
        let Some(pattern) = key_pattern(key, "(.+)") else {
            return String::new();
        };

        pattern
            .captures(docs)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    }

    /// Tags from every `tag: a,b,c` line, in order, split on commas
    pub fn tags(docs: Option<&str>) -> Vec<String> {
        let Some(docs) = docs.filter(|d| !d.is_empty()) else {
            return Vec::new();
        };
        let Some(pattern) = key_pattern("tag", "(.+)") else {
            return Vec::new();
        };

        pattern
            .captures_iter(docs)
            .filter_map(|caps| caps.get(1))
            .flat_map(|m| m.as_str().split(','))
            .map(str::to_string)
            .collect()
    }

    /// Level from the first `level: <digits>` line, [`DEFAULT_LEVEL`] otherwise
    pub fn level(docs: Option<&str>) -> u32 {
        let Some(docs) = docs.filter(|d| !d.is_empty()) else {
            return DEFAULT_LEVEL;
        };
        let Some(pattern) = key_pattern("level", r"(\d+)") else {
            return DEFAULT_LEVEL;
        };

        if let Some(digits) = pattern.captures(docs).and_then(|caps| caps.get(1)) {
            return match digits.as_str().parse::<u32>() {
                Ok(level) => level,
                Err(e) => {
                    error!(value = %digits.as_str(), "Failed to parse case level: {e}");
                    DEFAULT_LEVEL
                }
            };
        }

        let raw = Self::content(Some(docs), "level");
        if raw.is_empty() {
            debug!("No level declared, using default {DEFAULT_LEVEL}");
        } else {
            error!(value = %raw, "Case level is not numeric, using default {DEFAULT_LEVEL}");
        }
        DEFAULT_LEVEL
    }

    /// Class display name: the class doc `title:` line, else the raw class name
    pub fn class_title(class_doc: Option<&str>, class_name: &str) -> String {
        let title = Self::content(class_doc, "title");
        if title.is_empty() {
            class_name.to_string()
        } else {
            title
        }
    }
}

fn key_pattern(key: &str, value: &str) -> Option<Regex> {
    let source = format!("{}: {value}", regex::escape(key));
    match Regex::new(&source) {
        Ok(pattern) => Some(pattern),
        Err(e) => {
            error!(key = %key, "Failed to build metadata pattern: {e}");
            None
        }
    }
}
