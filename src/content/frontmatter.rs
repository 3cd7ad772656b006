//! Front-matter parsing
//!
//! Posts may start with a YAML-lite block:
//!
//! ```text
//! ---
//! title: My Post
//! date: 2025-10-01
//! ---
//! ```
//!
//! Only flat `key: value` lines are understood; values are plain strings.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref BLOCK_RE: Regex =
        Regex::new(r"\A---[ \t]*\r?\n(?s:(.*?)\r?\n)?---[ \t]*(?:\r?\n|\z)").unwrap();
    static ref FIELD_RE: Regex = Regex::new(r"^\s*([A-Za-z0-9_-]+)\s*:\s*(.*?)\s*$").unwrap();
}

/// Front-matter fields of a post, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrontMatter {
    pub fields: IndexMap<String, String>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> (Self, &str) {
        let Some(caps) = BLOCK_RE.captures(content) else {
            return (FrontMatter::default(), content);
        };
        let block = caps.get(1).map_or("", |m| m.as_str());
        let whole = caps.get(0).map_or(0, |m| m.end());

        let mut fields = IndexMap::new();
        for line in block.lines() {
            if let Some(field) = FIELD_RE.captures(line) {
                // Later occurrences overwrite earlier ones
                fields.insert(field[1].to_string(), field[2].to_string());
            }
        }

        if fields.is_empty() && !block.trim().is_empty() {
            // Something between two rules, but not metadata
            tracing::debug!("Ignoring malformed front-matter block");
            return (FrontMatter::default(), content);
        }

        let remaining = content[whole..].trim_start_matches(['\n', '\r']);
        (FrontMatter { fields }, remaining)
    }

    /// Get a field by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Non-empty `title` field
    pub fn title(&self) -> Option<&str> {
        self.get("title").filter(|s| !s.is_empty())
    }

    /// Non-empty `date` field
    pub fn date(&self) -> Option<&str> {
        self.get("date").filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
