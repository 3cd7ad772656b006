//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::math::Delimiter;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub source_dir: String,
    pub public_dir: String,

    /// Post files to load, newest first
    pub posts: Vec<String>,

    // Sections
    #[serde(default = "default_sections")]
    pub sections: Vec<SectionConfig>,
    pub default_section: String,
    pub blog_section: String,

    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub markdown: MarkdownConfig,
    #[serde(default)]
    pub math: MathConfig,
    #[serde(default)]
    pub messages: MessagesConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

fn default_sections() -> Vec<SectionConfig> {
    vec![
        SectionConfig::new("home", "Home"),
        SectionConfig::new("blog", "Blog"),
    ]
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Folio".to_string(),
            subtitle: String::new(),
            description: String::new(),
            author: "John Doe".to_string(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            source_dir: "posts".to_string(),
            public_dir: "public".to_string(),

            posts: Vec::new(),

            sections: default_sections(),
            default_section: "home".to_string(),
            blog_section: "blog".to_string(),

            index: IndexConfig::default(),
            markdown: MarkdownConfig::default(),
            math: MathConfig::default(),
            messages: MessagesConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the section setup is coherent
    pub fn validate(&self) -> Result<()> {
        if self.sections.is_empty() {
            anyhow::bail!("At least one section must be configured");
        }
        if !self.has_section(&self.default_section) {
            anyhow::bail!(
                "default_section '{}' is not one of the configured sections",
                self.default_section
            );
        }
        Ok(())
    }

    /// Whether a section with this id is configured
    pub fn has_section(&self, id: &str) -> bool {
        self.sections.iter().any(|s| s.id == id)
    }
}

/// A top-level page section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SectionConfig {
    pub id: String,
    pub name: String,
    /// Optional Markdown file rendered as the section body
    #[serde(default)]
    pub content: Option<String>,
}

impl SectionConfig {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            content: None,
        }
    }
}

/// JSON post index (slug-addressed posts)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub enable: bool,
    /// Directory holding index.json and SLUG.md files
    pub dir: String,
    pub file: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            enable: false,
            dir: "blog".to_string(),
            file: "index.json".to_string(),
        }
    }
}

/// Markdown conversion settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    pub gfm: bool,
    /// Turn soft line breaks into `<br>`
    pub breaks: bool,
    #[serde(default)]
    pub highlight: HighlightConfig,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            gfm: true,
            breaks: false,
            highlight: HighlightConfig::default(),
        }
    }
}

/// Syntax highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            theme: "InspiredGitHub".to_string(),
            line_number: false,
        }
    }
}

/// KaTeX configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MathConfig {
    pub enable: bool,
    pub throw_on_error: bool,
    pub trust: bool,
    /// `html`, `mathml` or `htmlAndMathml`
    pub output: String,
    pub css: String,
    #[serde(default = "default_delimiters")]
    pub delimiters: Vec<Delimiter>,
    #[serde(default = "default_ignored_tags")]
    pub ignored_tags: Vec<String>,
    #[serde(default)]
    pub macros: HashMap<String, String>,
}

impl Default for MathConfig {
    fn default() -> Self {
        Self {
            enable: true,
            throw_on_error: false,
            trust: false,
            output: "htmlAndMathml".to_string(),
            css: "https://cdn.jsdelivr.net/npm/katex@0.16.10/dist/katex.min.css".to_string(),
            delimiters: default_delimiters(),
            ignored_tags: default_ignored_tags(),
            macros: HashMap::new(),
        }
    }
}

fn default_delimiters() -> Vec<Delimiter> {
    crate::math::default_delimiters()
}

fn default_ignored_tags() -> Vec<String> {
    ["script", "noscript", "style", "textarea", "pre", "code"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// User-facing placeholder texts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagesConfig {
    pub no_posts: String,
    pub all_failed: String,
    pub index_error: String,
    pub post_error: String,
    pub back_to_blog: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            no_posts: "No posts yet. Check back soon!".to_string(),
            all_failed: "Posts are being prepared. Check back soon!".to_string(),
            index_error: "Error loading blog posts".to_string(),
            post_error: "Error loading blog post".to_string(),
            back_to_blog: "← Back to Blog".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "Folio");
        assert_eq!(config.source_dir, "posts");
        assert_eq!(config.sections.len(), 2);
        assert!(config.math.enable);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Site
author: Test User
posts:
  - 10102025_raw_coord_precision.md
  - 10052025_intro_genbio.md
sections:
  - id: home
    name: Home
  - id: research
    name: Research
  - id: blog
    name: Notes
math:
  throw_on_error: true
  ignored_tags: [pre, code]
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Site");
        assert_eq!(config.posts[0], "10102025_raw_coord_precision.md");
        assert_eq!(config.sections[1].id, "research");
        assert!(config.math.throw_on_error);
        assert_eq!(config.math.ignored_tags, vec!["pre", "code"]);
        // untouched nested fields keep their defaults
        assert_eq!(config.math.delimiters.len(), 8);
        assert_eq!(config.messages.no_posts, "No posts yet. Check back soon!");
    }

    #[test]
    fn test_parse_custom_delimiters() {
        let yaml = r#"
math:
  delimiters:
    - { left: "$", right: "$", display: false }
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.math.delimiters.len(), 1);
        assert!(!config.math.delimiters[0].display);
    }

    #[test]
    fn test_validate_unknown_default_section() {
        let config = SiteConfig {
            default_section: "missing".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
