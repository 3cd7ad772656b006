//! Section switching
//!
//! The site is a handful of top-level sections of which exactly one is
//! visible. Switching to the blog section asks the caller to load posts.

use serde::Serialize;
use thiserror::Error;

use crate::config::{SectionConfig, SiteConfig};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NavError {
    #[error("Unknown section: {0}")]
    UnknownSection(String),

    #[error("No sections configured")]
    NoSections,
}

/// Outcome of [`SectionSwitcher::show`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionChange {
    pub previous: String,
    pub current: String,
    /// The blog section became visible; posts should be (re)loaded
    pub load_blog: bool,
}

/// A navigation link with its active flag
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NavLink {
    pub id: String,
    pub name: String,
    pub active: bool,
}

/// Tracks which section is visible
#[derive(Debug, Clone)]
pub struct SectionSwitcher {
    sections: Vec<SectionConfig>,
    active: usize,
    blog_section: String,
}

impl SectionSwitcher {
    pub fn new(sections: Vec<SectionConfig>, default: &str) -> Result<Self, NavError> {
        if sections.is_empty() {
            return Err(NavError::NoSections);
        }
        let active = sections
            .iter()
            .position(|s| s.id == default)
            .ok_or_else(|| NavError::UnknownSection(default.to_string()))?;

        Ok(Self {
            sections,
            active,
            blog_section: "blog".to_string(),
        })
    }

    pub fn from_config(config: &SiteConfig) -> Result<Self, NavError> {
        Ok(Self::new(config.sections.clone(), &config.default_section)?
            .with_blog_section(&config.blog_section))
    }

    pub fn with_blog_section(mut self, id: &str) -> Self {
        self.blog_section = id.to_string();
        self
    }

    /// Make `id` the only visible section
    pub fn show(&mut self, id: &str) -> Result<SectionChange, NavError> {
        let next = self
            .sections
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| NavError::UnknownSection(id.to_string()))?;

        let previous = self.sections[self.active].id.clone();
        self.active = next;
        tracing::debug!("Section {} -> {}", previous, id);

        Ok(SectionChange {
            previous,
            current: id.to_string(),
            load_blog: id == self.blog_section,
        })
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.active().id == id
    }

    pub fn active(&self) -> &SectionConfig {
        &self.sections[self.active]
    }

    pub fn sections(&self) -> &[SectionConfig] {
        &self.sections
    }

    pub fn is_blog(&self, id: &str) -> bool {
        id == self.blog_section
    }

    /// Links in configured order; only the visible section's is active
    pub fn links(&self) -> Vec<NavLink> {
        self.sections
            .iter()
            .enumerate()
            .map(|(i, s)| NavLink {
                id: s.id.clone(),
                name: s.name.clone(),
                active: i == self.active,
            })
            .collect()
    }
}
