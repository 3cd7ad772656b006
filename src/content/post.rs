//! Rendered post model

use serde::Serialize;

use super::FrontMatter;
use crate::helpers::{format_long_date, summarize};

/// A post after the full render pipeline
#[derive(Debug, Clone, Serialize)]
pub struct RenderedPost {
    /// Source file name
    pub file: String,

    /// Resolved title (front matter, heading, or file name)
    pub title: String,

    /// Resolved date text, possibly empty
    pub date: String,

    /// Sanitized, typeset HTML body
    pub html: String,

    /// Front-matter fields as written
    pub meta: FrontMatter,
}

impl RenderedPost {
    /// URL-friendly name derived from the file name
    pub fn slug(&self) -> String {
        let stem = self.file.strip_suffix(".md").unwrap_or(&self.file);
        slug::slugify(stem)
    }

    /// `October 10, 2025` when the date parses, the raw text otherwise
    pub fn display_date(&self) -> String {
        format_long_date(&self.date)
    }

    /// Plain-text summary for meta descriptions
    pub fn summary(&self, length: usize) -> String {
        self.meta
            .get("description")
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| summarize(&self.html, length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(file: &str, date: &str, html: &str) -> RenderedPost {
        RenderedPost {
            file: file.to_string(),
            title: "T".to_string(),
            date: date.to_string(),
            html: html.to_string(),
            meta: FrontMatter::default(),
        }
    }

    #[test]
    fn test_slug_from_file_name() {
        let p = post("10052025_Intro_GenBio.md", "", "");
        assert_eq!(p.slug(), "10052025-intro-genbio");
    }

    #[test]
    fn test_display_date() {
        assert_eq!(post("a.md", "2025-10-10", "").display_date(), "October 10, 2025");
        assert_eq!(post("a.md", "Fall 2025", "").display_date(), "Fall 2025");
    }

    #[test]
    fn test_summary_prefers_description() {
        let mut p = post("a.md", "", "<p>Body text</p>");
        assert_eq!(p.summary(50), "Body text");

        let (meta, _) = FrontMatter::parse("---\ndescription: Short blurb\n---\n");
        p.meta = meta;
        assert_eq!(p.summary(50), "Short blurb");
    }
}
