//! HTML sanitization of converted post bodies

use ammonia::Builder;

/// Allow-list sanitizer run between Markdown conversion and math hydration
pub struct Sanitizer {
    builder: Builder<'static>,
}

impl Sanitizer {
    pub fn new() -> Self {
        let mut builder = Builder::default();
        builder
            // Task list checkboxes
            .add_tags(["input"])
            .add_tag_attributes("input", ["type", "checked", "disabled"])
            // Highlighted code, footnotes and line-number tables
            .add_generic_attributes(["class", "id"])
            .add_tag_attributes("pre", ["style"])
            .add_tag_attributes("span", ["style"])
            .add_tag_attributes("th", ["style"])
            .add_tag_attributes("td", ["style"]);

        Self { builder }
    }

    /// Strip everything outside the allow-list
    pub fn clean(&self, html: &str) -> String {
        self.builder.clean(html).to_string()
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_scripts_and_handlers() {
        let sanitizer = Sanitizer::new();
        let html = sanitizer.clean(
            r#"<p onclick="steal()">Hi</p><script>alert(1)</script><a href="javascript:x()">x</a>"#,
        );
        assert!(!html.contains("onclick"));
        assert!(!html.contains("<script"));
        assert!(!html.contains("alert"));
        assert!(!html.contains("javascript:"));
        assert!(html.contains("<p>Hi</p>"));
    }

    #[test]
    fn test_keeps_content_markup() {
        let sanitizer = Sanitizer::new();
        let input = r#"<pre style="background-color:#fff;"><span style="color:#323232;">x</span></pre><code class="language-rust">y</code><li><input disabled="" type="checkbox" checked=""> done</li>"#;
        let html = sanitizer.clean(input);
        assert!(html.contains(r#"<pre style="background-color:#fff;">"#));
        assert!(html.contains(r#"<span style="color:#323232;">"#));
        assert!(html.contains(r#"class="language-rust""#));
        assert!(html.contains(r#"type="checkbox""#));
    }

    #[test]
    fn test_keeps_footnote_anchors() {
        let sanitizer = Sanitizer::new();
        let input = r##"<sup class="footnote-reference"><a href="#1">1</a></sup><div class="footnote-definition" id="1"><p>Note</p></div>"##;
        let html = sanitizer.clean(input);
        assert!(html.contains(r##"href="#1""##));
        assert!(html.contains(r#"id="1""#));
    }

    #[test]
    fn test_placeholder_tokens_survive() {
        let sanitizer = Sanitizer::new();
        let html = sanitizer.clean("<p>⟪KXBLOCK:0⟫</p>");
        assert_eq!(html, "<p>⟪KXBLOCK:0⟫</p>");
    }
}
