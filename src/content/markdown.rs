//! Markdown rendering with syntax highlighting

use anyhow::Result;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::MarkdownConfig;
use crate::helpers::html_escape;

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    highlight: bool,
    line_numbers: bool,
    gfm: bool,
    breaks: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::from_config(&MarkdownConfig::default())
    }

    /// Create with custom settings
    pub fn from_config(config: &MarkdownConfig) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: config.highlight.theme.clone(),
            highlight: config.highlight.enable,
            line_numbers: config.highlight.line_number,
            gfm: config.gfm,
            breaks: config.breaks,
        }
    }

    fn options(&self) -> Options {
        // No smart punctuation and no heading ids: text is left as written
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_FOOTNOTES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Result<String> {
        let parser = Parser::new_ext(markdown, self.options());

        let mut events: Vec<Event> = Vec::new();
        let mut in_code_block = false;
        let mut code_block_lang: Option<String> = None;
        let mut code_block_content = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) if self.highlight => {
                    in_code_block = true;
                    code_block_lang = match kind {
                        CodeBlockKind::Fenced(lang) => lang
                            .split_whitespace()
                            .next()
                            .map(str::to_string)
                            .filter(|l| !l.is_empty()),
                        CodeBlockKind::Indented => None,
                    };
                    code_block_content.clear();
                }
                Event::End(TagEnd::CodeBlock) if in_code_block => {
                    let highlighted =
                        self.highlight_code(&code_block_content, code_block_lang.as_deref());
                    events.push(Event::Html(CowStr::from(highlighted)));
                    in_code_block = false;
                    code_block_lang = None;
                }
                Event::Text(text) if in_code_block => {
                    code_block_content.push_str(&text);
                }
                Event::SoftBreak if self.breaks => events.push(Event::HardBreak),
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        // Try to find syntax for the language
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next());

        let highlighted = theme.and_then(|theme| {
            highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
        });

        match highlighted {
            Some(highlighted) if self.line_numbers => self.add_line_numbers(&highlighted, lang),
            Some(highlighted) => highlighted,
            None => {
                // Fallback to plain code block
                format!(
                    r#"<pre><code class="language-{}">{}</code></pre>"#,
                    html_escape(lang),
                    html_escape(code)
                )
            }
        }
    }

    /// Add line numbers to highlighted code
    fn add_line_numbers(&self, code: &str, lang: &str) -> String {
        let code = code
            .trim_start_matches(|c| c != '\n')
            .trim_start_matches('\n')
            .trim_end()
            .trim_end_matches("</pre>");
        let lines: Vec<&str> = code.lines().collect();

        let gutter: Vec<String> = (1..=lines.len())
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect();

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code"><pre>{}</pre></td></tr></table></figure>"#,
            html_escape(lang),
            gutter.join("\n"),
            lines.join("\n")
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HighlightConfig;

    fn plain() -> MarkdownRenderer {
        MarkdownRenderer::from_config(&MarkdownConfig {
            highlight: HighlightConfig {
                enable: false,
                ..Default::default()
            },
            ..Default::default()
        })
    }

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a test.").unwrap();
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_no_smart_punctuation_or_heading_ids() {
        let html = plain().render("## \"Quoted\" -- dash {#custom}").unwrap();
        assert!(html.contains("<h2>\"Quoted\" -- dash {#custom}</h2>"));
        assert!(!html.contains("id="));
    }

    #[test]
    fn test_gfm_extensions() {
        let md = "| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~\n\n- [x] done\n";
        let html = plain().render(md).unwrap();
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains("checkbox"));
    }

    #[test]
    fn test_soft_breaks() {
        let html = plain().render("line one\nline two").unwrap();
        assert!(!html.contains("<br"));

        let breaking = MarkdownRenderer::from_config(&MarkdownConfig {
            breaks: true,
            ..Default::default()
        });
        let html = breaking.render("line one\nline two").unwrap();
        assert!(html.contains("<br />"));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```").unwrap();
        assert!(html.starts_with("<pre"));
        assert!(html.contains("main"));
    }

    #[test]
    fn test_code_block_line_numbers() {
        let renderer = MarkdownRenderer::from_config(&MarkdownConfig {
            highlight: HighlightConfig {
                line_number: true,
                ..Default::default()
            },
            ..Default::default()
        });
        let html = renderer.render("```python\na = 1\nb = 2\n```").unwrap();
        assert!(html.contains(r#"<figure class="highlight python">"#));
        assert!(html.contains(r#"<span class="line-number">2</span>"#));
    }

    #[test]
    fn test_plain_code_block_keeps_dollars() {
        let html = plain().render("```\necho $HOME\n```").unwrap();
        assert_eq!(html, "<pre><code>echo $HOME\n</code></pre>\n");
    }

    #[test]
    fn test_placeholder_tokens_survive() {
        let html = plain().render("Before\n\n⟪KXBLOCK:0⟫\n\n*a* ⟪KXBLOCK:1⟫").unwrap();
        assert!(html.contains("<p>⟪KXBLOCK:0⟫</p>"));
        assert!(html.contains("<em>a</em> ⟪KXBLOCK:1⟫"));
    }
}
