//! Built-in site templates using the Tera template engine
//!
//! Templates are embedded in the binary; there is no theme directory.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::helpers::{format_long_date, html_to_text};

/// Stylesheet written to `css/style.css`
pub const STYLESHEET: &str = include_str!("site/style.css");

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Post bodies are already sanitized HTML; text fields are escaped
        // explicitly in the templates
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("section.html", include_str!("site/section.html")),
            ("post.html", include_str!("site/post.html")),
            // Partials
            ("partials/nav.html", include_str!("site/partials/nav.html")),
            (
                "partials/blog_list.html",
                include_str!("site/partials/blog_list.html"),
            ),
            (
                "partials/toggle.js",
                include_str!("site/partials/toggle.js"),
            ),
        ])?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("long_date", long_date_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// A top-level section page, with the blog list when present
    pub fn render_section(
        &self,
        site: &SiteData,
        nav: &[NavItem],
        section: &SectionData,
        blog: Option<&BlogData>,
    ) -> Result<String> {
        let mut context = Context::new();
        context.insert("site", site);
        context.insert("nav", nav);
        context.insert("section", section);
        context.insert("blog", &blog);
        self.render("section.html", &context)
    }

    /// A single post opened from the JSON index
    pub fn render_post(&self, site: &SiteData, nav: &[NavItem], post: &PostPageData) -> Result<String> {
        let mut context = Context::new();
        context.insert("site", site);
        context.insert("nav", nav);
        context.insert("post", post);
        self.render("post.html", &context)
    }
}

/// Tera filter: visible text of HTML, entities decoded
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    Ok(tera::Value::String(html_to_text(&s)))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 160,
    };

    let s = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!("{}...", truncated.trim_end())))
    }
}

/// Tera filter: `2025-10-10` -> `October 10, 2025`, other text unchanged
fn long_date_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("long_date", "value", String, value);
    Ok(tera::Value::String(format_long_date(&s)))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub root: String,
    /// `<link>` tag for the site stylesheet
    pub stylesheet: String,
    /// `<link>` tag for the KaTeX stylesheet, when math is on
    pub katex_css: Option<String>,
    /// Include the live reload hook
    pub live_reload: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavItem {
    pub id: String,
    pub name: String,
    pub href: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionData {
    pub id: String,
    pub name: String,
    /// Rendered body, empty when the section has no content file
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub toggle_id: String,
    pub expanded: bool,
    pub slug: String,
    pub title: String,
    pub date: String,
    pub html: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexCard {
    pub href: String,
    pub title: String,
    pub meta: String,
    pub excerpt: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BlogData {
    pub posts: Vec<PostView>,
    pub cards: Vec<IndexCard>,
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostPageData {
    pub back_href: String,
    pub back_label: String,
    pub title: String,
    pub meta: String,
    pub html: String,
    /// Shown instead of the post when loading failed
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteData {
        SiteData {
            title: "Folio".to_string(),
            subtitle: String::new(),
            description: "A <personal> site".to_string(),
            author: "Ada".to_string(),
            language: "en".to_string(),
            root: "/".to_string(),
            stylesheet: r#"<link rel="stylesheet" href="/css/style.css">"#.to_string(),
            katex_css: Some(r#"<link rel="stylesheet" href="katex.css">"#.to_string()),
            live_reload: false,
        }
    }

    fn nav() -> Vec<NavItem> {
        vec![
            NavItem {
                id: "home".to_string(),
                name: "Home".to_string(),
                href: "/".to_string(),
                active: false,
            },
            NavItem {
                id: "blog".to_string(),
                name: "Blog".to_string(),
                href: "/blog/".to_string(),
                active: true,
            },
        ]
    }

    fn blog_section() -> SectionData {
        SectionData {
            id: "blog".to_string(),
            name: "Blog".to_string(),
            content: String::new(),
        }
    }

    #[test]
    fn test_templates_load() {
        assert!(TemplateRenderer::new().is_ok());
    }

    #[test]
    fn test_render_post_list() {
        let renderer = TemplateRenderer::new().unwrap();
        let blog = BlogData {
            posts: vec![PostView {
                toggle_id: "post-toggle-0".to_string(),
                expanded: false,
                slug: "first".to_string(),
                title: "Fish & <Chips>".to_string(),
                date: "2025-10-10".to_string(),
                html: "<p>Body</p>".to_string(),
            }],
            ..Default::default()
        };

        let html = renderer
            .render_section(&site(), &nav(), &blog_section(), Some(&blog))
            .unwrap();
        assert!(html.contains(r#"id="post-toggle-0""#));
        assert!(html.contains(r#"aria-expanded="false""#));
        assert!(html.contains(r#"id="post-toggle-0-content" class="markdown-content" hidden"#));
        assert!(html.contains("Fish &amp; &lt;Chips&gt;"));
        assert!(html.contains("October 10, 2025"));
        assert!(html.contains("<p>Body</p>"));
        assert!(html.contains(r#"href="katex.css""#));
        assert!(html.contains(r#"class="nav-link active" data-section="blog""#));
        assert!(!html.contains("__livereload"));
    }

    #[test]
    fn test_render_placeholder() {
        let renderer = TemplateRenderer::new().unwrap();
        let blog = BlogData {
            placeholder: Some("No posts yet. Check back soon!".to_string()),
            ..Default::default()
        };
        let html = renderer
            .render_section(&site(), &nav(), &blog_section(), Some(&blog))
            .unwrap();
        assert!(html.contains("<p>No posts yet. Check back soon!</p>"));
        assert!(!html.contains(r#"id="post-toggle-"#));
    }

    #[test]
    fn test_render_section_without_blog() {
        let renderer = TemplateRenderer::new().unwrap();
        let section = SectionData {
            id: "home".to_string(),
            name: "Home".to_string(),
            content: "<p>Welcome</p>".to_string(),
        };
        let html = renderer.render_section(&site(), &nav(), &section, None).unwrap();
        assert!(html.contains(r#"<section id="home""#));
        assert!(html.contains("<p>Welcome</p>"));
        assert!(!html.contains("blog-list"));
    }

    #[test]
    fn test_render_post_page() {
        let renderer = TemplateRenderer::new().unwrap();
        let post = PostPageData {
            back_href: "/blog/".to_string(),
            back_label: "← Back to Blog".to_string(),
            title: "Raw Coordinates".to_string(),
            meta: "October 10, 2025 • 5 min read".to_string(),
            html: "<p>Precision matters.</p>".to_string(),
            error: None,
        };
        let html = renderer.render_post(&site(), &nav(), &post).unwrap();
        assert!(html.contains("<h1>Raw Coordinates</h1>"));
        assert!(html.contains(r#"<a href="/blog/" class="blog-back">"#));
        assert!(html.contains("<p>Precision matters.</p>"));
        assert!(html.contains(r#"<meta name="description" content="Precision matters.">"#));

        let failed = PostPageData {
            error: Some("Error loading blog post".to_string()),
            ..post
        };
        let html = renderer.render_post(&site(), &nav(), &failed).unwrap();
        assert!(html.contains(r#"<div class="loading">Error loading blog post</div>"#));
        assert!(!html.contains("<h1>"));
    }

    #[test]
    fn test_post_description_is_plain_text() {
        let renderer = TemplateRenderer::new().unwrap();
        let post = PostPageData {
            back_href: "/blog/".to_string(),
            back_label: "Back".to_string(),
            title: "Bounds".to_string(),
            meta: String::new(),
            html: concat!(
                r#"<p>Since a &lt; b, "#,
                r#"<span class="katex"><span class="katex-mathml"><math><semantics>"#,
                r#"<annotation encoding="application/x-tex">y</annotation>"#,
                r#"</semantics></math></span><span class="katex-html">y</span></span>"#,
                r#" holds.</p>"#,
            )
            .to_string(),
            error: None,
        };
        let html = renderer.render_post(&site(), &nav(), &post).unwrap();
        assert!(html.contains(r#"<meta name="description" content="Since a &lt; b, y holds.">"#));
        assert!(!html.contains("&amp;lt;"));
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        let renderer = TemplateRenderer::new().unwrap();
        let site = SiteData {
            language: r#"en" onload="x"#.to_string(),
            ..site()
        };
        let mut links = nav();
        links[0].id = r#"home" onclick="x"#.to_string();
        let section = SectionData {
            id: r#"home" onclick="x"#.to_string(),
            name: "Home".to_string(),
            content: String::new(),
        };
        let html = renderer.render_section(&site, &links, &section, None).unwrap();
        assert!(html.contains(r#"<html lang="en&quot; onload=&quot;x">"#));
        assert!(html.contains(r#"<section id="home&quot; onclick=&quot;x""#));
        assert!(html.contains(r#"data-section="home&quot; onclick=&quot;x""#));
        assert!(!html.contains(r#"onclick="x""#));
    }

    #[test]
    fn test_filters() {
        let value = tera::Value::String("<p>a  &lt; b</p>".to_string());
        let stripped = strip_html_filter(&value, &HashMap::new()).unwrap();
        assert_eq!(stripped, tera::Value::String("a  < b".to_string()));

        let mut args = HashMap::new();
        args.insert("length".to_string(), tera::Value::from(3));
        let cut = truncate_chars_filter(&tera::Value::String("a  b c d".to_string()), &args).unwrap();
        assert_eq!(cut, tera::Value::String("a b...".to_string()));
    }
}
