//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::Folio;

const CONFIG: &str = r#"# Site
title: My Site
subtitle: ''
description: ''
author: John Doe
language: en

# URL
url: http://example.com
root: /

# Directory
source_dir: posts
public_dir: public

# Posts shown in the blog section, newest first
posts:
  - hello-world.md

# Sections
sections:
  - id: home
    name: Home
    content: home.md
  - id: blog
    name: Blog
default_section: home
blog_section: blog

# JSON post index (blog/index.json + blog/SLUG.md)
index:
  enable: false
  dir: blog
  file: index.json

# Markdown
markdown:
  gfm: true
  breaks: false
  highlight:
    enable: true
    theme: InspiredGitHub
    line_number: false

# KaTeX
math:
  enable: true
  throw_on_error: false
  output: htmlAndMathml
  macros:
    '\RR': '\mathbb{R}'
"#;

const HOME: &str = r#"Hi, welcome to my corner of the web.
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("{:?} already exists", config_path);
    }

    fs::create_dir_all(target_dir.join("posts"))?;
    fs::write(&config_path, CONFIG)?;
    fs::write(target_dir.join("home.md"), HOME)?;

    let today = chrono::Local::now().format("%Y-%m-%d");
    let sample_post = format!(
        r#"# Hello World
## {}

This is your very first post. Inline math like $e^{{i\pi}} + 1 = 0$ is typeset
with KaTeX, and so are display blocks:

$$
\int_0^1 x^2 \, dx = \frac{{1}}{{3}}
$$

\begin{{align}}
a &= b + c \\
d &= e \cdot f
\end{{align}}

Code blocks are left alone:

```bash
echo "$HOME"
```
"#,
        today
    );
    fs::write(target_dir.join("posts/hello-world.md"), sample_post)?;

    Ok(())
}

/// Run the init command with an existing site
pub fn run(folio: &Folio) -> Result<()> {
    init_site(&folio.base_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_loadable_site() {
        let dir = TempDir::new().unwrap();
        init_site(dir.path()).unwrap();

        let folio = Folio::new(dir.path()).unwrap();
        assert_eq!(folio.config.posts, vec!["hello-world.md".to_string()]);
        assert_eq!(folio.config.sections[0].content.as_deref(), Some("home.md"));
        assert_eq!(
            folio.config.math.macros.get("\\RR").map(String::as_str),
            Some("\\mathbb{R}")
        );
        assert!(folio.source_dir.join("hello-world.md").exists());
    }

    #[test]
    fn test_init_refuses_existing_site() {
        let dir = TempDir::new().unwrap();
        init_site(dir.path()).unwrap();
        assert!(init_site(dir.path()).is_err());
    }
}
