//! List site content

use anyhow::Result;

use crate::content::{FsSource, PostIndex, PostLoader, RenderPipeline};
use crate::helpers::format_long_date;
use crate::Folio;

/// List site content by type
pub async fn run(folio: &Folio, content_type: &str) -> Result<()> {
    let config = &folio.config;

    match content_type {
        "post" | "posts" => {
            let source = FsSource::new(&folio.source_dir);
            let pipeline = RenderPipeline::from_config(config);
            let loader = PostLoader::new(&source, &pipeline, &config.messages);
            let listing = loader.load(&config.posts).await;

            println!("Posts ({} of {}):", listing.entries.len(), config.posts.len());
            for entry in &listing.entries {
                let post = &entry.post;
                println!(
                    "  {} - {} [{}]",
                    format_long_date(&post.date),
                    post.title,
                    post.file
                );
            }
            if let Some(placeholder) = &listing.placeholder {
                println!("  {}", placeholder);
            }
        }
        "section" | "sections" => {
            println!("Sections ({}):", config.sections.len());
            for section in &config.sections {
                let mut flags = Vec::new();
                if section.id == config.default_section {
                    flags.push("default");
                }
                if section.id == config.blog_section {
                    flags.push("blog");
                }
                println!("  {} - {} {:?}", section.id, section.name, flags);
            }
        }
        "index" => {
            if !config.index.enable {
                println!("The post index is disabled (index.enable: false)");
                return Ok(());
            }
            let source = FsSource::new(&folio.index_dir);
            let index = PostIndex::load(&source, &config.index.file).await?;
            println!("Indexed posts ({}):", index.entries.len());
            for entry in &index.entries {
                println!("  {} - {} [{}]", entry.meta_line(), entry.title, entry.slug);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, section, index",
                content_type
            );
        }
    }

    Ok(())
}
