//! Generate static files

use anyhow::Result;
use notify::Watcher;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::generator::Generator;
use crate::Folio;

/// Generate the static site
pub async fn run(folio: &Folio) -> Result<()> {
    let start = Instant::now();

    let generator = Generator::new(folio)?;
    generator.generate().await?;

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(())
}

/// Watch for file changes and regenerate
pub async fn watch(folio: &Folio) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    for dir in [&folio.source_dir, &folio.index_dir] {
        if dir.exists() {
            watcher.watch(dir, notify::RecursiveMode::Recursive)?;
        }
    }
    for section in &folio.config.sections {
        if let Some(file) = &section.content {
            let path = folio.base_dir.join(file);
            if path.exists() {
                watcher.watch(&path, notify::RecursiveMode::NonRecursive)?;
            }
        }
    }
    let config_path = folio.config_path();
    if config_path.exists() {
        watcher.watch(&config_path, notify::RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    // Debounce: only rebuild if more than 500ms since last rebuild
    let mut last_rebuild = Instant::now();
    let mut folio = folio.clone();

    while let Some(event) = rx.recv().await {
        if last_rebuild.elapsed() < Duration::from_millis(500) {
            continue;
        }
        if event.paths.iter().any(|p| p.starts_with(&folio.public_dir)) {
            continue;
        }

        tracing::info!("File changed, regenerating...");
        if event.paths.iter().any(|p| p.ends_with("_config.yml")) {
            match Folio::new(&folio.base_dir) {
                Ok(reloaded) => folio = reloaded,
                Err(e) => {
                    tracing::error!("Failed to reload config: {}", e);
                    continue;
                }
            }
        }
        if let Err(e) = run(&folio).await {
            tracing::error!("Generation failed: {}", e);
        }
        last_rebuild = Instant::now();
    }

    Ok(())
}
