pub mod catalog;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod state;

use std::path::PathBuf;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::catalog::JsonCatalog;
use crate::commands::{render_page, render_summary};
use crate::config::ViewerConfig;
use crate::db::SqliteRepository;
use crate::state::AppState;
use binder_core::LayoutMode;

/// Options collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub binder: PathBuf,
    pub catalog: Option<PathBuf>,
    /// Pages to print; all pages when empty.
    pub pages: Vec<usize>,
    pub no_cache: bool,
    pub layout: Option<LayoutMode>,
}

pub fn run(options: RunOptions) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = ViewerConfig::from_env()?;
    if let Some(layout) = options.layout {
        config.defaults.layout_mode = layout;
    }

    let repository = if options.no_cache {
        None
    } else {
        if let Some(parent) = config.db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let repository = SqliteRepository::open(&config.db_path)?;
        tracing::info!(
            path = %config.db_path.display(),
            binders = repository.count_cached()?,
            "cache opened"
        );
        Some(repository)
    };

    let catalog = match &options.catalog {
        Some(path) => {
            let catalog = JsonCatalog::from_path(path)
                .with_context(|| format!("loading catalog {}", path.display()))?;
            tracing::info!(cards = catalog.len(), "catalog loaded");
            catalog
        }
        None => {
            tracing::warn!("no catalog given, every lookup will be unresolved");
            JsonCatalog::default()
        }
    };

    let mut state = AppState::new(repository, catalog, &config);
    let binder = state.load(&options.binder)?;

    println!("{}", render_summary(&binder));
    let pages = if options.pages.is_empty() {
        (1..=binder.page_count()).collect()
    } else {
        options.pages.clone()
    };
    for page in pages {
        if page == 0 || page > binder.page_count() {
            tracing::warn!(page, pages = binder.page_count(), "page out of range");
            continue;
        }
        println!();
        print!("{}", render_page(&binder, page));
    }

    Ok(())
}
