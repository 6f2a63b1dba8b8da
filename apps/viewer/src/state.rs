//! Application state.

use crate::catalog::JsonCatalog;
use crate::commands::{load_binder, LoadedBinder};
use crate::config::ViewerConfig;
use crate::db::SqliteRepository;
use crate::error::LoadError;
use binder_core::{BinderCache, BinderSettings, FaceImages};
use std::path::Path;

/// Everything a binder load needs, owned in one place.
pub struct AppState {
    /// `None` when caching is disabled.
    pub repository: Option<SqliteRepository>,
    pub catalog: JsonCatalog,
    pub images: FaceImages,
    pub defaults: BinderSettings,
}

impl AppState {
    pub fn new(
        repository: Option<SqliteRepository>,
        catalog: JsonCatalog,
        config: &ViewerConfig,
    ) -> Self {
        Self {
            repository,
            catalog,
            images: FaceImages::new(&config.card_back_url),
            defaults: config.defaults.clone(),
        }
    }

    pub fn load(&mut self, path: &Path) -> Result<LoadedBinder, LoadError> {
        let cache = self.repository.as_ref().map(|r| r as &dyn BinderCache);
        load_binder(path, &self.defaults, cache, &mut self.catalog, &mut self.images)
    }
}
