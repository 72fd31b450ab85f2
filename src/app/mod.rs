use crate::catalog::Catalog;
use crate::comments::Comments;
use crate::config::Configuration;
use crate::query::QueryEngine;
use crate::ratings::Ratings;
use crate::storage::{FileStorage, Storage};
use crate::watchlist::Watchlist;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Everything a front end needs, built explicitly and handed around by reference.
pub struct AppState {
    pub catalog: Catalog,
    pub watchlist: Watchlist,
    pub ratings: Ratings,
    pub comments: Comments,
}

impl AppState {
    pub fn new(catalog: Catalog, storage: Arc<dyn Storage>, author: String) -> Self {
        Self {
            watchlist: Watchlist::load(Arc::clone(&storage)),
            ratings: Ratings::load(Arc::clone(&storage)),
            comments: Comments::load(storage, author),
            catalog,
        }
    }

    /// Catalog from the configured file (or the bundled one) and file-backed user state.
    pub fn from_config(config: &Configuration) -> Result<Self> {
        let catalog = match config.catalog_path() {
            Some(path) => Catalog::from_file(path)?,
            None => Catalog::bundled()?,
        };

        let storage = FileStorage::new(config.storage_dir());
        info!(
            "Using {} titles, state in {}",
            catalog.len(),
            storage.dir().display()
        );

        Ok(Self::new(catalog, Arc::new(storage), config.comment_author()))
    }

    pub fn query(&self) -> QueryEngine<'_> {
        QueryEngine::new(&self.catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_watchlist_titles_resolve_through_query_engine() {
        let mut app = AppState::new(
            Catalog::bundled().unwrap(),
            Arc::new(MemoryStorage::new()),
            "You".to_string(),
        );
        app.watchlist.toggle(5);
        app.watchlist.toggle(2);
        app.watchlist.toggle(404);

        let saved: Vec<u32> = app
            .query()
            .titles_in(app.watchlist.ids())
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(saved, vec![2, 5]);
    }

    #[test]
    fn test_user_rating_does_not_change_catalog_rating() {
        let mut app = AppState::new(
            Catalog::bundled().unwrap(),
            Arc::new(MemoryStorage::new()),
            "You".to_string(),
        );
        let before = app.query().find_by_id(1).unwrap().rating;
        app.ratings.rate(1, 1);
        assert_eq!(app.query().find_by_id(1).unwrap().rating, before);
    }

    #[test]
    fn test_from_config_uses_storage_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = Configuration {
            storage: Some(StorageConfig {
                dir: Some(dir.path().to_path_buf()),
            }),
            ..Default::default()
        };

        let mut app = AppState::from_config(&config).unwrap();
        app.watchlist.toggle(3);
        assert!(dir.path().join("leetmovie-watchlist.json").exists());

        let reloaded = AppState::from_config(&config).unwrap();
        assert!(reloaded.watchlist.contains(3));
    }
}
