use crate::models::TitleId;
use crate::storage::{load_snapshot, save_snapshot, Storage, StorageKey};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Saved title ids in the order they were added.
pub struct Watchlist {
    ids: Vec<TitleId>,
    storage: Arc<dyn Storage>,
}

impl Watchlist {
    #[instrument(skip(storage))]
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let mut ids: Vec<TitleId> = load_snapshot(storage.as_ref(), StorageKey::Watchlist);
        let before = ids.len();
        let mut seen = HashSet::new();
        ids.retain(|id| seen.insert(*id));
        if ids.len() != before {
            debug!(dropped = before - ids.len(), "Dropped duplicate watchlist entries");
        }

        info!("Loaded watchlist with {} titles", ids.len());
        Self { ids, storage }
    }

    pub fn save(&self) {
        save_snapshot(self.storage.as_ref(), StorageKey::Watchlist, &self.ids);
    }

    pub fn contains(&self, id: TitleId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &[TitleId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Adds `id` if absent, removes it otherwise. Returns the new membership.
    #[instrument(skip(self))]
    pub fn toggle(&mut self, id: TitleId) -> bool {
        if self.contains(id) {
            self.remove(id);
            false
        } else {
            self.add(id);
            true
        }
    }

    pub fn add(&mut self, id: TitleId) {
        if self.contains(id) {
            return;
        }
        self.ids.push(id);
        debug!(id, "Added to watchlist");
        self.save();
    }

    pub fn remove(&mut self, id: TitleId) {
        let before = self.ids.len();
        self.ids.retain(|&existing| existing != id);
        if self.ids.len() != before {
            debug!(id, "Removed from watchlist");
            self.save();
        }
    }
}
