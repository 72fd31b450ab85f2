use crate::models::TitleId;
use crate::storage::{load_snapshot, save_snapshot, Storage, StorageKey};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub const STARS: RangeInclusive<u8> = 1..=5;

/// Personal star ratings. These never feed into a title's catalog rating.
pub struct Ratings {
    by_title: BTreeMap<TitleId, u8>,
    storage: Arc<dyn Storage>,
}

impl Ratings {
    #[instrument(skip(storage))]
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let mut by_title: BTreeMap<TitleId, u8> =
            load_snapshot(storage.as_ref(), StorageKey::Ratings);
        // cleared ratings may have been persisted as 0
        by_title.retain(|_, stars| STARS.contains(&*stars));

        info!("Loaded {} ratings", by_title.len());
        Self { by_title, storage }
    }

    pub fn save(&self) {
        save_snapshot(self.storage.as_ref(), StorageKey::Ratings, &self.by_title);
    }

    /// The user's rating for `id`, 0 when unrated.
    pub fn get(&self, id: TitleId) -> u8 {
        self.by_title.get(&id).copied().unwrap_or(0)
    }

    /// Rating the same value twice clears it. Out-of-range values are ignored.
    /// Returns the rating now stored.
    #[instrument(skip(self))]
    pub fn rate(&mut self, id: TitleId, stars: u8) -> u8 {
        if !STARS.contains(&stars) {
            warn!(id, stars, "Ignoring rating outside 1-5");
            return self.get(id);
        }

        let current = if self.get(id) == stars {
            self.by_title.remove(&id);
            debug!(id, "Rating cleared");
            0
        } else {
            self.by_title.insert(id, stars);
            debug!(id, stars, "Rating set");
            stars
        };

        self.save();
        current
    }

    pub fn iter(&self) -> impl Iterator<Item = (TitleId, u8)> + '_ {
        self.by_title.iter().map(|(&id, &stars)| (id, stars))
    }
}
