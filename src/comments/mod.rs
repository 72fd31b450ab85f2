//! Per-title comment threads with like/dislike votes.
//!
//! Threads are stored newest first. Each comment carries the current user's
//! vote, so the counts can be adjusted when a vote is withdrawn or switched.

use crate::models::{Comment, CommentId, CommentSort, TitleId, Vote};
use crate::storage::{load_snapshot, save_snapshot, Storage, StorageKey};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Largest id a millisecond timestamp can produce.
const MAX_TIME_ID: CommentId = i64::MAX as CommentId;

pub struct Comments {
    by_title: BTreeMap<TitleId, Vec<Comment>>,
    author: String,
    last_id: CommentId,
    storage: Arc<dyn Storage>,
}

impl Comments {
    #[instrument(skip(storage))]
    pub fn load(storage: Arc<dyn Storage>, author: String) -> Self {
        let mut by_title: BTreeMap<TitleId, Vec<Comment>> =
            load_snapshot(storage.as_ref(), StorageKey::Comments);
        by_title.retain(|_, thread| !thread.is_empty());

        let mut last_id = by_title
            .values()
            .flatten()
            .map(|c| c.id)
            .max()
            .unwrap_or(0);
        if last_id > MAX_TIME_ID {
            warn!(last_id, "Stored comment ids leave no headroom, renumbering");
            last_id = renumber(&mut by_title);
        }

        info!(
            "Loaded {} comments across {} titles",
            by_title.values().map(Vec::len).sum::<usize>(),
            by_title.len()
        );
        Self {
            by_title,
            author,
            last_id,
            storage,
        }
    }

    pub fn save(&self) {
        save_snapshot(self.storage.as_ref(), StorageKey::Comments, &self.by_title);
    }

    pub fn add(&mut self, title_id: TitleId, text: &str) -> Option<&Comment> {
        self.add_at(title_id, text, Utc::now())
    }

    /// Prepends a comment written at `now`. Blank text is ignored.
    #[instrument(skip(self, text))]
    pub fn add_at(&mut self, title_id: TitleId, text: &str, now: DateTime<Utc>) -> Option<&Comment> {
        let text = text.trim();
        if text.is_empty() {
            debug!("Ignoring empty comment");
            return None;
        }

        let id = self.next_id(now);
        let comment = Comment {
            id,
            text: text.to_string(),
            author: self.author.clone(),
            timestamp: now,
            likes: 0,
            dislikes: 0,
            user_vote: None,
        };

        self.by_title.entry(title_id).or_default().insert(0, comment);
        debug!(comment_id = id, "Comment added");
        self.save();
        self.by_title.get(&title_id).and_then(|thread| thread.first())
    }

    /// Casting the same vote twice withdraws it; switching moves the count.
    #[instrument(skip(self))]
    pub fn vote(&mut self, title_id: TitleId, comment_id: CommentId, kind: Vote) -> Option<&Comment> {
        let comment = self
            .by_title
            .get_mut(&title_id)?
            .iter_mut()
            .find(|c| c.id == comment_id)?;

        apply_vote(comment, kind);
        debug!(likes = comment.likes, dislikes = comment.dislikes, "Vote applied");

        self.save();
        self.get(title_id, comment_id)
    }

    pub fn get(&self, title_id: TitleId, comment_id: CommentId) -> Option<&Comment> {
        self.thread(title_id).iter().find(|c| c.id == comment_id)
    }

    /// Stored order, newest first.
    pub fn thread(&self, title_id: TitleId) -> &[Comment] {
        self.by_title.get(&title_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, title_id: TitleId) -> usize {
        self.thread(title_id).len()
    }

    pub fn sorted(&self, title_id: TitleId, mode: CommentSort) -> Vec<&Comment> {
        let mut view: Vec<&Comment> = self.thread(title_id).iter().collect();
        match mode {
            CommentSort::Newest => view.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
            CommentSort::Top => view.sort_by(|a, b| b.score().cmp(&a.score())),
        }
        view
    }

    fn next_id(&mut self, now: DateTime<Utc>) -> CommentId {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        self.last_id = millis.max(self.last_id.saturating_add(1));
        self.last_id
    }
}

/// Reassigns ids 1..=n in ascending order of the old ids. Returns n.
fn renumber(by_title: &mut BTreeMap<TitleId, Vec<Comment>>) -> CommentId {
    let mut all: Vec<&mut Comment> = by_title.values_mut().flatten().collect();
    all.sort_by_key(|c| c.id);
    let mut next = 0;
    for comment in all {
        next += 1;
        comment.id = next;
    }
    next
}

fn apply_vote(comment: &mut Comment, kind: Vote) {
    match comment.user_vote {
        Some(current) if current == kind => {
            decrement(comment, kind);
            comment.user_vote = None;
        }
        previous => {
            if let Some(opposite) = previous {
                decrement(comment, opposite);
            }
            match kind {
                Vote::Like => comment.likes += 1,
                Vote::Dislike => comment.dislikes += 1,
            }
            comment.user_vote = Some(kind);
        }
    }
}

fn decrement(comment: &mut Comment, kind: Vote) {
    let count = match kind {
        Vote::Like => &mut comment.likes,
        Vote::Dislike => &mut comment.dislikes,
    };
    *count = count.saturating_sub(1);
}

/// Short label for how long ago `timestamp` was.
pub fn relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - timestamp).num_seconds();
    if secs < 60 {
        "Just now".to_string()
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else if secs < 86400 {
        format!("{}h ago", secs / 3600)
    } else {
        timestamp.format("%Y-%m-%d").to_string()
    }
}
