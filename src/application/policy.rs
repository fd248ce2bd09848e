//! Write-path policies: duplicate collapse and history retention.
//!
//! Both run synchronously inside the ingestion pipeline, because the
//! broadcast that follows must reflect exactly what was persisted.

use std::time::Duration;
use uuid::Uuid;

use crate::domain::ClipboardItem;
use crate::error::Result;
use crate::interface::ItemStore;

/// Collapses rapid repeated writes of identical content.
///
/// Polling clients re-submit whatever is on the clipboard; without this,
/// every broadcast would echo back as a fresh write from each receiver.
/// Identical hashes within the trailing window map to the already-stored
/// item instead of a new row.
pub struct DeduplicationPolicy {
    window: Duration,
}

impl DeduplicationPolicy {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// The stored item this candidate duplicates, if any.
    pub async fn find_duplicate(
        &self,
        store: &dyn ItemStore,
        user_id: Uuid,
        content_hash: &str,
    ) -> Result<Option<ClipboardItem>> {
        store
            .find_recent_duplicate(user_id, content_hash, self.window)
            .await
    }
}

/// Caps each user's history, evicting the oldest excess.
///
/// Runs after the triggering insert has committed, so with cap >= 1 the
/// just-inserted item is never the one evicted. Eviction is silent: no
/// broadcast, no caller-visible effect.
pub struct RetentionPolicy {
    cap: usize,
}

impl RetentionPolicy {
    pub fn new(cap: usize) -> Self {
        Self { cap }
    }

    /// Trim the user's history down to the cap. Returns how many items
    /// were evicted.
    pub async fn trim(&self, store: &dyn ItemStore, user_id: Uuid) -> Result<usize> {
        let items = store.list_newest_first(user_id).await?;
        if items.len() <= self.cap {
            return Ok(0);
        }
        let excess: Vec<Uuid> = items[self.cap..].iter().map(|item| item.id).collect();
        store.delete_many(&excess).await
    }
}
