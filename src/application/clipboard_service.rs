use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use super::policy::{DeduplicationPolicy, RetentionPolicy};
use crate::config::Setting;
use crate::domain::{ClipboardItem, DeviceIdentity, NewClipboardItem};
use crate::error::{AppError, Result};
use crate::infrastructure::connection::ConnectionRegistry;
use crate::interface::ItemStore;
use crate::message::ServerMessage;

/// Ingestion parameters, injected rather than read from ambient state so
/// tests can run several differently-tuned pipelines side by side.
#[derive(Debug, Clone)]
pub struct IngestionLimits {
    pub max_content_size: i64,
    pub dedup_window: Duration,
    pub retention_cap: usize,
}

impl From<&Setting> for IngestionLimits {
    fn from(setting: &Setting) -> Self {
        Self {
            max_content_size: setting.sync.max_content_size,
            dedup_window: setting.dedup_window(),
            retention_cap: setting.storage.max_items_per_user as usize,
        }
    }
}

/// Result of an accepted write.
#[derive(Debug)]
pub struct SubmitOutcome {
    pub item: ClipboardItem,
    /// True when the write collapsed onto an already-stored item.
    pub deduplicated: bool,
}

/// The ingestion pipeline and the read side of clipboard history.
///
/// `submit` is the only path that triggers a broadcast, and the broadcast
/// always carries the row exactly as persisted.
pub struct ClipboardService {
    store: Arc<dyn ItemStore>,
    registry: Arc<ConnectionRegistry>,
    dedup: DeduplicationPolicy,
    retention: RetentionPolicy,
    max_content_size: i64,
}

impl ClipboardService {
    pub fn new(
        store: Arc<dyn ItemStore>,
        registry: Arc<ConnectionRegistry>,
        limits: IngestionLimits,
    ) -> Self {
        Self {
            store,
            registry,
            dedup: DeduplicationPolicy::new(limits.dedup_window),
            retention: RetentionPolicy::new(limits.retention_cap),
            max_content_size: limits.max_content_size,
        }
    }

    /// Accept one clipboard write from `identity`'s device.
    ///
    /// validate -> dedup-check -> persist -> retention-trim -> broadcast.
    /// A duplicate is an idempotent success returning the prior item and
    /// skipping persistence and broadcast. Retention failures are logged,
    /// not propagated: the write has already committed. Broadcast is
    /// fire-and-forget relative to the caller.
    pub async fn submit(
        &self,
        identity: &DeviceIdentity,
        candidate: NewClipboardItem,
    ) -> Result<SubmitOutcome> {
        if candidate.content_size > self.max_content_size {
            return Err(AppError::size_limit(format!(
                "content size {} exceeds maximum allowed ({} bytes)",
                candidate.content_size, self.max_content_size
            )));
        }

        if let Some(existing) = self
            .dedup
            .find_duplicate(&*self.store, identity.user_id, &candidate.content_hash)
            .await?
        {
            debug!(
                "duplicate write collapsed: user={} item={}",
                identity.user_id, existing.id
            );
            return Ok(SubmitOutcome {
                item: existing,
                deduplicated: true,
            });
        }

        let item = self.store.insert(candidate).await?;

        if let Err(e) = self.retention.trim(&*self.store, identity.user_id).await {
            warn!(
                "retention trim failed for user {}: {}",
                identity.user_id, e
            );
        }

        self.registry
            .broadcast(
                identity.user_id,
                ServerMessage::clipboard_update(&item),
                Some(identity.device_id),
            )
            .await;

        Ok(SubmitOutcome {
            item,
            deduplicated: false,
        })
    }

    /// The user's newest item.
    pub async fn latest(&self, user_id: Uuid) -> Result<ClipboardItem> {
        self.store
            .latest(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("No clipboard items found"))
    }

    /// One page of history, newest first, plus the total count.
    pub async fn history(
        &self,
        user_id: Uuid,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<ClipboardItem>, i64)> {
        let offset = (page - 1) * page_size;
        let total = self.store.count(user_id).await?;
        let items = self.store.page(user_id, offset, page_size).await?;
        Ok((items, total))
    }

    pub async fn delete_item(&self, user_id: Uuid, item_id: Uuid) -> Result<()> {
        if self.store.delete_one(user_id, item_id).await? {
            Ok(())
        } else {
            Err(AppError::not_found("Clipboard item not found"))
        }
    }

    pub async fn clear(&self, user_id: Uuid) -> Result<usize> {
        self.store.clear(user_id).await
    }
}
