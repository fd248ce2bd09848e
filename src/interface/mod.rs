//! Seams between the sync core and its collaborators.
//!
//! The core consumes these traits only; concrete implementations live in
//! `infrastructure` (SQLite, HMAC tokens) and in test fixtures.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;

use crate::domain::{AccessClaims, ClipboardItem, Device, NewClipboardItem};
use crate::error::Result;

/// Durable storage of clipboard items.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Persist a candidate, assigning id and timestamp. Returns exactly
    /// the stored row.
    async fn insert(&self, item: NewClipboardItem) -> Result<ClipboardItem>;

    /// An item owned by `user_id` with the same hash created within the
    /// trailing `window`, if any.
    async fn find_recent_duplicate(
        &self,
        user_id: Uuid,
        content_hash: &str,
        window: Duration,
    ) -> Result<Option<ClipboardItem>>;

    /// All of a user's items, newest first.
    async fn list_newest_first(&self, user_id: Uuid) -> Result<Vec<ClipboardItem>>;

    /// Delete the given items. Unknown ids are skipped, not errors.
    async fn delete_many(&self, ids: &[Uuid]) -> Result<usize>;

    /// The user's most recent item.
    async fn latest(&self, user_id: Uuid) -> Result<Option<ClipboardItem>>;

    /// A page of the user's items, newest first.
    async fn page(&self, user_id: Uuid, offset: i64, limit: i64) -> Result<Vec<ClipboardItem>>;

    /// Total number of items the user owns.
    async fn count(&self, user_id: Uuid) -> Result<i64>;

    /// Delete one item if it exists and is owned by the user.
    async fn delete_one(&self, user_id: Uuid, item_id: Uuid) -> Result<bool>;

    /// Delete all of the user's items.
    async fn clear(&self, user_id: Uuid) -> Result<usize>;
}

/// Durable storage of registered devices.
#[async_trait]
pub trait DeviceStore: Send + Sync {
    async fn find_by_fingerprint(&self, user_id: Uuid, fingerprint: &str)
        -> Result<Option<Device>>;

    async fn insert(&self, device: Device) -> Result<Device>;

    /// Flip an existing row back to active, updating name and last-seen.
    async fn reactivate(
        &self,
        user_id: Uuid,
        device_id: Uuid,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<Device>;

    /// All of a user's devices, most recently seen first.
    async fn list(&self, user_id: Uuid) -> Result<Vec<Device>>;

    async fn get(&self, user_id: Uuid, device_id: Uuid) -> Result<Option<Device>>;

    /// Soft delete. Returns false when the device does not exist.
    async fn deactivate(&self, user_id: Uuid, device_id: Uuid) -> Result<bool>;

    /// Bump last-seen. Returns false when the device does not exist.
    async fn touch(&self, user_id: Uuid, device_id: Uuid, now: DateTime<Utc>) -> Result<bool>;
}

/// Bearer-token verification and issuance.
///
/// Decoding yields the verified identity every connection and write
/// requires. Issuance exists for device registration only; user
/// credentials come from outside this service.
pub trait AccessTokenCodec: Send + Sync {
    fn decode(&self, token: &str) -> Result<AccessClaims>;

    fn issue(&self, user_id: Uuid, device_id: Option<Uuid>) -> Result<String>;
}
