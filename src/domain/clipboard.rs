use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::content_type::ContentType;

/// Image-specific metadata carried alongside image items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMeta {
    pub format: String,
    pub width: i32,
    pub height: i32,
}

/// A stored clipboard item.
///
/// The content is an opaque ciphertext blob encrypted by the client; the
/// server never decrypts it. `content_hash` exists only to collapse
/// duplicate writes. `created_at` is the sole per-user ordering key.
/// Items are immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipboardItem {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Origin device; None once the device row has been deleted.
    pub device_id: Option<Uuid>,
    pub encrypted_content: String,
    pub iv: String,
    pub content_hash: String,
    pub content_type: ContentType,
    pub content_size: i64,
    pub image: Option<ImageMeta>,
    pub created_at: DateTime<Utc>,
}

/// A candidate item as accepted by the ingestion pipeline, before the
/// server assigns its id and timestamp.
#[derive(Debug, Clone)]
pub struct NewClipboardItem {
    pub user_id: Uuid,
    pub device_id: Option<Uuid>,
    pub encrypted_content: String,
    pub iv: String,
    pub content_hash: String,
    pub content_type: ContentType,
    pub content_size: i64,
    pub image: Option<ImageMeta>,
}

impl NewClipboardItem {
    /// Materialize the candidate into a full item with a fresh id and
    /// timestamp. Storage backends call this at insert time so the row
    /// and the value returned to the pipeline are the same.
    pub fn into_item(self, now: DateTime<Utc>) -> ClipboardItem {
        ClipboardItem {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            device_id: self.device_id,
            encrypted_content: self.encrypted_content,
            iv: self.iv,
            content_hash: self.content_hash,
            content_type: self.content_type,
            content_size: self.content_size,
            image: self.image,
            created_at: now,
        }
    }
}
