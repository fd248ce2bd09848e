use diesel::prelude::*;
use uuid::Uuid;

use super::{from_millis, millis};
use crate::domain::{ClipboardItem, ContentType, ImageMeta};
use crate::error::AppError;

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::infrastructure::storage::db::schema::clipboard_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DbClipboardItem {
    pub id: String,
    pub user_id: String,
    pub device_id: Option<String>,
    pub encrypted_content: String,
    pub iv: String,
    pub content_hash: String,
    pub content_type: String,
    pub content_size: i64,
    pub image_format: Option<String>,
    pub image_width: Option<i32>,
    pub image_height: Option<i32>,
    pub created_at: i64,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::infrastructure::storage::db::schema::clipboard_items)]
pub struct NewClipboardItemRow {
    pub id: String,
    pub user_id: String,
    pub device_id: Option<String>,
    pub encrypted_content: String,
    pub iv: String,
    pub content_hash: String,
    pub content_type: String,
    pub content_size: i64,
    pub image_format: Option<String>,
    pub image_width: Option<i32>,
    pub image_height: Option<i32>,
    pub created_at: i64,
}

impl From<&ClipboardItem> for NewClipboardItemRow {
    fn from(item: &ClipboardItem) -> Self {
        Self {
            id: item.id.to_string(),
            user_id: item.user_id.to_string(),
            device_id: item.device_id.map(|id| id.to_string()),
            encrypted_content: item.encrypted_content.clone(),
            iv: item.iv.clone(),
            content_hash: item.content_hash.clone(),
            content_type: item.content_type.to_string(),
            content_size: item.content_size,
            image_format: item.image.as_ref().map(|meta| meta.format.clone()),
            image_width: item.image.as_ref().map(|meta| meta.width),
            image_height: item.image.as_ref().map(|meta| meta.height),
            created_at: millis(item.created_at),
        }
    }
}

impl TryFrom<DbClipboardItem> for ClipboardItem {
    type Error = AppError;

    fn try_from(row: DbClipboardItem) -> Result<Self, Self::Error> {
        let image = match (row.image_format, row.image_width, row.image_height) {
            (Some(format), Some(width), Some(height)) => Some(ImageMeta {
                format,
                width,
                height,
            }),
            _ => None,
        };
        Ok(ClipboardItem {
            id: parse_uuid(&row.id)?,
            user_id: parse_uuid(&row.user_id)?,
            device_id: row.device_id.as_deref().map(parse_uuid).transpose()?,
            encrypted_content: row.encrypted_content,
            iv: row.iv,
            content_hash: row.content_hash,
            content_type: ContentType::try_from(row.content_type.as_str())
                .map_err(AppError::storage)?,
            content_size: row.content_size,
            image,
            created_at: from_millis(row.created_at)
                .ok_or_else(|| AppError::storage("invalid created_at timestamp"))?,
        })
    }
}

fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(s).map_err(|e| AppError::storage(format!("invalid uuid in database: {}", e)))
}
