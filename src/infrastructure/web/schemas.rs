//! Request/response DTOs for the REST surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    ClipboardItem, ContentType, Device, DeviceIdentity, DeviceMetadata, ImageMeta,
    NewClipboardItem,
};
use crate::error::{AppError, Result};

#[derive(Debug, Deserialize)]
pub struct ClipboardItemCreate {
    pub encrypted_content: String,
    pub iv: String,
    pub content_hash: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    pub content_size: i64,
    pub image_format: Option<String>,
    pub image_width: Option<i32>,
    pub image_height: Option<i32>,
}

fn default_content_type() -> String {
    "text".to_string()
}

impl ClipboardItemCreate {
    /// Validate the request and bind it to the submitting identity.
    /// All checks run before any persistence.
    pub fn into_candidate(self, identity: &DeviceIdentity) -> Result<NewClipboardItem> {
        if self.encrypted_content.is_empty() {
            return Err(AppError::validation("encrypted_content must not be empty"));
        }
        if self.iv.is_empty() {
            return Err(AppError::validation("iv must not be empty"));
        }
        if self.content_hash.len() != 64 {
            return Err(AppError::validation(
                "content_hash must be a 64-character digest",
            ));
        }
        if self.content_size <= 0 {
            return Err(AppError::validation("content_size must be positive"));
        }
        let content_type =
            ContentType::try_from(self.content_type.as_str()).map_err(AppError::validation)?;

        let image = match (self.image_format, self.image_width, self.image_height) {
            (Some(format), Some(width), Some(height)) => Some(ImageMeta {
                format,
                width,
                height,
            }),
            _ => None,
        };

        Ok(NewClipboardItem {
            user_id: identity.user_id,
            device_id: Some(identity.device_id),
            encrypted_content: self.encrypted_content,
            iv: self.iv,
            content_hash: self.content_hash,
            content_type,
            content_size: self.content_size,
            image,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClipboardItemResponse {
    pub id: Uuid,
    pub encrypted_content: String,
    pub iv: String,
    pub content_hash: String,
    pub content_type: String,
    pub content_size: i64,
    pub device_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub image_format: Option<String>,
    pub image_width: Option<i32>,
    pub image_height: Option<i32>,
}

impl From<&ClipboardItem> for ClipboardItemResponse {
    fn from(item: &ClipboardItem) -> Self {
        Self {
            id: item.id,
            encrypted_content: item.encrypted_content.clone(),
            iv: item.iv.clone(),
            content_hash: item.content_hash.clone(),
            content_type: item.content_type.to_string(),
            content_size: item.content_size,
            device_id: item.device_id,
            created_at: item.created_at,
            image_format: item.image.as_ref().map(|meta| meta.format.clone()),
            image_width: item.image.as_ref().map(|meta| meta.width),
            image_height: item.image.as_ref().map(|meta| meta.height),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClipboardHistoryResponse {
    pub items: Vec<ClipboardItemResponse>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    20
}

impl HistoryQuery {
    /// Clamp to sane bounds instead of rejecting.
    pub fn normalized(&self) -> (i64, i64) {
        (self.page.max(1), self.page_size.clamp(1, 100))
    }
}

#[derive(Debug, Deserialize)]
pub struct DeviceRegister {
    pub device_name: String,
    pub device_class: String,
    #[serde(default)]
    pub device_info: DeviceMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user_id: Uuid,
    pub device_id: Option<Uuid>,
}

impl TokenResponse {
    pub fn bearer(access_token: String, user_id: Uuid, device_id: Option<Uuid>) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            user_id,
            device_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeviceResponse {
    pub id: Uuid,
    pub device_name: String,
    pub device_class: String,
    pub fingerprint: String,
    pub is_active: bool,
    pub last_seen: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<&Device> for DeviceResponse {
    fn from(device: &Device) -> Self {
        Self {
            id: device.id,
            device_name: device.name.clone(),
            device_class: device.device_class.clone(),
            fingerprint: device.fingerprint.clone(),
            is_active: device.is_active,
            last_seen: device.last_seen,
            created_at: device.created_at,
        }
    }
}

/// Query parameters on the websocket upgrade request. The credential
/// travels here because browsers cannot set headers on upgrades.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> DeviceIdentity {
        DeviceIdentity {
            user_id: Uuid::new_v4(),
            device_id: Uuid::new_v4(),
        }
    }

    fn valid_create() -> ClipboardItemCreate {
        ClipboardItemCreate {
            encrypted_content: "cipher".into(),
            iv: "iv".into(),
            content_hash: "0".repeat(64),
            content_type: "text".into(),
            content_size: 6,
            image_format: None,
            image_width: None,
            image_height: None,
        }
    }

    #[test]
    fn test_valid_candidate_binds_identity() {
        let identity = identity();
        let candidate = valid_create().into_candidate(&identity).unwrap();
        assert_eq!(candidate.user_id, identity.user_id);
        assert_eq!(candidate.device_id, Some(identity.device_id));
        assert_eq!(candidate.content_type, ContentType::Text);
    }

    #[test]
    fn test_bad_hash_rejected() {
        let mut create = valid_create();
        create.content_hash = "short".into();
        assert!(matches!(
            create.into_candidate(&identity()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_content_type_rejected() {
        let mut create = valid_create();
        create.content_type = "video".into();
        assert!(create.into_candidate(&identity()).is_err());
    }

    #[test]
    fn test_image_meta_assembled() {
        let mut create = valid_create();
        create.content_type = "image".into();
        create.image_format = Some("png".into());
        create.image_width = Some(640);
        create.image_height = Some(480);
        let candidate = create.into_candidate(&identity()).unwrap();
        let image = candidate.image.unwrap();
        assert_eq!(image.format, "png");
        assert_eq!((image.width, image.height), (640, 480));
    }

    #[test]
    fn test_history_query_clamped() {
        let query = HistoryQuery {
            page: 0,
            page_size: 5000,
        };
        assert_eq!(query.normalized(), (1, 100));
    }
}
