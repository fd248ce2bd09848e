use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// A registered device.
///
/// Devices are soft-deleted: `is_active` flips to false on unregistration
/// and the row stays so old items keep their origin attribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    /// Device class as reported by the client ("web", "mobile",
    /// "desktop", ...). Open string, not validated beyond non-emptiness.
    pub device_class: String,
    /// Deterministic digest of the client-supplied metadata; unique per
    /// user. A registration that collides reactivates the existing row.
    pub fingerprint: String,
    pub is_active: bool,
    pub last_seen: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Device {
    pub fn new(user_id: Uuid, name: String, device_class: String, fingerprint: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            device_class,
            fingerprint,
            is_active: true,
            last_seen: now,
            created_at: now,
        }
    }
}

/// Client-supplied metadata used for fingerprint derivation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceMetadata {
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub platform: String,
    /// Client-chosen stable identifier, if it has one.
    #[serde(default)]
    pub client_id: String,
}

impl DeviceMetadata {
    /// SHA-256 hex digest over the metadata fields. Deterministic: the
    /// same client metadata always maps to the same fingerprint, which is
    /// what makes re-registration collide instead of duplicating.
    pub fn fingerprint(&self) -> String {
        let joined = format!("{}-{}-{}", self.user_agent, self.platform, self.client_id);
        let digest = Sha256::digest(joined.as_bytes());
        hex::encode(digest)
    }
}
