use diesel::prelude::*;
use uuid::Uuid;

use super::{from_millis, millis};
use crate::domain::Device;
use crate::error::AppError;

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::infrastructure::storage::db::schema::devices)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DbDevice {
    pub id: String,
    pub user_id: String,
    pub device_name: String,
    pub device_class: String,
    pub fingerprint: String,
    pub is_active: bool,
    pub last_seen: i64,
    pub created_at: i64,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::infrastructure::storage::db::schema::devices)]
pub struct NewDeviceRow {
    pub id: String,
    pub user_id: String,
    pub device_name: String,
    pub device_class: String,
    pub fingerprint: String,
    pub is_active: bool,
    pub last_seen: i64,
    pub created_at: i64,
}

impl From<&Device> for NewDeviceRow {
    fn from(device: &Device) -> Self {
        Self {
            id: device.id.to_string(),
            user_id: device.user_id.to_string(),
            device_name: device.name.clone(),
            device_class: device.device_class.clone(),
            fingerprint: device.fingerprint.clone(),
            is_active: device.is_active,
            last_seen: millis(device.last_seen),
            created_at: millis(device.created_at),
        }
    }
}

impl TryFrom<DbDevice> for Device {
    type Error = AppError;

    fn try_from(row: DbDevice) -> Result<Self, Self::Error> {
        Ok(Device {
            id: parse_uuid(&row.id)?,
            user_id: parse_uuid(&row.user_id)?,
            name: row.device_name,
            device_class: row.device_class,
            fingerprint: row.fingerprint,
            is_active: row.is_active,
            last_seen: from_millis(row.last_seen)
                .ok_or_else(|| AppError::storage("invalid last_seen timestamp"))?,
            created_at: from_millis(row.created_at)
                .ok_or_else(|| AppError::storage("invalid created_at timestamp"))?,
        })
    }
}

fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(s).map_err(|e| AppError::storage(format!("invalid uuid in database: {}", e)))
}
