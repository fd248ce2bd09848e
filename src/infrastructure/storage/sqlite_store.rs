//! SQLite-backed implementations of the storage seams.
//!
//! Thin adapters: each trait method checks a connection out of the pool,
//! runs one bounded DAO call, and converts rows into domain values. No
//! transaction spans more than one call, so the ingestion pipeline never
//! holds storage state open across a broadcast.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;

use super::db::dao;
use super::db::models::clipboard_item::NewClipboardItemRow;
use super::db::models::device::NewDeviceRow;
use super::db::models::millis;
use super::db::pool::DbPool;
use crate::domain::{ClipboardItem, Device, NewClipboardItem};
use crate::error::{AppError, Result};
use crate::interface::{DeviceStore, ItemStore};

#[derive(Clone)]
pub struct SqliteItemStore {
    pool: DbPool,
}

impl SqliteItemStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<diesel::SqliteConnection>>> {
        self.pool.get().map_err(AppError::from)
    }
}

fn storage_err(err: anyhow::Error) -> AppError {
    AppError::storage(err.to_string())
}

#[async_trait]
impl ItemStore for SqliteItemStore {
    async fn insert(&self, item: NewClipboardItem) -> Result<ClipboardItem> {
        let mut conn = self.conn()?;
        let stored = item.into_item(Utc::now());
        dao::clipboard_item::insert_item(&mut conn, &NewClipboardItemRow::from(&stored))
            .map_err(storage_err)?;
        Ok(stored)
    }

    async fn find_recent_duplicate(
        &self,
        user_id: Uuid,
        content_hash: &str,
        window: Duration,
    ) -> Result<Option<ClipboardItem>> {
        let mut conn = self.conn()?;
        let cutoff_ms = millis(Utc::now()) - window.as_millis() as i64;
        let row = dao::clipboard_item::find_recent_duplicate(
            &mut conn,
            &user_id.to_string(),
            content_hash,
            cutoff_ms,
        )
        .map_err(storage_err)?;
        row.map(ClipboardItem::try_from).transpose()
    }

    async fn list_newest_first(&self, user_id: Uuid) -> Result<Vec<ClipboardItem>> {
        let mut conn = self.conn()?;
        let rows = dao::clipboard_item::list_newest_first(&mut conn, &user_id.to_string())
            .map_err(storage_err)?;
        rows.into_iter().map(ClipboardItem::try_from).collect()
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn()?;
        let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        dao::clipboard_item::delete_many(&mut conn, &ids).map_err(storage_err)
    }

    async fn latest(&self, user_id: Uuid) -> Result<Option<ClipboardItem>> {
        let mut conn = self.conn()?;
        let row =
            dao::clipboard_item::latest(&mut conn, &user_id.to_string()).map_err(storage_err)?;
        row.map(ClipboardItem::try_from).transpose()
    }

    async fn page(&self, user_id: Uuid, offset: i64, limit: i64) -> Result<Vec<ClipboardItem>> {
        let mut conn = self.conn()?;
        let rows = dao::clipboard_item::page(&mut conn, &user_id.to_string(), offset, limit)
            .map_err(storage_err)?;
        rows.into_iter().map(ClipboardItem::try_from).collect()
    }

    async fn count(&self, user_id: Uuid) -> Result<i64> {
        let mut conn = self.conn()?;
        dao::clipboard_item::count_for_user(&mut conn, &user_id.to_string()).map_err(storage_err)
    }

    async fn delete_one(&self, user_id: Uuid, item_id: Uuid) -> Result<bool> {
        let mut conn = self.conn()?;
        let removed = dao::clipboard_item::delete_one(
            &mut conn,
            &user_id.to_string(),
            &item_id.to_string(),
        )
        .map_err(storage_err)?;
        Ok(removed > 0)
    }

    async fn clear(&self, user_id: Uuid) -> Result<usize> {
        let mut conn = self.conn()?;
        dao::clipboard_item::clear_for_user(&mut conn, &user_id.to_string()).map_err(storage_err)
    }
}

#[derive(Clone)]
pub struct SqliteDeviceStore {
    pool: DbPool,
}

impl SqliteDeviceStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<diesel::SqliteConnection>>> {
        self.pool.get().map_err(AppError::from)
    }
}

#[async_trait]
impl DeviceStore for SqliteDeviceStore {
    async fn find_by_fingerprint(
        &self,
        user_id: Uuid,
        fingerprint: &str,
    ) -> Result<Option<Device>> {
        let mut conn = self.conn()?;
        let row = dao::device::find_by_fingerprint(&mut conn, &user_id.to_string(), fingerprint)
            .map_err(storage_err)?;
        row.map(Device::try_from).transpose()
    }

    async fn insert(&self, device: Device) -> Result<Device> {
        let mut conn = self.conn()?;
        dao::device::insert_device(&mut conn, &NewDeviceRow::from(&device))
            .map_err(storage_err)?;
        Ok(device)
    }

    async fn reactivate(
        &self,
        user_id: Uuid,
        device_id: Uuid,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<Device> {
        let mut conn = self.conn()?;
        let updated = dao::device::reactivate(
            &mut conn,
            &user_id.to_string(),
            &device_id.to_string(),
            name,
            millis(now),
        )
        .map_err(storage_err)?;
        if updated == 0 {
            return Err(AppError::not_found("Device not found"));
        }
        let row = dao::device::get_for_user(&mut conn, &user_id.to_string(), &device_id.to_string())
            .map_err(storage_err)?
            .ok_or_else(|| AppError::not_found("Device not found"))?;
        Device::try_from(row)
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<Device>> {
        let mut conn = self.conn()?;
        let rows =
            dao::device::list_for_user(&mut conn, &user_id.to_string()).map_err(storage_err)?;
        rows.into_iter().map(Device::try_from).collect()
    }

    async fn get(&self, user_id: Uuid, device_id: Uuid) -> Result<Option<Device>> {
        let mut conn = self.conn()?;
        let row = dao::device::get_for_user(&mut conn, &user_id.to_string(), &device_id.to_string())
            .map_err(storage_err)?;
        row.map(Device::try_from).transpose()
    }

    async fn deactivate(&self, user_id: Uuid, device_id: Uuid) -> Result<bool> {
        let mut conn = self.conn()?;
        let updated =
            dao::device::deactivate(&mut conn, &user_id.to_string(), &device_id.to_string())
                .map_err(storage_err)?;
        Ok(updated > 0)
    }

    async fn touch(&self, user_id: Uuid, device_id: Uuid, now: DateTime<Utc>) -> Result<bool> {
        let mut conn = self.conn()?;
        let updated = dao::device::touch_last_seen(
            &mut conn,
            &user_id.to_string(),
            &device_id.to_string(),
            millis(now),
        )
        .map_err(storage_err)?;
        Ok(updated > 0)
    }
}
