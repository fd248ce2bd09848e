use crate::infrastructure::storage::db::models::device::{DbDevice, NewDeviceRow};
use crate::infrastructure::storage::db::schema::devices;
use anyhow::{Context, Result};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

/// Insert one device row.
pub fn insert_device(conn: &mut SqliteConnection, row: &NewDeviceRow) -> Result<()> {
    diesel::insert_into(devices::table)
        .values(row)
        .execute(conn)
        .context("Failed to insert device")?;
    Ok(())
}

/// Look a device up by its per-user fingerprint.
pub fn find_by_fingerprint(
    conn: &mut SqliteConnection,
    user_id: &str,
    fingerprint: &str,
) -> Result<Option<DbDevice>> {
    let row = devices::table
        .filter(devices::user_id.eq(user_id))
        .filter(devices::fingerprint.eq(fingerprint))
        .select(DbDevice::as_select())
        .first(conn)
        .optional()
        .context("Failed to query device by fingerprint")?;
    Ok(row)
}

/// All of a user's devices, most recently seen first.
pub fn list_for_user(conn: &mut SqliteConnection, user_id: &str) -> Result<Vec<DbDevice>> {
    let rows = devices::table
        .filter(devices::user_id.eq(user_id))
        .order(devices::last_seen.desc())
        .select(DbDevice::as_select())
        .load(conn)
        .context("Failed to list devices")?;
    Ok(rows)
}

/// One device owned by the user.
pub fn get_for_user(
    conn: &mut SqliteConnection,
    user_id: &str,
    device_id: &str,
) -> Result<Option<DbDevice>> {
    let row = devices::table
        .filter(devices::id.eq(device_id))
        .filter(devices::user_id.eq(user_id))
        .select(DbDevice::as_select())
        .first(conn)
        .optional()
        .context("Failed to get device")?;
    Ok(row)
}

/// Reactivate an existing device, refreshing its name and last-seen.
pub fn reactivate(
    conn: &mut SqliteConnection,
    user_id: &str,
    device_id: &str,
    device_name: &str,
    last_seen_ms: i64,
) -> Result<usize> {
    let count = diesel::update(
        devices::table
            .filter(devices::id.eq(device_id))
            .filter(devices::user_id.eq(user_id)),
    )
    .set((
        devices::is_active.eq(true),
        devices::device_name.eq(device_name),
        devices::last_seen.eq(last_seen_ms),
    ))
    .execute(conn)
    .context("Failed to reactivate device")?;
    Ok(count)
}

/// Soft-delete a device.
pub fn deactivate(conn: &mut SqliteConnection, user_id: &str, device_id: &str) -> Result<usize> {
    let count = diesel::update(
        devices::table
            .filter(devices::id.eq(device_id))
            .filter(devices::user_id.eq(user_id)),
    )
    .set(devices::is_active.eq(false))
    .execute(conn)
    .context("Failed to deactivate device")?;
    Ok(count)
}

/// Bump a device's last-seen timestamp.
pub fn touch_last_seen(
    conn: &mut SqliteConnection,
    user_id: &str,
    device_id: &str,
    last_seen_ms: i64,
) -> Result<usize> {
    let count = diesel::update(
        devices::table
            .filter(devices::id.eq(device_id))
            .filter(devices::user_id.eq(user_id)),
    )
    .set(devices::last_seen.eq(last_seen_ms))
    .execute(conn)
    .context("Failed to update device last_seen")?;
    Ok(count)
}
