use crate::infrastructure::storage::db::models::clipboard_item::{
    DbClipboardItem, NewClipboardItemRow,
};
use crate::infrastructure::storage::db::schema::clipboard_items;
use anyhow::{Context, Result};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

/// Insert one clipboard item row.
pub fn insert_item(conn: &mut SqliteConnection, row: &NewClipboardItemRow) -> Result<()> {
    diesel::insert_into(clipboard_items::table)
        .values(row)
        .execute(conn)
        .context("Failed to insert clipboard item")?;
    Ok(())
}

/// Most recent item owned by the user with the same content hash created
/// at or after `cutoff_ms`.
pub fn find_recent_duplicate(
    conn: &mut SqliteConnection,
    user_id: &str,
    content_hash: &str,
    cutoff_ms: i64,
) -> Result<Option<DbClipboardItem>> {
    let row = clipboard_items::table
        .filter(clipboard_items::user_id.eq(user_id))
        .filter(clipboard_items::content_hash.eq(content_hash))
        .filter(clipboard_items::created_at.ge(cutoff_ms))
        .order(clipboard_items::created_at.desc())
        .select(DbClipboardItem::as_select())
        .first(conn)
        .optional()
        .context("Failed to query for duplicate clipboard item")?;
    Ok(row)
}

/// All of a user's items, newest first.
pub fn list_newest_first(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<Vec<DbClipboardItem>> {
    let rows = clipboard_items::table
        .filter(clipboard_items::user_id.eq(user_id))
        .order(clipboard_items::created_at.desc())
        .select(DbClipboardItem::as_select())
        .load(conn)
        .context("Failed to list clipboard items")?;
    Ok(rows)
}

/// A page of the user's items, newest first.
pub fn page(
    conn: &mut SqliteConnection,
    user_id: &str,
    offset: i64,
    limit: i64,
) -> Result<Vec<DbClipboardItem>> {
    let rows = clipboard_items::table
        .filter(clipboard_items::user_id.eq(user_id))
        .order(clipboard_items::created_at.desc())
        .offset(offset)
        .limit(limit)
        .select(DbClipboardItem::as_select())
        .load(conn)
        .context("Failed to page clipboard items")?;
    Ok(rows)
}

/// The user's newest item.
pub fn latest(conn: &mut SqliteConnection, user_id: &str) -> Result<Option<DbClipboardItem>> {
    let row = clipboard_items::table
        .filter(clipboard_items::user_id.eq(user_id))
        .order(clipboard_items::created_at.desc())
        .select(DbClipboardItem::as_select())
        .first(conn)
        .optional()
        .context("Failed to get latest clipboard item")?;
    Ok(row)
}

/// Item count for a user.
pub fn count_for_user(conn: &mut SqliteConnection, user_id: &str) -> Result<i64> {
    let count = clipboard_items::table
        .filter(clipboard_items::user_id.eq(user_id))
        .count()
        .get_result(conn)
        .context("Failed to count clipboard items")?;
    Ok(count)
}

/// Delete the given item ids. Unknown ids are skipped.
pub fn delete_many(conn: &mut SqliteConnection, ids: &[String]) -> Result<usize> {
    let count = diesel::delete(clipboard_items::table.filter(clipboard_items::id.eq_any(ids)))
        .execute(conn)
        .context("Failed to delete clipboard items")?;
    Ok(count)
}

/// Delete one item owned by the user. Returns the number of rows removed.
pub fn delete_one(conn: &mut SqliteConnection, user_id: &str, item_id: &str) -> Result<usize> {
    let count = diesel::delete(
        clipboard_items::table
            .filter(clipboard_items::id.eq(item_id))
            .filter(clipboard_items::user_id.eq(user_id)),
    )
    .execute(conn)
    .context("Failed to delete clipboard item")?;
    Ok(count)
}

/// Delete all of a user's items.
pub fn clear_for_user(conn: &mut SqliteConnection, user_id: &str) -> Result<usize> {
    let count = diesel::delete(clipboard_items::table.filter(clipboard_items::user_id.eq(user_id)))
        .execute(conn)
        .context("Failed to clear clipboard items")?;
    Ok(count)
}
