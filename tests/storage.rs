//! SQLite store round-trips on a throwaway database file.

use chrono::Utc;
use std::time::Duration;
use uuid::Uuid;

use clipsync_server::domain::{ContentType, Device, DeviceMetadata, ImageMeta, NewClipboardItem};
use clipsync_server::infrastructure::storage::db::dao;
use clipsync_server::infrastructure::storage::db::models::clipboard_item::NewClipboardItemRow;
use clipsync_server::infrastructure::storage::db::models::millis;
use clipsync_server::infrastructure::storage::db::pool::{init_pool, DbPool};
use clipsync_server::infrastructure::storage::{SqliteDeviceStore, SqliteItemStore};
use clipsync_server::interface::{DeviceStore, ItemStore};

fn test_pool() -> (tempfile::TempDir, DbPool) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let pool = init_pool(db_path.to_str().unwrap()).unwrap();
    (dir, pool)
}

fn candidate(user_id: Uuid, hash: &str) -> NewClipboardItem {
    NewClipboardItem {
        user_id,
        device_id: Some(Uuid::new_v4()),
        encrypted_content: "ZW5jcnlwdGVk".into(),
        iv: "aXY=".into(),
        content_hash: format!("{:0>64}", hash),
        content_type: ContentType::Text,
        content_size: 9,
        image: None,
    }
}

#[tokio::test]
async fn test_insert_and_read_back() {
    let (_dir, pool) = test_pool();
    let store = SqliteItemStore::new(pool);
    let user = Uuid::new_v4();

    let stored = store.insert(candidate(user, "a")).await.unwrap();

    let latest = store.latest(user).await.unwrap().unwrap();
    assert_eq!(latest.id, stored.id);
    assert_eq!(latest.content_hash, stored.content_hash);
    assert_eq!(latest.content_type, ContentType::Text);
    assert_eq!(store.count(user).await.unwrap(), 1);
    assert!(store.latest(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_image_metadata_round_trip() {
    let (_dir, pool) = test_pool();
    let store = SqliteItemStore::new(pool);
    let user = Uuid::new_v4();

    let mut with_image = candidate(user, "img");
    with_image.content_type = ContentType::Image;
    with_image.image = Some(ImageMeta {
        format: "png".into(),
        width: 800,
        height: 600,
    });
    store.insert(with_image).await.unwrap();

    let read_back = store.latest(user).await.unwrap().unwrap();
    let image = read_back.image.unwrap();
    assert_eq!(image.format, "png");
    assert_eq!((image.width, image.height), (800, 600));
}

#[tokio::test]
async fn test_duplicate_lookup_respects_window() {
    let (_dir, pool) = test_pool();
    let store = SqliteItemStore::new(pool.clone());
    let user = Uuid::new_v4();
    let window = Duration::from_secs(60);

    let fresh = store.insert(candidate(user, "fresh")).await.unwrap();
    let hit = store
        .find_recent_duplicate(user, &fresh.content_hash, window)
        .await
        .unwrap();
    assert_eq!(hit.unwrap().id, fresh.id);

    // Backdate a row beyond the window; it must not count as a duplicate.
    let stale = candidate(user, "stale").into_item(Utc::now());
    let mut row = NewClipboardItemRow::from(&stale);
    row.created_at = millis(Utc::now()) - 120_000;
    let mut conn = pool.get().unwrap();
    dao::clipboard_item::insert_item(&mut conn, &row).unwrap();

    let miss = store
        .find_recent_duplicate(user, &stale.content_hash, window)
        .await
        .unwrap();
    assert!(miss.is_none());
}

#[tokio::test]
async fn test_list_page_and_delete() {
    let (_dir, pool) = test_pool();
    let store = SqliteItemStore::new(pool.clone());
    let user = Uuid::new_v4();

    // Insert with explicit timestamps so the ordering is unambiguous.
    let mut conn = pool.get().unwrap();
    let base = millis(Utc::now());
    let mut ids = Vec::new();
    for i in 0..4i64 {
        let item = candidate(user, &format!("row-{}", i)).into_item(Utc::now());
        let mut row = NewClipboardItemRow::from(&item);
        row.created_at = base + i;
        dao::clipboard_item::insert_item(&mut conn, &row).unwrap();
        ids.push(item.id);
    }

    let all = store.list_newest_first(user).await.unwrap();
    let listed: Vec<Uuid> = all.iter().map(|item| item.id).collect();
    assert_eq!(listed, vec![ids[3], ids[2], ids[1], ids[0]]);

    let second_page = store.page(user, 2, 2).await.unwrap();
    let paged: Vec<Uuid> = second_page.iter().map(|item| item.id).collect();
    assert_eq!(paged, vec![ids[1], ids[0]]);

    assert_eq!(store.delete_many(&[ids[0], ids[1]]).await.unwrap(), 2);
    assert_eq!(store.count(user).await.unwrap(), 2);

    assert!(store.delete_one(user, ids[3]).await.unwrap());
    assert!(!store.delete_one(user, ids[3]).await.unwrap());
    // Deleting under the wrong user is a miss, not a cross-user delete.
    assert!(!store.delete_one(Uuid::new_v4(), ids[2]).await.unwrap());

    assert_eq!(store.clear(user).await.unwrap(), 1);
    assert_eq!(store.count(user).await.unwrap(), 0);
}

#[tokio::test]
async fn test_device_lifecycle() {
    let (_dir, pool) = test_pool();
    let store = SqliteDeviceStore::new(pool);
    let user = Uuid::new_v4();

    let metadata = DeviceMetadata {
        user_agent: "Mozilla/5.0".into(),
        platform: "linux".into(),
        client_id: "laptop-1".into(),
    };
    let device = Device::new(
        user,
        "Work Laptop".into(),
        "desktop".into(),
        metadata.fingerprint(),
    );
    let device_id = device.id;
    store.insert(device).await.unwrap();

    let found = store
        .find_by_fingerprint(user, &metadata.fingerprint())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, device_id);
    assert!(found.is_active);

    assert!(store.deactivate(user, device_id).await.unwrap());
    let inactive = store.get(user, device_id).await.unwrap().unwrap();
    assert!(!inactive.is_active);

    let reactivated = store
        .reactivate(user, device_id, "Renamed Laptop", Utc::now())
        .await
        .unwrap();
    assert!(reactivated.is_active);
    assert_eq!(reactivated.name, "Renamed Laptop");

    assert!(store.touch(user, device_id, Utc::now()).await.unwrap());
    assert!(!store.touch(user, Uuid::new_v4(), Utc::now()).await.unwrap());

    let listed = store.list(user).await.unwrap();
    assert_eq!(listed.len(), 1);
    // Another user sees nothing.
    assert!(store.list(Uuid::new_v4()).await.unwrap().is_empty());
}
