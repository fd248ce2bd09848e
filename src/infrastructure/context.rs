use std::sync::Arc;

use crate::application::{ClipboardService, DeviceService, IngestionLimits};
use crate::config::Setting;
use crate::infrastructure::connection::ConnectionRegistry;
use crate::infrastructure::identity::HmacTokenCodec;
use crate::infrastructure::storage::db::pool::DbPool;
use crate::infrastructure::storage::{SqliteDeviceStore, SqliteItemStore};
use crate::interface::{AccessTokenCodec, DeviceStore, ItemStore};

/// Everything the route tree needs, wired once at startup.
///
/// Nothing in here is a process-wide singleton; tests build as many
/// independent contexts as they need.
pub struct AppContext {
    pub setting: Setting,
    pub registry: Arc<ConnectionRegistry>,
    pub tokens: Arc<dyn AccessTokenCodec>,
    pub clipboard: Arc<ClipboardService>,
    pub devices: Arc<DeviceService>,
}

impl AppContext {
    pub fn build(setting: Setting, pool: DbPool) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let tokens: Arc<dyn AccessTokenCodec> = Arc::new(HmacTokenCodec::new(
            &setting.auth.token_secret,
            setting.auth.token_ttl_minutes,
        ));

        let item_store: Arc<dyn ItemStore> = Arc::new(SqliteItemStore::new(pool.clone()));
        let device_store: Arc<dyn DeviceStore> = Arc::new(SqliteDeviceStore::new(pool));

        let clipboard = Arc::new(ClipboardService::new(
            item_store,
            registry.clone(),
            IngestionLimits::from(&setting),
        ));
        let devices = Arc::new(DeviceService::new(device_store, tokens.clone()));

        Self {
            setting,
            registry,
            tokens,
            clipboard,
            devices,
        }
    }
}
