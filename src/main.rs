use clipsync_server::config::Setting;
use clipsync_server::infrastructure::context::AppContext;
use clipsync_server::infrastructure::storage::db::pool::init_pool;
use clipsync_server::infrastructure::web;
use log::{error, info};
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let setting = match Setting::load(None) {
        Ok(setting) => setting,
        Err(e) => {
            error!("failed to load settings: {}", e);
            // Fall back to defaults and try to persist them
            let default_setting = Setting::default();
            if let Err(e) = default_setting.save(None) {
                error!("failed to save default settings: {}", e);
            }
            default_setting
        }
    };

    let pool = match init_pool(&setting.storage.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            error!("failed to initialize database: {}", e);
            return Err(e);
        }
    };

    let addr: SocketAddr = format!("{}:{}", setting.server.host, setting.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid server address: {}", e))?;

    let ctx = AppContext::build(setting, pool);
    let (bound, server) = web::bind(&ctx, addr)?;
    info!("clipsync server listening on {}", bound);
    server.await;

    Ok(())
}
