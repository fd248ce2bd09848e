use std::sync::Arc;
use std::time::Duration;
use warp::{Filter, Rejection, Reply};

use crate::infrastructure::connection::ConnectionRegistry;
use crate::interface::AccessTokenCodec;

use super::super::handlers::sync_session;
use super::super::schemas::WsQuery;
use super::super::with;

/// GET /ws/clipboard?token=... — the live-sync upgrade endpoint. All
/// per-connection behavior lives in `sync_session`.
pub fn route(
    registry: Arc<ConnectionRegistry>,
    codec: Arc<dyn AccessTokenCodec>,
    heartbeat_interval: Duration,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("ws" / "clipboard")
        .and(warp::query::<WsQuery>())
        .and(warp::ws())
        .and(with(registry))
        .and(with(codec))
        .and(with(heartbeat_interval))
        .map(
            |query: WsQuery,
             ws: warp::ws::Ws,
             registry: Arc<ConnectionRegistry>,
             codec: Arc<dyn AccessTokenCodec>,
             heartbeat_interval: Duration| {
                ws.on_upgrade(move |socket| {
                    sync_session::run(socket, query.token, registry, codec, heartbeat_interval)
                })
            },
        )
}
