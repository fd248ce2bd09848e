pub mod auth;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod schemas;

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use warp::{Filter, Reply};

use crate::error::{AppError, Result};
use crate::infrastructure::context::AppContext;

/// Shorthand for injecting a cloneable value into a filter chain.
pub(crate) fn with<T: Clone + Send + Sync>(
    value: T,
) -> impl Filter<Extract = (T,), Error = Infallible> + Clone {
    warp::any().map(move || value.clone())
}

/// The full route tree: REST surface, the live-sync upgrade endpoint, and
/// the JSON rejection handler.
pub fn routes(ctx: &AppContext) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    routes::clipboard::routes(ctx.clipboard.clone(), ctx.tokens.clone())
        .or(routes::device::routes(ctx.devices.clone(), ctx.tokens.clone()))
        .or(routes::sync::route(
            ctx.registry.clone(),
            ctx.tokens.clone(),
            ctx.setting.heartbeat_interval(),
        ))
        .recover(response::handle_rejection)
        .with(warp::log("clipsync::web"))
}

/// Bind the server, returning the bound address and the serve future.
/// Port 0 yields an ephemeral port, which is what the integration tests
/// rely on.
pub fn bind(
    ctx: &AppContext,
    addr: impl Into<SocketAddr>,
) -> Result<(SocketAddr, impl Future<Output = ()> + 'static)> {
    warp::serve(routes(ctx))
        .try_bind_ephemeral(addr)
        .map_err(|e| AppError::config(format!("failed to bind server: {}", e)))
}
