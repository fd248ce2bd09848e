use std::sync::Arc;
use uuid::Uuid;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::application::ClipboardService;
use crate::domain::{AccessClaims, DeviceIdentity};
use crate::interface::AccessTokenCodec;

use super::super::auth;
use super::super::schemas::{
    ClipboardHistoryResponse, ClipboardItemCreate, ClipboardItemResponse, HistoryQuery,
};
use super::super::with;

pub fn routes(
    clipboard: Arc<ClipboardService>,
    codec: Arc<dyn AccessTokenCodec>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let update = warp::path!("clipboard" / "update")
        .and(warp::post())
        .and(auth::with_device_identity(codec.clone()))
        .and(warp::body::json())
        .and(with(clipboard.clone()))
        .and_then(create_item);

    let latest = warp::path!("clipboard" / "latest")
        .and(warp::get())
        .and(auth::with_claims(codec.clone()))
        .and(with(clipboard.clone()))
        .and_then(get_latest);

    let history = warp::path!("clipboard" / "history")
        .and(warp::get())
        .and(auth::with_claims(codec.clone()))
        .and(warp::query::<HistoryQuery>())
        .and(with(clipboard.clone()))
        .and_then(get_history);

    let clear = warp::path!("clipboard" / "clear")
        .and(warp::delete())
        .and(auth::with_claims(codec.clone()))
        .and(with(clipboard.clone()))
        .and_then(clear_history);

    let delete = warp::path!("clipboard" / Uuid)
        .and(warp::delete())
        .and(auth::with_claims(codec))
        .and(with(clipboard))
        .and_then(delete_item);

    update.or(latest).or(history).or(clear).or(delete)
}

/// POST /clipboard/update — the ingestion entry point. A deduplicated
/// write returns the prior item with the same 201 the original write got.
async fn create_item(
    identity: DeviceIdentity,
    body: ClipboardItemCreate,
    clipboard: Arc<ClipboardService>,
) -> Result<impl Reply, Rejection> {
    let candidate = body.into_candidate(&identity).map_err(warp::reject::custom)?;
    let outcome = clipboard
        .submit(&identity, candidate)
        .await
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::with_status(
        warp::reply::json(&ClipboardItemResponse::from(&outcome.item)),
        StatusCode::CREATED,
    ))
}

/// GET /clipboard/latest
async fn get_latest(
    claims: AccessClaims,
    clipboard: Arc<ClipboardService>,
) -> Result<impl Reply, Rejection> {
    let item = clipboard
        .latest(claims.user_id)
        .await
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::json(&ClipboardItemResponse::from(&item)))
}

/// GET /clipboard/history?page=&page_size=
async fn get_history(
    claims: AccessClaims,
    query: HistoryQuery,
    clipboard: Arc<ClipboardService>,
) -> Result<impl Reply, Rejection> {
    let (page, page_size) = query.normalized();
    let (items, total) = clipboard
        .history(claims.user_id, page, page_size)
        .await
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::json(&ClipboardHistoryResponse {
        items: items.iter().map(ClipboardItemResponse::from).collect(),
        total,
        page,
        page_size,
    }))
}

/// DELETE /clipboard/clear
async fn clear_history(
    claims: AccessClaims,
    clipboard: Arc<ClipboardService>,
) -> Result<impl Reply, Rejection> {
    clipboard
        .clear(claims.user_id)
        .await
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT))
}

/// DELETE /clipboard/{item_id}
async fn delete_item(
    item_id: Uuid,
    claims: AccessClaims,
    clipboard: Arc<ClipboardService>,
) -> Result<impl Reply, Rejection> {
    clipboard
        .delete_item(claims.user_id, item_id)
        .await
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT))
}
