use std::sync::Arc;
use uuid::Uuid;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::application::DeviceService;
use crate::domain::AccessClaims;
use crate::interface::AccessTokenCodec;

use super::super::auth;
use super::super::schemas::{DeviceRegister, DeviceResponse, TokenResponse};
use super::super::with;

pub fn routes(
    devices: Arc<DeviceService>,
    codec: Arc<dyn AccessTokenCodec>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let register = warp::path!("device" / "register")
        .and(warp::post())
        .and(auth::with_claims(codec.clone()))
        .and(warp::body::json())
        .and(with(devices.clone()))
        .and_then(register_device);

    let list = warp::path!("device" / "list")
        .and(warp::get())
        .and(auth::with_claims(codec.clone()))
        .and(with(devices.clone()))
        .and_then(list_devices);

    let heartbeat = warp::path!("device" / Uuid / "heartbeat")
        .and(warp::put())
        .and(auth::with_claims(codec.clone()))
        .and(with(devices.clone()))
        .and_then(device_heartbeat);

    let unregister = warp::path!("device" / Uuid)
        .and(warp::delete())
        .and(auth::with_claims(codec))
        .and(with(devices))
        .and_then(unregister_device);

    register.or(list).or(heartbeat).or(unregister)
}

/// POST /device/register — returns a device-scoped token for the live
/// connection and write path. Fingerprint collisions reactivate the
/// existing row instead of duplicating it.
async fn register_device(
    claims: AccessClaims,
    body: DeviceRegister,
    devices: Arc<DeviceService>,
) -> Result<impl Reply, Rejection> {
    let (device, token) = devices
        .register(
            claims.user_id,
            &body.device_name,
            &body.device_class,
            &body.device_info,
        )
        .await
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::with_status(
        warp::reply::json(&TokenResponse::bearer(
            token,
            claims.user_id,
            Some(device.id),
        )),
        StatusCode::CREATED,
    ))
}

/// GET /device/list
async fn list_devices(
    claims: AccessClaims,
    devices: Arc<DeviceService>,
) -> Result<impl Reply, Rejection> {
    let all = devices
        .list(claims.user_id)
        .await
        .map_err(warp::reject::custom)?;
    let body: Vec<DeviceResponse> = all.iter().map(DeviceResponse::from).collect();
    Ok(warp::reply::json(&body))
}

/// PUT /device/{device_id}/heartbeat
async fn device_heartbeat(
    device_id: Uuid,
    claims: AccessClaims,
    devices: Arc<DeviceService>,
) -> Result<impl Reply, Rejection> {
    devices
        .heartbeat(claims.user_id, device_id)
        .await
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT))
}

/// DELETE /device/{device_id} — soft delete.
async fn unregister_device(
    device_id: Uuid,
    claims: AccessClaims,
    devices: Arc<DeviceService>,
) -> Result<impl Reply, Rejection> {
    devices
        .unregister(claims.user_id, device_id)
        .await
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT))
}
