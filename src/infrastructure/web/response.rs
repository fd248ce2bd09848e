use log::error;
use serde::Serialize;
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::{Rejection, Reply};

use crate::error::AppError;

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

/// Map rejections onto JSON error responses.
///
/// Write-path callers see validation/auth/size/storage errors; anything
/// unrecognized collapses to a 500 without leaking internals.
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(app_err) = err.find::<AppError>() {
        status_for(app_err)
    } else if err
        .find::<warp::filters::body::BodyDeserializeError>()
        .is_some()
    {
        (StatusCode::BAD_REQUEST, "Invalid request body".to_string())
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        (
            StatusCode::BAD_REQUEST,
            "Invalid query parameters".to_string(),
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed".to_string(),
        )
    } else {
        error!("unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };

    let body = ErrorBody {
        code: status.as_u16(),
        message,
    };
    Ok(warp::reply::with_status(warp::reply::json(&body), status))
}

fn status_for(err: &AppError) -> (StatusCode, String) {
    let status = match err {
        AppError::Auth(_) => StatusCode::UNAUTHORIZED,
        AppError::Validation(_) => StatusCode::BAD_REQUEST,
        AppError::SizeLimit(_) => StatusCode::PAYLOAD_TOO_LARGE,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::Storage(_) | AppError::Internal(_) | AppError::Config(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        AppError::Connection(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.message().to_string())
}
