use std::sync::Arc;
use warp::{Filter, Rejection};

use crate::domain::{AccessClaims, DeviceIdentity};
use crate::error::AppError;
use crate::interface::AccessTokenCodec;

use super::with;

/// Extract verified claims from the `Authorization: Bearer <token>` header.
pub fn with_claims(
    codec: Arc<dyn AccessTokenCodec>,
) -> impl Filter<Extract = (AccessClaims,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization")
        .and(with(codec))
        .and_then(decode_header)
}

/// Like `with_claims`, but requires a device-scoped token. Write ingestion
/// runs under this filter: every accepted item must be attributable to a
/// device.
pub fn with_device_identity(
    codec: Arc<dyn AccessTokenCodec>,
) -> impl Filter<Extract = (DeviceIdentity,), Error = Rejection> + Clone {
    with_claims(codec).and_then(|claims: AccessClaims| async move {
        claims
            .device_identity()
            .ok_or_else(|| warp::reject::custom(AppError::auth("token has no device association")))
    })
}

async fn decode_header(
    header: Option<String>,
    codec: Arc<dyn AccessTokenCodec>,
) -> Result<AccessClaims, Rejection> {
    let header =
        header.ok_or_else(|| warp::reject::custom(AppError::auth("missing authorization header")))?;
    let token = strip_bearer(&header)
        .ok_or_else(|| warp::reject::custom(AppError::auth("expected bearer token")))?;
    codec.decode(token).map_err(warp::reject::custom)
}

fn strip_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(token.trim())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_bearer() {
        assert_eq!(strip_bearer("Bearer abc"), Some("abc"));
        assert_eq!(strip_bearer("bearer abc"), Some("abc"));
        assert_eq!(strip_bearer("Basic abc"), None);
        assert_eq!(strip_bearer("abc"), None);
    }
}
