//! Compact HMAC-signed bearer tokens.
//!
//! Format: `base64url(claims-json) "." base64url(hmac-sha256(claims))`.
//! The codec verifies the MAC and the expiry; everything upstream of a
//! credential (who got one, and how) is outside this service.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::domain::AccessClaims;
use crate::error::{AppError, Result};
use crate::interface::AccessTokenCodec;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    sub: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    device_id: Option<Uuid>,
    iat: i64,
    exp: i64,
}

pub struct HmacTokenCodec {
    secret: Vec<u8>,
    ttl: Duration,
}

impl HmacTokenCodec {
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    fn mac(&self) -> Result<HmacSha256> {
        HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AppError::config(format!("invalid token secret: {}", e)))
    }
}

impl AccessTokenCodec for HmacTokenCodec {
    fn decode(&self, token: &str) -> Result<AccessClaims> {
        let (body, signature) = token
            .split_once('.')
            .ok_or_else(|| AppError::auth("malformed token"))?;

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AppError::auth("malformed token signature"))?;
        let mut mac = self.mac()?;
        mac.update(body.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AppError::auth("invalid token signature"))?;

        let payload = URL_SAFE_NO_PAD
            .decode(body)
            .map_err(|_| AppError::auth("malformed token payload"))?;
        let claims: TokenClaims =
            serde_json::from_slice(&payload).map_err(|_| AppError::auth("malformed token claims"))?;

        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| AppError::auth("malformed token expiry"))?;
        if expires_at <= Utc::now() {
            return Err(AppError::auth("token expired"));
        }

        Ok(AccessClaims {
            user_id: claims.sub,
            device_id: claims.device_id,
            expires_at,
        })
    }

    fn issue(&self, user_id: Uuid, device_id: Option<Uuid>) -> Result<String> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: user_id,
            device_id,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
        let mut mac = self.mac()?;
        mac.update(body.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", body, signature))
    }
}
