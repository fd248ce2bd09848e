use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Claims decoded from a bearer token.
///
/// `device_id` is optional: user-scoped tokens (issued out-of-band) carry
/// none, device-scoped tokens (issued at device registration) carry one.
/// Write ingestion and live connections require the device-scoped form.
#[derive(Debug, Clone)]
pub struct AccessClaims {
    pub user_id: Uuid,
    pub device_id: Option<Uuid>,
    pub expires_at: DateTime<Utc>,
}

impl AccessClaims {
    /// The verified (user, device) pair, if this credential has a device
    /// association.
    pub fn device_identity(&self) -> Option<DeviceIdentity> {
        self.device_id.map(|device_id| DeviceIdentity {
            user_id: self.user_id,
            device_id,
        })
    }
}

/// A verified (user, device) pair. Everything in the sync core operates on
/// this; how it was established is the token codec's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub user_id: Uuid,
    pub device_id: Uuid,
}
