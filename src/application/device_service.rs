use chrono::Utc;
use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Device, DeviceMetadata};
use crate::error::{AppError, Result};
use crate::interface::{AccessTokenCodec, DeviceStore};

/// Device registration and lifecycle.
pub struct DeviceService {
    devices: Arc<dyn DeviceStore>,
    tokens: Arc<dyn AccessTokenCodec>,
}

impl DeviceService {
    pub fn new(devices: Arc<dyn DeviceStore>, tokens: Arc<dyn AccessTokenCodec>) -> Self {
        Self { devices, tokens }
    }

    /// Register a device for the user, returning it together with a
    /// device-scoped token.
    ///
    /// The fingerprint is derived deterministically from the client
    /// metadata; a collision means this physical device registered
    /// before, so the existing row is reactivated and renamed instead of
    /// duplicated.
    pub async fn register(
        &self,
        user_id: Uuid,
        name: &str,
        device_class: &str,
        metadata: &DeviceMetadata,
    ) -> Result<(Device, String)> {
        if name.is_empty() {
            return Err(AppError::validation("device_name must not be empty"));
        }
        if device_class.is_empty() {
            return Err(AppError::validation("device_class must not be empty"));
        }

        let fingerprint = metadata.fingerprint();

        let device = match self
            .devices
            .find_by_fingerprint(user_id, &fingerprint)
            .await?
        {
            Some(existing) => {
                info!(
                    "reactivating device {} for user {}",
                    existing.id, user_id
                );
                self.devices
                    .reactivate(user_id, existing.id, name, Utc::now())
                    .await?
            }
            None => {
                let device = Device::new(
                    user_id,
                    name.to_string(),
                    device_class.to_string(),
                    fingerprint,
                );
                info!("registering device {} for user {}", device.id, user_id);
                self.devices.insert(device).await?
            }
        };

        let token = self.tokens.issue(user_id, Some(device.id))?;
        Ok((device, token))
    }

    /// All of the user's devices, most recently seen first.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Device>> {
        self.devices.list(user_id).await
    }

    /// Soft-delete a device. The row stays so history keeps its origin
    /// attribution.
    pub async fn unregister(&self, user_id: Uuid, device_id: Uuid) -> Result<()> {
        if self.devices.deactivate(user_id, device_id).await? {
            Ok(())
        } else {
            Err(AppError::not_found("Device not found"))
        }
    }

    /// Bump a device's last-seen timestamp.
    pub async fn heartbeat(&self, user_id: Uuid, device_id: Uuid) -> Result<()> {
        if self.devices.touch(user_id, device_id, Utc::now()).await? {
            Ok(())
        } else {
            Err(AppError::not_found("Device not found"))
        }
    }
}
