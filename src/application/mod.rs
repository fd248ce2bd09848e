pub mod clipboard_service;
pub mod device_service;
pub mod policy;

pub use clipboard_service::{ClipboardService, IngestionLimits, SubmitOutcome};
pub use device_service::DeviceService;
pub use policy::{DeduplicationPolicy, RetentionPolicy};
