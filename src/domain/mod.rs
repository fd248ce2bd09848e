pub mod clipboard;
pub mod content_type;
pub mod device;
pub mod identity;

pub use clipboard::{ClipboardItem, ImageMeta, NewClipboardItem};
pub use content_type::ContentType;
pub use device::{Device, DeviceMetadata};
pub use identity::{AccessClaims, DeviceIdentity};
