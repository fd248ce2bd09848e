pub mod registry;

pub use registry::{ConnectionId, ConnectionRegistry};
