pub mod sync_session;

pub use sync_session::SyncSession;
