//! Local secure store for the persisted session token, username, and onboarding
//! progress marker.

pub mod file;
pub mod memory;
pub mod session;
pub mod traits;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use session::Session;
pub use traits::{SecureStore, keys};
