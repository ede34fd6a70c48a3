//! Local persistence for guest-session data.

pub mod error;
pub mod local_store;

pub use error::StorageError;
pub use local_store::{LocalStore, STORE_FILE_NAME};
