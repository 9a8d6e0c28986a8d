//! User accounts and sessions

pub mod errors;
pub mod models;
pub mod password;
pub mod storage;

pub use errors::{AuthError, AuthResult};
pub use models::*;
pub use storage::UserStorage;
