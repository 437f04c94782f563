//! Auth State
//!
//! Keeps the logged-in user in a small local key/value store so the login
//! survives between runs.
//!
//! - [`LocalStore`]: JSON file of string keys to string values
//! - [`AuthState`]: current user, `login` / `logout`, and the guard used by
//!   protected commands

mod state;
mod store;

pub use state::{AuthState, USER_STORAGE_KEY};
pub use store::LocalStore;

use thiserror::Error;

/// Errors from local auth storage
#[derive(Error, Debug)]
pub enum AuthError {
    /// I/O operation on the storage file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Storage file exists but is not a JSON object of strings
    #[error("Corrupt local storage: {0}")]
    Corrupt(String),

    /// A protected operation was attempted without a user
    #[error("Not logged in. Run `punchcard login` first")]
    NotLoggedIn,
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::Corrupt(err.to_string())
    }
}

/// Result type alias for auth operations
pub type AuthResult<T> = Result<T, AuthError>;
