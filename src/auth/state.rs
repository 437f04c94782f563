//! Logged-in user state.

use super::{AuthError, AuthResult, LocalStore};
use crate::models::User;

/// Storage key holding the serialized `{id, name}` of the logged-in user
pub const USER_STORAGE_KEY: &str = "tt_user";

/// The logged-in user, mirrored to local storage
#[derive(Debug)]
pub struct AuthState {
    store: LocalStore,
    user: Option<User>,
}

impl AuthState {
    /// Restore the user from storage. Missing, unreadable or corrupt
    /// entries all read as logged out.
    pub fn load(store: LocalStore) -> Self {
        let user = match store.get_item(USER_STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!("Ignoring malformed stored user: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read local storage: {}", e);
                None
            }
        };

        Self { store, user }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// The current user, or [`AuthError::NotLoggedIn`]
    pub fn require_user(&self) -> AuthResult<&User> {
        self.user.as_ref().ok_or(AuthError::NotLoggedIn)
    }

    /// Persist the user, then make it current. A failed write leaves the
    /// previous state untouched.
    pub fn login(&mut self, user: User) -> AuthResult<()> {
        self.store
            .set_item(USER_STORAGE_KEY, &serde_json::to_string(&user)?)?;

        tracing::info!(user_id = %user.id, "Logged in");
        self.user = Some(user);
        Ok(())
    }

    /// Forget the user both in storage and in memory
    pub fn logout(&mut self) -> AuthResult<()> {
        self.store.remove_item(USER_STORAGE_KEY)?;

        if let Some(user) = self.user.take() {
            tracing::info!(user_id = %user.id, "Logged out");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Id;
    use tempfile::tempdir;

    #[test]
    fn test_login_persists() {
        let dir = tempdir().unwrap();

        let mut auth = AuthState::load(LocalStore::in_dir(dir.path()));
        assert!(!auth.is_logged_in());
        auth.login(User::new(Id::Number(7), "Ada")).unwrap();

        let restored = AuthState::load(LocalStore::in_dir(dir.path()));
        let user = restored.require_user().unwrap();
        assert_eq!(user.id, Id::Number(7));
        assert_eq!(user.name, "Ada");

        let raw = LocalStore::in_dir(dir.path())
            .get_item(USER_STORAGE_KEY)
            .unwrap()
            .unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&raw).unwrap(),
            serde_json::json!({"id": 7, "name": "Ada"})
        );
    }

    #[test]
    fn test_logout_clears() {
        let dir = tempdir().unwrap();

        let mut auth = AuthState::load(LocalStore::in_dir(dir.path()));
        auth.login(User::new("u-1", "Grace")).unwrap();
        auth.logout().unwrap();
        assert!(matches!(auth.require_user(), Err(AuthError::NotLoggedIn)));

        let restored = AuthState::load(LocalStore::in_dir(dir.path()));
        assert!(restored.user().is_none());
    }

    #[test]
    fn test_malformed_user_reads_as_logged_out() {
        let dir = tempdir().unwrap();
        let store = LocalStore::in_dir(dir.path());
        store.set_item(USER_STORAGE_KEY, "not a user").unwrap();

        let auth = AuthState::load(store);
        assert!(auth.user().is_none());
    }

    #[test]
    fn test_corrupt_storage_reads_as_logged_out() {
        let dir = tempdir().unwrap();
        let store = LocalStore::in_dir(dir.path());
        std::fs::write(store.path(), "[1, 2").unwrap();

        let mut auth = AuthState::load(store);
        assert!(auth.user().is_none());

        auth.logout().unwrap();
        auth.login(User::new(Id::Number(1), "Linus")).unwrap();
        assert_eq!(auth.require_user().unwrap().name, "Linus");
    }
}
