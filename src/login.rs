//! Login View
//!
//! Loads the user directory on mount, lets the user pick themselves and
//! stores the choice through [`AuthState`].

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::api::TimeTrackingApi;
use crate::auth::{AuthResult, AuthState};
use crate::models::User;
use crate::view::ViewLifecycle;

/// Selector entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Login form state
#[derive(Debug, Clone)]
pub struct LoginState {
    users: Vec<User>,
    selected: Option<String>,
    loading: bool,
    error: Option<String>,
}

impl Default for LoginState {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            selected: None,
            loading: true,
            error: None,
        }
    }
}

impl LoginState {
    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn options(&self) -> Vec<SelectOption> {
        self.users
            .iter()
            .map(|u| SelectOption {
                value: u.id.key(),
                label: u.name.clone(),
            })
            .collect()
    }

    pub fn placeholder(&self) -> &'static str {
        if self.loading {
            "Loading users…"
        } else {
            "Choose your name"
        }
    }

    /// Select by option value (the id's textual form)
    pub fn select(&mut self, value: &str) {
        self.selected = Some(value.to_string()).filter(|v| !v.is_empty());
    }

    /// Select by id, or failing that by case-insensitive exact name.
    /// Returns whether a user matched.
    pub fn select_matching(&mut self, query: &str) -> bool {
        let query = query.trim();
        let found = self
            .users
            .iter()
            .find(|u| u.id.key() == query)
            .or_else(|| {
                let lowered = query.to_lowercase();
                self.users.iter().find(|u| u.name.to_lowercase() == lowered)
            })
            .map(|u| u.id.key());

        let matched = found.is_some();
        self.selected = found;
        matched
    }

    pub fn selected_user(&self) -> Option<&User> {
        let selected = self.selected.as_deref()?;
        self.users.iter().find(|u| u.id.key() == selected)
    }

    /// Continue is offered once loading is done and someone is selected
    pub fn can_continue(&self) -> bool {
        !self.loading && self.selected.is_some()
    }

    pub fn finish_load(&mut self, result: crate::api::ApiResult<Vec<User>>) {
        match result {
            Ok(users) => self.users = users,
            Err(e) => self.error = Some(e.message_or("Failed to load users")),
        }
        self.loading = false;
    }
}

/// Mounted login view
pub struct LoginView {
    state: Arc<RwLock<LoginState>>,
    lifecycle: ViewLifecycle,
    load_task: Option<JoinHandle<()>>,
}

impl LoginView {
    /// Mount and start loading the directory. Must be called inside a
    /// tokio runtime.
    pub fn mount<A: TimeTrackingApi + 'static>(api: Arc<A>) -> Self {
        let state = Arc::new(RwLock::new(LoginState::default()));
        let lifecycle = ViewLifecycle::mount();

        let load_task = {
            let state = Arc::clone(&state);
            let lifecycle = lifecycle.clone();

            tokio::spawn(async move {
                let result = api.fetch_users().await;

                let mut login = state.write().await;
                if !lifecycle.is_mounted() {
                    tracing::debug!("Login view unmounted, discarding user list");
                    return;
                }
                login.finish_load(result);
            })
        };

        Self {
            state,
            lifecycle,
            load_task: Some(load_task),
        }
    }

    /// Wait for the directory fetch to settle
    pub async fn ready(&mut self) {
        if let Some(task) = self.load_task.take() {
            if let Err(e) = task.await {
                tracing::error!("User list load task failed: {}", e);
                self.state.write().await.finish_load(Ok(Vec::new()));
            }
        }
    }

    pub async fn snapshot(&self) -> LoginState {
        self.state.read().await.clone()
    }

    pub async fn select(&self, value: &str) {
        self.state.write().await.select(value);
    }

    pub async fn select_matching(&self, query: &str) -> bool {
        self.state.write().await.select_matching(query)
    }

    /// Log the selected user in. `Ok(None)` when Continue is not available.
    pub async fn submit(&self, auth: &mut AuthState) -> AuthResult<Option<User>> {
        let login = self.state.read().await;
        if !login.can_continue() {
            return Ok(None);
        }
        let Some(user) = login.selected_user().cloned() else {
            return Ok(None);
        };

        auth.login(user.clone())?;
        Ok(Some(user))
    }

    pub fn unmount(&self) {
        self.lifecycle.unmount();
    }
}

impl Drop for LoginView {
    fn drop(&mut self) {
        self.unmount();
    }
}
