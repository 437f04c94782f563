//! Mounted timer view: loads the active session, runs the redraw tick,
//! and performs start/end against the backend.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;

use super::state::{SessionTimer, TimerAction};
use super::ticker::Ticker;
use crate::api::TimeTrackingApi;
use crate::models::User;
use crate::view::ViewLifecycle;

/// Result of a start/end request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The backend accepted the request and the state was updated
    Applied,
    /// The backend rejected the request; the message holds the reason
    Failed,
    /// Controls were disabled, no request was sent
    Rejected,
    /// The view was unmounted before the response arrived
    Discarded,
}

/// Timer view for the logged-in user
pub struct TimerView<A: TimeTrackingApi + 'static> {
    api: Arc<A>,
    user: User,
    state: Arc<RwLock<SessionTimer>>,
    lifecycle: ViewLifecycle,
    ticks: watch::Receiver<u64>,
    ticker: Ticker,
    load_task: Option<JoinHandle<()>>,
}

impl<A: TimeTrackingApi + 'static> TimerView<A> {
    /// Mount the view: start the tick and fetch the user's active session.
    /// Must be called inside a tokio runtime.
    pub fn mount(api: Arc<A>, user: User, tick_period: Duration) -> Self {
        let state = Arc::new(RwLock::new(SessionTimer::new()));
        let lifecycle = ViewLifecycle::mount();
        let (ticker, ticks) = Ticker::spawn(tick_period);

        let load_task = {
            let api = Arc::clone(&api);
            let state = Arc::clone(&state);
            let lifecycle = lifecycle.clone();
            let user_id = user.id.clone();

            tokio::spawn(async move {
                let result = api.active_session(&user_id).await;

                let mut timer = state.write().await;
                if !lifecycle.is_mounted() {
                    tracing::debug!("Timer view unmounted, discarding active session response");
                    return;
                }
                timer.finish_load(result);
                tracing::debug!(status = %timer.status(), "Active session loaded");
            })
        };

        Self {
            api,
            user,
            state,
            lifecycle,
            ticks,
            ticker,
            load_task: Some(load_task),
        }
    }

    /// Wait for the initial active-session fetch to settle
    pub async fn ready(&mut self) {
        if let Some(task) = self.load_task.take() {
            if let Err(e) = task.await {
                tracing::error!("Active session load task failed: {}", e);
                self.state.write().await.finish_load(Ok(None));
            }
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    /// Copy of the current state for rendering
    pub async fn snapshot(&self) -> SessionTimer {
        self.state.read().await.clone()
    }

    /// Shared state handle
    pub fn state(&self) -> Arc<RwLock<SessionTimer>> {
        Arc::clone(&self.state)
    }

    /// Receiver bumped on every tick; redraw when it changes
    pub fn ticks(&self) -> watch::Receiver<u64> {
        self.ticks.clone()
    }

    /// Elapsed display computed against the wall clock
    pub async fn display(&self) -> String {
        self.state.read().await.display(Utc::now())
    }

    pub async fn start(&self) -> ActionOutcome {
        self.run(TimerAction::Start).await
    }

    pub async fn end(&self) -> ActionOutcome {
        self.run(TimerAction::End).await
    }

    async fn run(&self, action: TimerAction) -> ActionOutcome {
        if !self.state.write().await.begin_action(action) {
            tracing::debug!(?action, "Timer action not available");
            return ActionOutcome::Rejected;
        }

        let result = match action {
            TimerAction::Start => self.api.start_work(&self.user.id).await,
            TimerAction::End => self.api.end_work(&self.user.id).await,
        };
        let succeeded = result.is_ok();

        let mut timer = self.state.write().await;
        if !self.lifecycle.is_mounted() {
            tracing::debug!(?action, "Timer view unmounted, discarding response");
            return ActionOutcome::Discarded;
        }

        match action {
            TimerAction::Start => timer.finish_start(result),
            TimerAction::End => timer.finish_end(result),
        }

        if succeeded {
            tracing::info!(?action, user_id = %self.user.id, "Timer action applied");
            ActionOutcome::Applied
        } else {
            tracing::warn!(?action, message = ?timer.message(), "Timer action failed");
            ActionOutcome::Failed
        }
    }

    /// Tear the view down: stop the tick and ignore late responses
    pub fn unmount(&self) {
        self.lifecycle.unmount();
        self.ticker.stop();
    }

    pub fn is_mounted(&self) -> bool {
        self.lifecycle.is_mounted()
    }
}

impl<A: TimeTrackingApi + 'static> Drop for TimerView<A> {
    fn drop(&mut self) {
        self.unmount();
    }
}
