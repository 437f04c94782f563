//! Session timer state machine.
//!
//! Pure state: no I/O and no clock. Callers pass `now` in, and feed API
//! results back through the `finish_*` methods.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::api::ApiResult;
use crate::models::WorkSession;

/// What the timer shows in its status slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimerStatus {
    Loading,
    Working,
    Idle,
}

impl fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerStatus::Loading => f.write_str("Loading…"),
            TimerStatus::Working => f.write_str("Working"),
            TimerStatus::Idle => f.write_str("Idle"),
        }
    }
}

/// User-triggered timer actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    Start,
    End,
}

/// Active-session state for one user
#[derive(Debug, Clone)]
pub struct SessionTimer {
    active_session: Option<WorkSession>,
    loading: bool,
    action_in_flight: bool,
    message: Option<String>,
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionTimer {
    /// A timer that has not loaded its session yet
    pub fn new() -> Self {
        Self {
            active_session: None,
            loading: true,
            action_in_flight: false,
            message: None,
        }
    }

    pub fn active_session(&self) -> Option<&WorkSession> {
        self.active_session.as_ref()
    }

    /// True while a session exists and has not ended
    pub fn is_active(&self) -> bool {
        self.active_session
            .as_ref()
            .is_some_and(WorkSession::is_active)
    }

    pub fn status(&self) -> TimerStatus {
        if self.loading {
            TimerStatus::Loading
        } else if self.is_active() {
            TimerStatus::Working
        } else {
            TimerStatus::Idle
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Controls are disabled while the load or an action is outstanding
    pub fn is_busy(&self) -> bool {
        self.loading || self.action_in_flight
    }

    pub fn can_start(&self) -> bool {
        !self.is_busy() && !self.is_active()
    }

    pub fn can_end(&self) -> bool {
        !self.is_busy() && self.is_active()
    }

    /// Inline message: the last error, or the saved-session notice
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Whole seconds since the active session started, never negative
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        if !self.is_active() {
            return 0;
        }

        match self.active_session.as_ref().and_then(WorkSession::started_at) {
            Some(start) => (now - start).num_seconds().max(0),
            None => 0,
        }
    }

    /// `HH:MM:SS` for the running session, `00:00:00` when idle
    pub fn display(&self, now: DateTime<Utc>) -> String {
        format_duration(self.elapsed_seconds(now))
    }

    pub fn finish_load(&mut self, result: ApiResult<Option<WorkSession>>) {
        match result {
            Ok(session) => {
                if let Some(s) = session.as_ref().filter(|s| s.is_active()) {
                    if s.started_at().is_none() {
                        tracing::warn!(
                            start_time = ?s.start_time,
                            "Active session has no usable start time"
                        );
                    }
                }
                self.active_session = session;
            }
            Err(e) => {
                self.message = Some(e.message_or("Failed to load active session"));
            }
        }
        self.loading = false;
    }

    /// Claim the controls for `action`. Returns false, leaving the state
    /// alone, when the action is not currently offered.
    pub fn begin_action(&mut self, action: TimerAction) -> bool {
        let allowed = match action {
            TimerAction::Start => self.can_start(),
            TimerAction::End => self.can_end(),
        };
        if !allowed {
            return false;
        }

        self.message = None;
        self.action_in_flight = true;
        true
    }

    pub fn finish_start(&mut self, result: ApiResult<WorkSession>) {
        match result {
            Ok(session) => self.active_session = Some(session),
            Err(e) => self.message = Some(e.message_or("Failed to start work")),
        }
        self.action_in_flight = false;
    }

    pub fn finish_end(&mut self, result: ApiResult<WorkSession>) {
        match result {
            Ok(session) => {
                self.active_session = None;
                self.message = Some(saved_message(&session));
            }
            Err(e) => self.message = Some(e.message_or("Failed to end work")),
        }
        self.action_in_flight = false;
    }
}

fn saved_message(session: &WorkSession) -> String {
    let total = session.total_minutes.unwrap_or(0.0);
    if total.fract() == 0.0 {
        format!("Saved. Total minutes: {:.0}", total)
    } else {
        format!("Saved. Total minutes: {}", total)
    }
}

/// Format seconds as zero-padded `HH:MM:SS`; negative input is 0
pub fn format_duration(total_seconds: i64) -> String {
    let s = total_seconds.max(0);
    let hours = s / 3600;
    let mins = (s % 3600) / 60;
    let secs = s % 60;
    format!("{:02}:{:02}:{:02}", hours, mins, secs)
}
