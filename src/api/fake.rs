//! In-memory backend used by view tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use super::{ApiError, ApiResult, TimeTrackingApi};
use crate::models::{AnalyticsSummary, DashboardSummaryRow, Id, User, WorkSession};

/// Canned reply; `Err` becomes a 500 carrying the message
type Reply<T> = Result<T, String>;

pub(crate) struct FakeApi {
    users: Mutex<Reply<Vec<User>>>,
    active: Mutex<Reply<Option<WorkSession>>>,
    start: Mutex<Reply<WorkSession>>,
    end: Mutex<Reply<WorkSession>>,
    summary: Mutex<Reply<Vec<DashboardSummaryRow>>>,
    analytics: Mutex<Reply<AnalyticsSummary>>,
    calls: Mutex<Vec<&'static str>>,
    gate: Option<Arc<Semaphore>>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self {
            users: Mutex::new(Ok(Vec::new())),
            active: Mutex::new(Ok(None)),
            start: Mutex::new(Err("start not configured".to_string())),
            end: Mutex::new(Err("end not configured".to_string())),
            summary: Mutex::new(Ok(Vec::new())),
            analytics: Mutex::new(Ok(AnalyticsSummary::default())),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Hold every reply until the gate has a permit
    pub(crate) fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub(crate) fn with_users(self, reply: Reply<Vec<User>>) -> Self {
        *self.users.lock().unwrap() = reply;
        self
    }

    pub(crate) fn with_active(self, reply: Reply<Option<WorkSession>>) -> Self {
        *self.active.lock().unwrap() = reply;
        self
    }

    pub(crate) fn with_start(self, reply: Reply<WorkSession>) -> Self {
        *self.start.lock().unwrap() = reply;
        self
    }

    pub(crate) fn with_end(self, reply: Reply<WorkSession>) -> Self {
        *self.end.lock().unwrap() = reply;
        self
    }

    pub(crate) fn with_summary(self, reply: Reply<Vec<DashboardSummaryRow>>) -> Self {
        *self.summary.lock().unwrap() = reply;
        self
    }

    pub(crate) fn with_analytics(self, reply: Reply<AnalyticsSummary>) -> Self {
        *self.analytics.lock().unwrap() = reply;
        self
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    async fn reply<T: Clone>(&self, name: &'static str, slot: &Mutex<Reply<T>>) -> ApiResult<T> {
        self.calls.lock().unwrap().push(name);
        if let Some(gate) = &self.gate {
            let _open = gate.acquire().await;
        }
        let reply = slot.lock().unwrap().clone();
        reply.map_err(|message| ApiError::from_status(500, Some(&message)))
    }
}

#[async_trait]
impl TimeTrackingApi for FakeApi {
    async fn fetch_users(&self) -> ApiResult<Vec<User>> {
        self.reply("fetch_users", &self.users).await
    }

    async fn active_session(&self, _user_id: &Id) -> ApiResult<Option<WorkSession>> {
        self.reply("active_session", &self.active).await
    }

    async fn start_work(&self, _user_id: &Id) -> ApiResult<WorkSession> {
        self.reply("start_work", &self.start).await
    }

    async fn end_work(&self, _user_id: &Id) -> ApiResult<WorkSession> {
        self.reply("end_work", &self.end).await
    }

    async fn dashboard_summary(&self) -> ApiResult<Vec<DashboardSummaryRow>> {
        self.reply("dashboard_summary", &self.summary).await
    }

    async fn analytics_summary(&self) -> ApiResult<AnalyticsSummary> {
        self.reply("analytics_summary", &self.analytics).await
    }
}

/// Session that started `seconds_ago` seconds before `now` and is still open
pub(crate) fn open_session(now: DateTime<Utc>, seconds_ago: i64) -> WorkSession {
    WorkSession {
        id: Some(Id::Number(1)),
        user_id: Some(Id::Number(1)),
        start_time: Some((now - chrono::Duration::seconds(seconds_ago)).to_rfc3339()),
        end_time: None,
        total_minutes: None,
    }
}

/// Finished session with the given total
pub(crate) fn closed_session(total_minutes: f64) -> WorkSession {
    WorkSession {
        id: Some(Id::Number(1)),
        user_id: Some(Id::Number(1)),
        start_time: Some("2024-05-01T08:00:00Z".to_string()),
        end_time: Some("2024-05-01T08:42:00Z".to_string()),
        total_minutes: Some(total_minutes),
    }
}
