//! Backend API
//!
//! Typed access to the time-tracking backend over HTTP/JSON.
//!
//! ## Endpoints
//!
//! | Method | Path | Response |
//! |---|---|---|
//! | GET | /users | `{users: [User]}` |
//! | GET | /work/active?user_id= | `{session: WorkSession \| null}` |
//! | POST | /work/start | `{session: WorkSession}` |
//! | POST | /work/end | `{session: WorkSession}` |
//! | GET | /dashboard/summary | `{users: [DashboardSummaryRow]}` |
//! | GET | /analytics/summary | `AnalyticsSummary` |
//!
//! Views depend on the [`TimeTrackingApi`] trait rather than the HTTP
//! client so they can be driven by any backend.

mod client;
mod error;

#[cfg(test)]
pub(crate) mod fake;

pub use client::{TimeTrackerClient, REQUEST_ID_HEADER};
pub use error::{ApiError, ApiResult};

use async_trait::async_trait;

use crate::models::{AnalyticsSummary, DashboardSummaryRow, Id, User, WorkSession};

/// Operations the client needs from the backend
#[async_trait]
pub trait TimeTrackingApi: Send + Sync {
    /// The user directory
    async fn fetch_users(&self) -> ApiResult<Vec<User>>;

    /// The user's open session, if any
    async fn active_session(&self, user_id: &Id) -> ApiResult<Option<WorkSession>>;

    /// Open a new session for the user
    async fn start_work(&self, user_id: &Id) -> ApiResult<WorkSession>;

    /// Close the user's open session; the result carries `total_minutes`
    async fn end_work(&self, user_id: &Id) -> ApiResult<WorkSession>;

    /// Per-user totals for today and all time
    async fn dashboard_summary(&self) -> ApiResult<Vec<DashboardSummaryRow>>;

    /// Trailing 7-day analytics series
    async fn analytics_summary(&self) -> ApiResult<AnalyticsSummary>;
}
