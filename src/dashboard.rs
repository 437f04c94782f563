//! Dashboard View
//!
//! Fetches the summary rows and analytics series together when mounted and
//! derives a [`DashboardSnapshot`] on demand with the current name filter.

use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::analytics::DashboardSnapshot;
use crate::api::TimeTrackingApi;
use crate::models::{AnalyticsSummary, DashboardSummaryRow};
use crate::view::ViewLifecycle;

/// Raw dashboard data as fetched
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub summary: Vec<DashboardSummaryRow>,
    pub analytics: Option<AnalyticsSummary>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for DashboardData {
    fn default() -> Self {
        Self {
            summary: Vec::new(),
            analytics: None,
            loading: true,
            error: None,
        }
    }
}

/// Mounted dashboard
pub struct DashboardView {
    state: Arc<RwLock<DashboardData>>,
    filter: String,
    lifecycle: ViewLifecycle,
    load_task: Option<JoinHandle<()>>,
}

impl DashboardView {
    /// Mount and start loading. Must be called inside a tokio runtime.
    pub fn mount<A: TimeTrackingApi + 'static>(api: Arc<A>) -> Self {
        let state = Arc::new(RwLock::new(DashboardData::default()));
        let lifecycle = ViewLifecycle::mount();

        let load_task = {
            let state = Arc::clone(&state);
            let lifecycle = lifecycle.clone();

            tokio::spawn(async move {
                let result = tokio::try_join!(api.dashboard_summary(), api.analytics_summary());

                let mut data = state.write().await;
                if !lifecycle.is_mounted() {
                    tracing::debug!("Dashboard unmounted, discarding response");
                    return;
                }

                match result {
                    Ok((summary, analytics)) => {
                        tracing::debug!(rows = summary.len(), "Dashboard loaded");
                        data.summary = summary;
                        data.analytics = Some(analytics);
                    }
                    Err(e) => {
                        tracing::warn!("Dashboard load failed: {}", e);
                        data.error = Some(e.message_or("Failed to load dashboard"));
                    }
                }
                data.loading = false;
            })
        };

        Self {
            state,
            filter: String::new(),
            lifecycle,
            load_task: Some(load_task),
        }
    }

    /// Wait for the initial fetch to settle
    pub async fn ready(&mut self) {
        if let Some(task) = self.load_task.take() {
            if let Err(e) = task.await {
                tracing::error!("Dashboard load task failed: {}", e);
                let mut data = self.state.write().await;
                data.error = Some("Failed to load dashboard".to_string());
                data.loading = false;
            }
        }
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    /// Copy of the raw data
    pub async fn data(&self) -> DashboardData {
        self.state.read().await.clone()
    }

    /// Derived analytics for the current data and filter
    pub async fn snapshot(&self) -> DashboardSnapshot {
        let data = self.state.read().await;
        DashboardSnapshot::derive(&data.summary, data.analytics.as_ref(), &self.filter)
    }

    pub fn unmount(&self) {
        self.lifecycle.unmount();
    }
}

impl Drop for DashboardView {
    fn drop(&mut self) {
        self.unmount();
    }
}
