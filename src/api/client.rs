//! Time-Tracking REST API Client
//!
//! HTTP client for the backend's user, work-session and analytics endpoints.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::Instrument;

use super::error::{ApiError, ApiResult};
use super::TimeTrackingApi;
use crate::config::{normalize_base_url, ApiConfig};
use crate::models::{AnalyticsSummary, DashboardSummaryRow, Id, User, WorkSession};

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// REST client for the time-tracking backend
#[derive(Debug, Clone)]
pub struct TimeTrackerClient {
    client: Client,
    base_url: String,
}

impl TimeTrackerClient {
    /// Create a new client with the given configuration
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: normalize_base_url(&config.base_url),
        })
    }

    /// Base URL every path is appended to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let request = self.client.get(self.url(path));
        self.send_json("GET", path, request).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let request = self.client.post(self.url(path)).json(body);
        self.send_json("POST", path, request).await
    }

    /// Send a request and decode the JSON response
    async fn send_json<T: DeserializeOwned>(
        &self,
        method: &'static str,
        path: &str,
        request: RequestBuilder,
    ) -> ApiResult<T> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::debug_span!("api_request", method, path, request_id = %request_id);

        async move {
            let mut request = request
                .header(REQUEST_ID_HEADER, request_id.as_str())
                .build()?;
            // Replaces the value `.json()` already set on POST bodies
            request
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

            let response = self
                .client
                .execute(request)
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        ApiError::Timeout
                    } else if e.is_connect() {
                        ApiError::Unavailable(self.base_url.clone())
                    } else {
                        ApiError::Transport(e)
                    }
                })?;

            let status = response.status();
            let is_json = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.contains("application/json"))
                .unwrap_or(false);

            let data: Option<Value> = if is_json {
                let bytes = response.bytes().await?;
                match serde_json::from_slice(&bytes) {
                    Ok(value) => Some(value),
                    Err(e) if status.is_success() => {
                        return Err(ApiError::InvalidResponse(e.to_string()));
                    }
                    Err(_) => None,
                }
            } else {
                None
            };

            if !status.is_success() {
                let server_message = data
                    .as_ref()
                    .and_then(|d| d.get("error"))
                    .and_then(Value::as_str);
                let err = ApiError::from_status(status.as_u16(), server_message);
                tracing::warn!(status = status.as_u16(), error = %err, "Backend request failed");
                return Err(err);
            }

            let data = data.ok_or_else(|| {
                ApiError::InvalidResponse("expected a JSON response body".to_string())
            })?;

            tracing::debug!(status = status.as_u16(), "Backend request succeeded");
            serde_json::from_value(data).map_err(|e| ApiError::InvalidResponse(e.to_string()))
        }
        .instrument(span)
        .await
    }
}

#[async_trait]
impl TimeTrackingApi for TimeTrackerClient {
    async fn fetch_users(&self) -> ApiResult<Vec<User>> {
        let data: UsersResponse = self.get_json("/users").await?;
        Ok(data.users)
    }

    async fn active_session(&self, user_id: &Id) -> ApiResult<Option<WorkSession>> {
        let path = format!(
            "/work/active?user_id={}",
            urlencoding::encode(&user_id.key())
        );
        let data: SessionEnvelope = self.get_json(&path).await?;
        Ok(data.session)
    }

    async fn start_work(&self, user_id: &Id) -> ApiResult<WorkSession> {
        let data: SessionEnvelope = self
            .post_json("/work/start", &WorkRequest { user_id })
            .await?;
        data.require_session()
    }

    async fn end_work(&self, user_id: &Id) -> ApiResult<WorkSession> {
        let data: SessionEnvelope = self
            .post_json("/work/end", &WorkRequest { user_id })
            .await?;
        data.require_session()
    }

    async fn dashboard_summary(&self) -> ApiResult<Vec<DashboardSummaryRow>> {
        let data: SummaryResponse = self.get_json("/dashboard/summary").await?;
        Ok(data.users)
    }

    async fn analytics_summary(&self) -> ApiResult<AnalyticsSummary> {
        self.get_json("/analytics/summary").await
    }
}

// ============================================
// Request/Response DTOs
// ============================================

#[derive(Debug, Serialize)]
struct WorkRequest<'a> {
    user_id: &'a Id,
}

#[derive(Debug, Deserialize)]
struct UsersResponse {
    users: Vec<User>,
}

#[derive(Debug, Deserialize)]
struct SessionEnvelope {
    #[serde(default)]
    session: Option<WorkSession>,
}

impl SessionEnvelope {
    fn require_session(self) -> ApiResult<WorkSession> {
        self.session
            .ok_or_else(|| ApiError::InvalidResponse("response carried no session".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    users: Vec<DashboardSummaryRow>,
}
