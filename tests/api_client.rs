//! HTTP client tests against an in-process mock backend.

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;

use punchcard::config::ApiConfig;
use punchcard::models::Id;
use punchcard::{ApiError, TimeTrackerClient, TimeTrackingApi};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(base_url: &str) -> TimeTrackerClient {
    TimeTrackerClient::new(&ApiConfig::with_base_url(base_url)).unwrap()
}

fn backend() -> Router {
    Router::new()
        .route(
            "/users",
            get(|| async {
                Json(json!({
                    "users": [
                        {"id": 1, "name": "Ada"},
                        {"id": "g-2", "name": "Grace"}
                    ]
                }))
            }),
        )
        .route(
            "/work/active",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                Json(json!({
                    "session": {
                        "id": 5,
                        "user_id": params.get("user_id").cloned().unwrap_or_default(),
                        "start_time": "2024-05-01 08:00:00",
                        "end_time": null
                    }
                }))
            }),
        )
        .route(
            "/work/start",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "session": {
                        "id": 6,
                        "user_id": body["user_id"],
                        "start_time": "2024-05-01T09:00:00Z"
                    }
                }))
            }),
        )
        .route(
            "/work/end",
            post(|| async {
                (
                    StatusCode::CONFLICT,
                    Json(json!({"error": "No active session"})),
                )
            }),
        )
        .route(
            "/dashboard/summary",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route("/analytics/summary", get(|| async { "ok" }))
}

#[tokio::test]
async fn test_fetch_users_decodes_mixed_ids() {
    let api = client(&serve(backend()).await);

    let users = api.fetch_users().await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].id, Id::Number(1));
    assert_eq!(users[1].id, Id::from("g-2"));
    assert_eq!(users[1].name, "Grace");
}

#[tokio::test]
async fn test_trailing_slash_in_base_url() {
    let base = serve(backend()).await;
    let api = client(&format!("{}//", base));

    assert_eq!(api.base_url(), base);
    assert!(api.fetch_users().await.is_ok());
}

#[tokio::test]
async fn test_active_session_percent_encodes_user_id() {
    let api = client(&serve(backend()).await);

    let session = api
        .active_session(&Id::from("a b&c=d"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.user_id, Some(Id::from("a b&c=d")));
    assert!(session.is_active());
    assert!(session.started_at().is_some());
}

#[tokio::test]
async fn test_start_work_keeps_id_shape() {
    let api = client(&serve(backend()).await);

    let session = api.start_work(&Id::Number(7)).await.unwrap();
    assert_eq!(session.user_id, Some(Id::Number(7)));

    let session = api.start_work(&Id::from("u-7")).await.unwrap();
    assert_eq!(session.user_id, Some(Id::Text("u-7".to_string())));
}

#[tokio::test]
async fn test_server_error_message_is_surfaced() {
    let api = client(&serve(backend()).await);

    let err = api.end_work(&Id::Number(1)).await.unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert_eq!(err.to_string(), "No active session");
}

#[tokio::test]
async fn test_non_json_error_falls_back_to_status() {
    let api = client(&serve(backend()).await);

    let err = api.dashboard_summary().await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "Request failed: 500");
}

#[tokio::test]
async fn test_non_json_success_is_invalid() {
    let api = client(&serve(backend()).await);

    let err = api.analytics_summary().await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_request_headers() {
    let app = Router::new().route(
        "/users",
        get(|headers: HeaderMap| async move {
            let header = |name: &str| {
                headers
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string()
            };
            Json(json!({
                "users": [{"id": header("x-request-id"), "name": header("content-type")}]
            }))
        }),
    );
    let api = client(&serve(app).await);

    let first = api.fetch_users().await.unwrap().remove(0);
    let second = api.fetch_users().await.unwrap().remove(0);

    assert_eq!(first.name, "application/json");
    assert!(uuid::Uuid::parse_str(&first.id.key()).is_ok());
    assert_ne!(first.id, second.id);
}

#[tokio::test]
async fn test_post_sends_single_content_type() {
    let app = Router::new().route(
        "/work/start",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            let values: Vec<String> = headers
                .get_all("content-type")
                .iter()
                .filter_map(|v| v.to_str().ok())
                .map(str::to_string)
                .collect();
            Json(json!({
                "session": {
                    "id": values.len() as i64,
                    "user_id": values.join(", "),
                    "start_time": "2024-05-01T09:00:00Z",
                    "total_minutes": body["user_id"]
                }
            }))
        }),
    );
    let api = client(&serve(app).await);

    let session = api.start_work(&Id::Number(3)).await.unwrap();
    assert_eq!(session.id, Some(Id::Number(1)));
    assert_eq!(session.user_id, Some(Id::from("application/json")));
    assert_eq!(session.total_minutes, Some(3.0));
}

#[tokio::test]
async fn test_connection_refused_is_unavailable() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = client(&format!("http://{}", addr));
    let err = api.fetch_users().await.unwrap_err();
    assert!(matches!(err, ApiError::Unavailable(_)), "got {:?}", err);
}
