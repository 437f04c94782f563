//! # Punchcard
//!
//! Terminal client for a team time-tracking backend: pick who you are, punch
//! in and out of work sessions, and see how the team spent its time.
//!
//! ## Features
//!
//! - **Session timer**: live `HH:MM:SS` for the open session, start/end
//! - **Dashboard analytics**: leaderboard, hourly and daily series, weekly comparison
//! - **Local login**: the selected user is remembered between runs
//!
//! ## Modules
//!
//! - [`api`]: HTTP client for the backend and the [`api::TimeTrackingApi`] seam
//! - [`auth`]: persisted logged-in user
//! - [`timer`]: session timer state, 1 s ticker and mounted view
//! - [`analytics`]: pure dashboard derivations
//! - [`dashboard`]: mounted dashboard view
//! - [`login`]: mounted login view
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use punchcard::api::TimeTrackerClient;
//! use punchcard::auth::{AuthState, LocalStore};
//! use punchcard::config::Config;
//! use punchcard::timer::TimerView;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env();
//!     let api = Arc::new(TimeTrackerClient::new(&config.api)?);
//!
//!     let auth = AuthState::load(LocalStore::in_dir(&config.data_dir()));
//!     let user = auth.require_user()?.clone();
//!
//!     let mut view = TimerView::mount(api, user, config.timer.tick_interval());
//!     view.ready().await;
//!     println!("{}", view.display().await);
//!
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod login;
pub mod models;
pub mod timer;
pub mod view;

pub use api::{ApiError, ApiResult, TimeTrackerClient, TimeTrackingApi};
pub use auth::{AuthError, AuthState, LocalStore};
pub use config::Config;
pub use models::{AnalyticsSummary, DashboardSummaryRow, Id, User, WorkSession};
