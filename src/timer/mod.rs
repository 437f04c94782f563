//! Session Timer
//!
//! Tracks whether the logged-in user has an open work session and how long
//! it has been running.
//!
//! ## Architecture
//!
//! - **SessionTimer**: pure state machine (loading, active session, in-flight
//!   action, inline message)
//! - **Ticker**: cancellable 1 s redraw tick, no network traffic
//! - **TimerView**: mounts both, loads the active session and runs start/end
//!
//! The backend alone enforces one active session per user. The client only
//! disables its controls while a request is outstanding.

mod state;
mod ticker;
mod view;

pub use state::{format_duration, SessionTimer, TimerAction, TimerStatus};
pub use ticker::Ticker;
pub use view::{ActionOutcome, TimerView};
