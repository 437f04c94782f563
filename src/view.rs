//! View Lifecycle
//!
//! A view mounts, spawns its requests, and may be torn down before they
//! finish. Tasks hold a [`ViewLifecycle`] clone and drop their result when
//! the view is gone.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared mounted/unmounted flag
#[derive(Debug, Clone)]
pub struct ViewLifecycle {
    mounted: Arc<AtomicBool>,
}

impl ViewLifecycle {
    /// A freshly mounted view
    pub fn mount() -> Self {
        Self {
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    /// Mark the view torn down; every clone observes it
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::Release);
    }
}
