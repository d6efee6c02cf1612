//! Location permission gate consulted before a session starts.

use std::sync::atomic::{AtomicBool, Ordering};

/// Answers whether location sampling is currently permitted.
pub trait PermissionGate: Send + Sync {
    fn may_sample(&self) -> bool;
}

/// A gate with a settable answer.
#[derive(Debug)]
pub struct StaticPermissionGate {
    granted: AtomicBool,
}

impl StaticPermissionGate {
    pub fn granted() -> Self {
        Self::new(true)
    }

    pub fn denied() -> Self {
        Self::new(false)
    }

    pub fn new(granted: bool) -> Self {
        Self {
            granted: AtomicBool::new(granted),
        }
    }

    pub fn set(&self, granted: bool) {
        self.granted.store(granted, Ordering::SeqCst);
    }
}

impl Default for StaticPermissionGate {
    fn default() -> Self {
        Self::granted()
    }
}

impl PermissionGate for StaticPermissionGate {
    fn may_sample(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }
}
