//! Flow cookie allocation.

use std::sync::atomic::{AtomicU64, Ordering};

/// A process-wide source of unique flow cookies.
///
/// Cookies start at 1 and increase monotonically; they tag FlowMods for
/// later identification in stats and removal notifications. The allocator is
/// injected into [`crate::Table::new`] so tests and multi-switch controllers
/// can scope cookie spaces explicitly. Cookies play no part in flow identity
/// keys.
#[derive(Debug)]
pub struct CookieAllocator {
    next: AtomicU64,
}

impl CookieAllocator {
    /// Creates an allocator starting at cookie 1.
    pub fn new() -> Self {
        Self::with_start(1)
    }

    /// Creates an allocator starting at the given cookie value.
    pub fn with_start(start: u64) -> Self {
        CookieAllocator {
            next: AtomicU64::new(start),
        }
    }

    /// Returns the next cookie.
    pub fn allocate(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for CookieAllocator {
    fn default() -> Self {
        Self::new()
    }
}
