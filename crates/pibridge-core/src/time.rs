//! Wall-clock abstraction for payment metadata and health timestamps.
//!
//! Handlers stamp outgoing payments and health responses with the current
//! time. Injecting the clock keeps those values deterministic in tests.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};

/// Source of wall-clock time.
///
/// Production code uses `RealClock`; tests inject `TestClock`.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Returns the current system time.
    fn now_system(&self) -> SystemTime;

    /// Returns the current time in milliseconds since the Unix epoch.
    fn unix_millis(&self) -> u64 {
        let since_epoch = self.now_system().duration_since(UNIX_EPOCH).unwrap_or_default();
        u64::try_from(since_epoch.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealClock;

impl RealClock {
    /// Creates a new real clock instance.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for RealClock {
    fn now_system(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Manually driven clock.
///
/// Clones share the same underlying time, so a test can keep a handle and
/// advance the clock seen by the code under test.
#[derive(Debug, Clone)]
pub struct TestClock {
    /// Milliseconds since UNIX_EPOCH
    millis: Arc<AtomicU64>,
}

impl TestClock {
    /// Creates a clock frozen at the current system time.
    pub fn new() -> Self {
        Self::with_start_time(SystemTime::now())
    }

    /// Creates a clock frozen at `start`.
    pub fn with_start_time(start: SystemTime) -> Self {
        let since_epoch = start.duration_since(UNIX_EPOCH).unwrap_or_default();
        let millis = u64::try_from(since_epoch.as_millis()).unwrap_or(u64::MAX);
        Self { millis: Arc::new(AtomicU64::new(millis)) }
    }

    /// Creates a clock frozen at `millis` milliseconds after the epoch.
    pub fn at_unix_millis(millis: u64) -> Self {
        Self { millis: Arc::new(AtomicU64::new(millis)) }
    }

    /// Moves the clock forward.
    pub fn advance(&self, duration: Duration) {
        let step = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self.millis.fetch_add(step, Ordering::AcqRel);
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TestClock {
    fn now_system(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(self.millis.load(Ordering::Acquire))
    }

    fn unix_millis(&self) -> u64 {
        self.millis.load(Ordering::Acquire)
    }
}
