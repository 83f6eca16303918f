use std::cell::Cell;
use std::rc::Rc;

/// Abstraction over wall-clock time sources.
/// Implementations: SystemTimeProvider (production), MockTimeProvider (testing).
pub trait TimeProvider {
    /// Monotonic time in seconds from an arbitrary epoch.
    fn now_seconds(&self) -> f64;
}

/// System time provider using std::time::Instant.
pub struct SystemTimeProvider {
    start: std::time::Instant,
}

impl SystemTimeProvider {
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

impl Default for SystemTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeProvider for SystemTimeProvider {
    fn now_seconds(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Mock time provider for deterministic testing. Clones share one clock, so
/// a test can keep a handle while the runner owns another.
#[derive(Clone, Default)]
pub struct MockTimeProvider {
    current: Rc<Cell<f64>>,
}

impl MockTimeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_time(&self, seconds: f64) {
        self.current.set(seconds);
    }

    pub fn advance(&self, delta: f64) {
        self.current.set(self.current.get() + delta);
    }
}

impl TimeProvider for MockTimeProvider {
    fn now_seconds(&self) -> f64 {
        self.current.get()
    }
}
