//! Time source port.
//!
//! Abstracted to allow testing with deterministic time.

/// Clock interface used for block times and request deadlines.
pub trait TimeSource: Send + Sync {
    /// Current unix time in seconds.
    fn now_secs(&self) -> u64;

    /// Current unix time in milliseconds.
    fn now_millis(&self) -> u64;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_secs(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    fn now_millis(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Deterministic time source for tests.
#[derive(Debug, Default)]
pub struct MockTimeSource {
    millis: std::sync::atomic::AtomicU64,
}

impl MockTimeSource {
    /// Create at a fixed unix time in seconds.
    pub fn at_secs(secs: u64) -> Self {
        Self {
            millis: std::sync::atomic::AtomicU64::new(secs * 1000),
        }
    }

    /// Advance the clock.
    pub fn advance_millis(&self, ms: u64) {
        self.millis
            .fetch_add(ms, std::sync::atomic::Ordering::SeqCst);
    }

    /// Advance the clock by whole seconds.
    pub fn advance_secs(&self, secs: u64) {
        self.advance_millis(secs * 1000);
    }
}

impl TimeSource for MockTimeSource {
    fn now_secs(&self) -> u64 {
        self.millis.load(std::sync::atomic::Ordering::SeqCst) / 1000
    }

    fn now_millis(&self) -> u64 {
        self.millis.load(std::sync::atomic::Ordering::SeqCst)
    }
}
