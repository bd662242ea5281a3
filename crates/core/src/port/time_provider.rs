// Wall clock used to time OS commands

/// Milliseconds since the Unix epoch
pub trait TimeProvider: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Reads the system clock through chrono
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Clock frozen at a given instant; command durations read as zero
pub struct FixedTimeProvider(pub i64);

impl TimeProvider for FixedTimeProvider {
    fn now_millis(&self) -> i64 {
        self.0
    }
}
