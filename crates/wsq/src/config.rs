/// Ambient configuration for the scheduler façade.
///
/// Ring capacity is deliberately *not* a field here: per spec §3 it is a
/// compile-time const generic (`LocalQueue<T, N>`), fixed for the lifetime
/// of the program, so there is no runtime knob to carry. `Config` only
/// covers what genuinely varies at runtime.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Whether push/pop/steal counters are updated (slight overhead when on).
    pub enable_metrics: bool,
    /// Max fibers [`Scheduler::next`](crate::scheduler::Scheduler::next) pulls
    /// from the global queue in one refill, before falling back to stealing.
    pub global_batch: usize,
}

impl Config {
    /// Creates a new configuration with custom settings.
    ///
    /// # Panics
    ///
    /// Panics if `global_batch` is `0` or greater than `1024`.
    pub const fn new(enable_metrics: bool, global_batch: usize) -> Self {
        assert!(
            global_batch > 0 && global_batch <= 1024,
            "global_batch must be between 1 and 1024"
        );
        Self {
            enable_metrics,
            global_batch,
        }
    }

    /// No metrics, a modest global-queue refill batch. The default.
    pub const fn quiet() -> Self {
        Self::new(false, 32)
    }

    /// Same refill batch as [`Self::quiet`], with metrics turned on.
    pub const fn metrics_enabled() -> Self {
        Self::new(true, 32)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::quiet()
    }
}
