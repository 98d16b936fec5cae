//! Configuration types for the engine.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::level_filters::LevelFilter;

use crate::MonoFixError;

/// User-facing settings, shared by every source controller.
///
/// The whole value is replaced on every change; controllers read one
/// snapshot at the start of each classification cycle.
///
/// # Example
///
/// ```
/// use mono_fix::EngineConfig;
///
/// let config = EngineConfig {
///     aggressive_mode: true,
///     ..Default::default()
/// };
/// assert!(config.enabled);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Master switch. When `false`, routing is forced to stereo.
    ///
    /// Default: `true`
    pub enabled: bool,

    /// Also treat a strong left/right imbalance as a one-ear condition,
    /// not just a fully silent channel.
    ///
    /// Default: `false`
    pub aggressive_mode: bool,

    /// Diagnostic verbosity: 0 = silent, 1 = info, 2 = debug.
    ///
    /// Has no effect on routing. See [`EngineConfig::level_filter`].
    /// Default: 0
    pub log_level: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            aggressive_mode: false,
            log_level: 0,
        }
    }
}

impl EngineConfig {
    /// Maps `log_level` to a `tracing` level filter for subscriber setup.
    #[must_use]
    pub fn level_filter(&self) -> LevelFilter {
        match self.log_level {
            0 => LevelFilter::OFF,
            1 => LevelFilter::INFO,
            _ => LevelFilter::DEBUG,
        }
    }
}

/// Timing and window tunables for the polling loop.
///
/// Fixed for the lifetime of an engine. The defaults are what the engine was
/// tuned with; tests shorten them freely.
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Cadence right after playback starts.
    ///
    /// Default: 350ms
    pub fast_interval: Duration,

    /// Cadence once the mode has been stable for a while.
    ///
    /// Default: 2000ms
    pub slow_interval: Duration,

    /// Consecutive unchanged classifications before switching to the slow cadence.
    ///
    /// Default: 8
    pub stable_checks_before_slow: u32,

    /// Samples per channel in each analysed window.
    ///
    /// Default: 32
    pub window_size: usize,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            fast_interval: Duration::from_millis(350),
            slow_interval: Duration::from_millis(2000),
            stable_checks_before_slow: 8,
            window_size: 32,
        }
    }
}

impl PollingConfig {
    /// Checks that the tunables can drive a polling loop.
    pub(crate) fn validate(&self) -> Result<(), MonoFixError> {
        if self.window_size == 0 {
            return Err(MonoFixError::invalid_input("window_size must be non-zero"));
        }
        if self.fast_interval.is_zero() || self.slow_interval.is_zero() {
            return Err(MonoFixError::invalid_input(
                "polling intervals must be non-zero",
            ));
        }
        Ok(())
    }
}

/// Process-wide configuration cell.
///
/// Cloning shares the same cell. Writers are serialized by the lock and
/// replace the value wholesale (last write wins).
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<EngineConfig>>,
}

impl SharedConfig {
    /// Creates a cell holding `config`.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Returns the current value.
    pub fn snapshot(&self) -> EngineConfig {
        *self.inner.read()
    }

    /// Replaces the value, returning the previous one.
    pub fn replace(&self, config: EngineConfig) -> EngineConfig {
        std::mem::replace(&mut *self.inner.write(), config)
    }

    /// Applies `f` under the write lock and returns the new value.
    pub fn update(&self, f: impl FnOnce(&mut EngineConfig)) -> EngineConfig {
        let mut guard = self.inner.write();
        f(&mut guard);
        *guard
    }
}
