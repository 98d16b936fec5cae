//! Audio-processing backend abstraction.
//!
//! A backend creates the single [`AudioContext`] that every source
//! controller shares. The engine creates it lazily, when the first source
//! arrives, and keeps it for the rest of its life.

mod context;
#[cfg(feature = "device-probe")]
mod device;

pub use context::{AudioContext, ContextState};
#[cfg(feature = "device-probe")]
pub use device::{list_output_devices, DeviceBackend};

use crate::MonoFixError;

/// Default sample rate for headless processing (48kHz).
pub const DEFAULT_SAMPLE_RATE: u32 = 48000;

/// Creates the shared audio context.
///
/// Failing here means no source can be processed; each source then plays
/// unmodified.
pub trait AudioBackend: Send + Sync {
    /// Creates a new audio context.
    ///
    /// # Errors
    ///
    /// Returns [`MonoFixError::BackendUnavailable`] when the platform cannot
    /// provide audio processing.
    fn create_context(&self) -> Result<AudioContext, MonoFixError>;

    /// Backend name for logging/debugging.
    fn name(&self) -> &'static str;
}

/// In-process backend that needs no audio hardware.
///
/// Sources render their blocks through the graphs it creates; nothing is
/// opened on the host.
#[derive(Debug, Clone)]
pub struct OfflineBackend {
    sample_rate: u32,
    start_suspended: bool,
}

impl OfflineBackend {
    /// Creates an offline backend at [`DEFAULT_SAMPLE_RATE`].
    pub fn new() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            start_suspended: false,
        }
    }

    /// Creates an offline backend at a specific sample rate.
    pub fn with_sample_rate(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            start_suspended: false,
        }
    }

    /// Makes created contexts start suspended, as hosts with autoplay
    /// restrictions do.
    #[must_use]
    pub fn start_suspended(mut self) -> Self {
        self.start_suspended = true;
        self
    }
}

impl Default for OfflineBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for OfflineBackend {
    fn create_context(&self) -> Result<AudioContext, MonoFixError> {
        if self.sample_rate == 0 {
            return Err(MonoFixError::backend_unavailable("sample rate must be non-zero"));
        }
        let state = if self.start_suspended {
            ContextState::Suspended
        } else {
            ContextState::Running
        };
        Ok(AudioContext::new(self.name(), self.sample_rate, state))
    }

    fn name(&self) -> &'static str {
        "Offline"
    }
}

/// Creates the default backend for this build.
///
/// With the `device-probe` feature this requires a default output device;
/// otherwise it is the [`OfflineBackend`].
pub fn default_backend() -> Box<dyn AudioBackend> {
    #[cfg(feature = "device-probe")]
    {
        Box::new(DeviceBackend::new())
    }

    #[cfg(not(feature = "device-probe"))]
    {
        Box::new(OfflineBackend::new())
    }
}
