//! Backend that requires a real default output device.

use cpal::traits::{DeviceTrait, HostTrait};

use super::{AudioBackend, AudioContext, ContextState};
use crate::MonoFixError;

/// Probes the host for a default output device and adopts its sample rate.
///
/// Contexts start suspended until the first playback resumes them.
#[derive(Debug, Clone, Default)]
pub struct DeviceBackend {
    device_name: Option<String>,
}

impl DeviceBackend {
    /// Uses the host's default output device.
    pub fn new() -> Self {
        Self { device_name: None }
    }

    /// Uses the output device with the given name.
    pub fn with_device(name: impl Into<String>) -> Self {
        Self {
            device_name: Some(name.into()),
        }
    }

    fn find_device(&self) -> Result<cpal::Device, MonoFixError> {
        let host = cpal::default_host();
        match &self.device_name {
            None => host
                .default_output_device()
                .ok_or_else(|| MonoFixError::backend_unavailable("no default output device")),
            Some(name) => {
                let devices = host
                    .output_devices()
                    .map_err(|e| MonoFixError::backend_unavailable(e.to_string()))?;
                devices
                    .into_iter()
                    .find(|d| d.name().map(|n| &n == name).unwrap_or(false))
                    .ok_or_else(|| {
                        MonoFixError::backend_unavailable(format!("output device not found: {name}"))
                    })
            }
        }
    }
}

impl AudioBackend for DeviceBackend {
    fn create_context(&self) -> Result<AudioContext, MonoFixError> {
        let device = self.find_device()?;
        let config = device
            .default_output_config()
            .map_err(|e| MonoFixError::backend_unavailable(e.to_string()))?;

        if config.channels() < 2 {
            return Err(MonoFixError::backend_unavailable(format!(
                "output device has {} channel(s), need stereo",
                config.channels()
            )));
        }

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            channels = config.channels(),
            "probed output device"
        );

        Ok(AudioContext::new(
            self.name(),
            config.sample_rate().0,
            ContextState::Suspended,
        ))
    }

    fn name(&self) -> &'static str {
        "Device"
    }
}

/// Lists the names of all output devices.
///
/// # Errors
///
/// Returns an error if the audio host cannot be accessed.
pub fn list_output_devices() -> Result<Vec<String>, MonoFixError> {
    let host = cpal::default_host();
    let devices = host
        .output_devices()
        .map_err(|e| MonoFixError::backend_unavailable(e.to_string()))?;
    Ok(devices.filter_map(|d| d.name().ok()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_doesnt_panic() {
        // May fail in CI without audio hardware, but shouldn't panic
        let _ = DeviceBackend::new().create_context();
        let _ = list_output_devices();
    }

    #[test]
    fn test_unknown_device_is_unavailable() {
        let result = DeviceBackend::with_device("definitely-not-a-real-device").create_context();
        assert!(matches!(
            result,
            Err(MonoFixError::BackendUnavailable { .. })
        ));
    }
}
