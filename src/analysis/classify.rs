//! One-ear classification from a pair of channel levels.

use std::fmt;

use crate::EngineConfig;

/// RMS below which a channel counts as silent.
pub const SILENCE_THRESHOLD: f32 = 0.02;

/// Louder/quieter RMS ratio treated as one-ear in aggressive mode.
pub const AGGRESSIVE_RATIO: f32 = 4.0;

/// How a source's two channels are delivered to the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutingMode {
    /// Left to left, right to right.
    Stereo,
    /// Both channels summed and sent to both outputs.
    Mono,
}

impl RoutingMode {
    /// Lowercase name, as used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stereo => "stereo",
            Self::Mono => "mono",
        }
    }
}

impl fmt::Display for RoutingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides whether one window of levels indicates a one-ear condition.
///
/// A single silent channel next to a live one always means [`RoutingMode::Mono`].
/// With `aggressive_mode`, a louder channel at least [`AGGRESSIVE_RATIO`]
/// times the quieter one does too. A quieter channel at exactly zero skips
/// the ratio test.
///
/// # Example
///
/// ```
/// use mono_fix::analysis::{classify, RoutingMode};
/// use mono_fix::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(classify(0.001, 0.5, &config), RoutingMode::Mono);
/// assert_eq!(classify(0.5, 0.5, &config), RoutingMode::Stereo);
/// ```
pub fn classify(rms_left: f32, rms_right: f32, config: &EngineConfig) -> RoutingMode {
    let left_silent = rms_left < SILENCE_THRESHOLD;
    let right_silent = rms_right < SILENCE_THRESHOLD;

    if left_silent != right_silent {
        return RoutingMode::Mono;
    }

    if config.aggressive_mode {
        let max = rms_left.max(rms_right);
        let min = rms_left.min(rms_right);

        if max > SILENCE_THRESHOLD && min > 0.0 && max / min >= AGGRESSIVE_RATIO {
            return RoutingMode::Mono;
        }
    }

    RoutingMode::Stereo
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relaxed() -> EngineConfig {
        EngineConfig::default()
    }

    fn aggressive() -> EngineConfig {
        EngineConfig {
            aggressive_mode: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_left_silent_is_mono() {
        assert_eq!(classify(0.01, 0.5, &relaxed()), RoutingMode::Mono);
        assert_eq!(classify(0.0, 0.5, &relaxed()), RoutingMode::Mono);
    }

    #[test]
    fn test_right_silent_is_mono() {
        assert_eq!(classify(0.5, 0.001, &relaxed()), RoutingMode::Mono);
    }

    #[test]
    fn test_balanced_is_stereo() {
        assert_eq!(classify(0.5, 0.5, &relaxed()), RoutingMode::Stereo);
    }

    #[test]
    fn test_both_silent_is_stereo() {
        assert_eq!(classify(0.0, 0.0, &relaxed()), RoutingMode::Stereo);
        assert_eq!(classify(0.01, 0.015, &aggressive()), RoutingMode::Stereo);
    }

    #[test]
    fn test_imbalance_needs_aggressive_mode() {
        // ratio 12.5
        assert_eq!(classify(0.04, 0.5, &aggressive()), RoutingMode::Mono);
        assert_eq!(classify(0.04, 0.5, &relaxed()), RoutingMode::Stereo);
    }

    #[test]
    fn test_aggressive_ratio_boundary() {
        assert_eq!(classify(0.1, 0.4, &aggressive()), RoutingMode::Mono);
        assert_eq!(classify(0.1, 0.39, &aggressive()), RoutingMode::Stereo);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // exactly at the threshold counts as signal
        assert_eq!(
            classify(SILENCE_THRESHOLD, SILENCE_THRESHOLD, &relaxed()),
            RoutingMode::Stereo
        );
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(RoutingMode::Stereo.to_string(), "stereo");
        assert_eq!(RoutingMode::Mono.to_string(), "mono");
    }
}
