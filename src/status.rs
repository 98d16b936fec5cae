//! Textual status for an indicator UI.

use std::fmt;

use crate::analysis::RoutingMode;
use crate::controller::ControllerStatus;
use crate::EngineConfig;

/// What a status indicator should say.
///
/// The engine does not draw anything; hosts render [`StatusLabel::text`]
/// however they like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLabel {
    /// Processing disabled; everything passes through as stereo.
    Off,
    /// Mono routing active in aggressive mode.
    OnAggressive,
    /// Mono routing active.
    On,
    /// Stereo routing active.
    Stereo,
    /// No decision yet.
    Detecting,
}

impl StatusLabel {
    /// Picks the label for a source's mode under `config`.
    ///
    /// A disabled engine always reads as [`StatusLabel::Off`].
    pub fn for_mode(mode: Option<RoutingMode>, config: &EngineConfig) -> Self {
        if !config.enabled {
            return Self::Off;
        }
        match mode {
            Some(RoutingMode::Mono) if config.aggressive_mode => Self::OnAggressive,
            Some(RoutingMode::Mono) => Self::On,
            Some(RoutingMode::Stereo) => Self::Stereo,
            None => Self::Detecting,
        }
    }

    /// Indicator text.
    pub fn text(self) -> &'static str {
        match self {
            Self::Off => "OFF (Stereo passthrough)",
            Self::OnAggressive => "ON (Aggressive)",
            Self::On => "ON",
            Self::Stereo => "Stereo",
            Self::Detecting => "Detecting...",
        }
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Snapshot of the whole engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineStatus {
    /// Configuration in effect.
    pub config: EngineConfig,
    /// Label for the first live source (by id), or for no source at all.
    pub label: StatusLabel,
    /// Every live controller, ordered by source id.
    pub sources: Vec<ControllerStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(enabled: bool, aggressive_mode: bool) -> EngineConfig {
        EngineConfig {
            enabled,
            aggressive_mode,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_disabled_is_off_regardless_of_mode() {
        for mode in [None, Some(RoutingMode::Mono), Some(RoutingMode::Stereo)] {
            assert_eq!(
                StatusLabel::for_mode(mode, &config(false, true)),
                StatusLabel::Off
            );
        }
    }

    #[test]
    fn test_labels_when_enabled() {
        assert_eq!(
            StatusLabel::for_mode(Some(RoutingMode::Mono), &config(true, true)),
            StatusLabel::OnAggressive
        );
        assert_eq!(
            StatusLabel::for_mode(Some(RoutingMode::Mono), &config(true, false)),
            StatusLabel::On
        );
        assert_eq!(
            StatusLabel::for_mode(Some(RoutingMode::Stereo), &config(true, false)),
            StatusLabel::Stereo
        );
        assert_eq!(
            StatusLabel::for_mode(None, &config(true, false)),
            StatusLabel::Detecting
        );
    }

    #[test]
    fn test_label_text() {
        assert_eq!(StatusLabel::Off.to_string(), "OFF (Stereo passthrough)");
        assert_eq!(StatusLabel::OnAggressive.text(), "ON (Aggressive)");
        assert_eq!(StatusLabel::Detecting.text(), "Detecting...");
    }
}
