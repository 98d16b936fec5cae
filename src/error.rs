//! Error types for mono-fix.
//!
//! Every failure here is structural (a missing capability or a resource
//! conflict), never timing-related, so none of them are retried. Failures are
//! local to one source: the [`Engine`](crate::Engine) keeps accepting new
//! sources after any of them.

/// Errors produced while attaching to a source or analysing its audio.
#[derive(Debug, thiserror::Error)]
pub enum MonoFixError {
    /// The audio-processing backend could not be created.
    ///
    /// The affected source keeps playing unmodified.
    #[error("audio backend unavailable: {reason}")]
    BackendUnavailable {
        /// Why the backend could not be created.
        reason: String,
    },

    /// Something else already holds exclusive access to the source's output.
    #[error("output of source '{source_id}' is already claimed by another consumer")]
    SourceAlreadyClaimed {
        /// The source whose output could not be claimed.
        source_id: String,
    },

    /// Malformed input, such as an empty sample window or invalid tunables.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// Description of what was wrong.
        reason: String,
    },

    /// The engine was built outside a Tokio runtime and no handle was supplied.
    #[error("no tokio runtime available (build inside a runtime or pass a handle)")]
    NoRuntime,
}

impl MonoFixError {
    /// Creates an [`InvalidInput`](Self::InvalidInput) error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates a [`BackendUnavailable`](Self::BackendUnavailable) error.
    pub fn backend_unavailable(reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            reason: reason.into(),
        }
    }

    /// Creates a [`SourceAlreadyClaimed`](Self::SourceAlreadyClaimed) error.
    pub fn already_claimed(source_id: impl std::fmt::Display) -> Self {
        Self::SourceAlreadyClaimed {
            source_id: source_id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_unavailable_display() {
        let err = MonoFixError::backend_unavailable("no output device");
        assert_eq!(err.to_string(), "audio backend unavailable: no output device");
    }

    #[test]
    fn test_already_claimed_display() {
        let err = MonoFixError::already_claimed("player-1");
        assert_eq!(
            err.to_string(),
            "output of source 'player-1' is already claimed by another consumer"
        );
    }

    #[test]
    fn test_invalid_input_display() {
        let err = MonoFixError::invalid_input("empty sample window");
        assert_eq!(err.to_string(), "invalid input: empty sample window");
    }
}
