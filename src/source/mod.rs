//! Media source abstraction.
//!
//! A media source is anything that plays stereo audio and can hand its
//! output to a [`GraphHandle`] exactly once: a video element, a player,
//! or the [`MockSource`] used in tests. The engine never decides which
//! sources exist; discovery hands them over via
//! [`Engine::on_source_added`](crate::Engine::on_source_added).

mod mock;
mod source_id;

pub use mock::MockSource;
pub use source_id::SourceId;

use tokio::sync::broadcast;

use crate::graph::GraphHandle;
use crate::MonoFixError;

/// Capacity of a source's playback event channel.
pub const PLAYBACK_EVENT_CAPACITY: usize = 16;

/// Current playback state of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Producing audio.
    Playing,
    /// Paused by the user or the page.
    Paused,
    /// Reached the end of its media.
    Ended,
}

impl PlaybackState {
    /// Returns true only for [`PlaybackState::Playing`].
    pub fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }
}

/// Playback transition published by a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Playback started or resumed.
    Play,
    /// Playback paused.
    Pause,
    /// Playback reached the end.
    Ended,
}

impl PlaybackEvent {
    /// State the source is in right after this event.
    pub fn state(self) -> PlaybackState {
        match self {
            Self::Play => PlaybackState::Playing,
            Self::Pause => PlaybackState::Paused,
            Self::Ended => PlaybackState::Ended,
        }
    }
}

/// A stereo media source the engine can attach to.
///
/// Implementations must be cheap to query: `playback_state` is read at the
/// start of every polling cycle.
pub trait MediaSource: Send + Sync {
    /// Stable identity of this source.
    fn id(&self) -> SourceId;

    /// Current playback state.
    fn playback_state(&self) -> PlaybackState;

    /// Subscribes to playback transitions.
    fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent>;

    /// Routes this source's output through `graph` from now on.
    ///
    /// # Errors
    ///
    /// Returns [`MonoFixError::SourceAlreadyClaimed`] if another consumer
    /// already holds the output. This can happen at most once per source.
    fn claim_output(&self, graph: GraphHandle) -> Result<(), MonoFixError>;

    /// Gives the output back; the source plays unmodified afterwards.
    fn release_output(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_playing_is_playing() {
        assert!(PlaybackState::Playing.is_playing());
        assert!(!PlaybackState::Paused.is_playing());
        assert!(!PlaybackState::Ended.is_playing());
    }

    #[test]
    fn test_event_state() {
        assert_eq!(PlaybackEvent::Play.state(), PlaybackState::Playing);
        assert_eq!(PlaybackEvent::Pause.state(), PlaybackState::Paused);
        assert_eq!(PlaybackEvent::Ended.state(), PlaybackState::Ended);
    }
}
