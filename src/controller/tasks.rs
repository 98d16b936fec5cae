//! Background tasks owned by a controller.
//!
//! Both hold only a weak reference, so dropping the controller ends them.

use std::sync::Weak;
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};

use super::ControllerShared;
use crate::source::PlaybackEvent;

/// Sleeps for the current cadence, runs a cycle, repeats.
///
/// Exits once a cycle reports idle, the generation moves on, or the
/// controller is gone.
pub(super) async fn poll_loop(shared: Weak<ControllerShared>, generation: u64, first: Duration) {
    let mut delay = first;
    loop {
        tokio::time::sleep(delay).await;

        let Some(controller) = shared.upgrade() else {
            return;
        };
        match controller.scheduled_cycle(generation) {
            Some(next) => delay = next,
            None => return,
        }
    }
}

/// Turns a source's playback transitions into play/pause calls.
///
/// If events were dropped, the source's current state decides.
pub(super) async fn watch_playback(
    shared: Weak<ControllerShared>,
    mut events: broadcast::Receiver<PlaybackEvent>,
) {
    loop {
        let event = match events.recv().await {
            Ok(event) => Some(event),
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "playback events lagged, reconciling");
                None
            }
            Err(RecvError::Closed) => return,
        };

        let Some(controller) = shared.upgrade() else {
            return;
        };
        let playing = match event {
            Some(event) => event.state().is_playing(),
            None => controller.source.playback_state().is_playing(),
        };
        if playing {
            controller.on_play();
        } else {
            controller.on_pause_or_ended();
        }
    }
}
