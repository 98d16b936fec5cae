//! Mock media source for testing without a host player.

use parking_lot::Mutex;
use tokio::sync::broadcast;

use super::{MediaSource, PlaybackEvent, PlaybackState, SourceId, PLAYBACK_EVENT_CAPACITY};
use crate::graph::GraphHandle;
use crate::MonoFixError;

enum Output {
    Free,
    Claimed(GraphHandle),
    /// Held by a consumer outside this crate.
    Foreign,
}

struct MockState {
    playback: PlaybackState,
    output: Output,
}

/// A scriptable media source that generates synthetic stereo audio.
///
/// Playback transitions are driven by [`play`](Self::play),
/// [`pause`](Self::pause) and [`end`](Self::end). Audio blocks rendered with
/// [`render`](Self::render) go through the claimed graph, exactly as a real
/// player's output would.
///
/// # Example
///
/// ```
/// use mono_fix::source::MockSource;
///
/// let mock = MockSource::new("player-1");
///
/// // 32 frames with audio only in the left ear
/// let mut block = mock.square_block(32, 0.5, 0.0);
/// mock.render(&mut block);
/// ```
pub struct MockSource {
    id: SourceId,
    sample_rate: u32,
    events: broadcast::Sender<PlaybackEvent>,
    state: Mutex<MockState>,
}

impl MockSource {
    /// Creates a paused mock source at 48kHz.
    pub fn new(id: impl Into<SourceId>) -> Self {
        let (events, _) = broadcast::channel(PLAYBACK_EVENT_CAPACITY);
        Self {
            id: id.into(),
            sample_rate: 48000,
            events,
            state: Mutex::new(MockState {
                playback: PlaybackState::Paused,
                output: Output::Free,
            }),
        }
    }

    /// Starts out already playing.
    #[must_use]
    pub fn playing(self) -> Self {
        self.state.lock().playback = PlaybackState::Playing;
        self
    }

    /// Starts out with its output held by some other consumer.
    #[must_use]
    pub fn claimed_elsewhere(self) -> Self {
        self.state.lock().output = Output::Foreign;
        self
    }

    /// Uses a different sample rate for generated tones.
    #[must_use]
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Returns the sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Starts or resumes playback.
    pub fn play(&self) {
        self.transition(PlaybackEvent::Play);
    }

    /// Pauses playback.
    pub fn pause(&self) {
        self.transition(PlaybackEvent::Pause);
    }

    /// Ends playback.
    pub fn end(&self) {
        self.transition(PlaybackEvent::Ended);
    }

    fn transition(&self, event: PlaybackEvent) {
        self.state.lock().playback = event.state();
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    /// Returns true while a graph holds this source's output.
    pub fn is_claimed(&self) -> bool {
        matches!(self.state.lock().output, Output::Claimed(_))
    }

    /// The graph currently holding the output, if any.
    pub fn claimed_graph(&self) -> Option<GraphHandle> {
        match &self.state.lock().output {
            Output::Claimed(graph) => Some(graph.clone()),
            _ => None,
        }
    }

    /// Plays one interleaved stereo block.
    ///
    /// With a claimed output the block is rendered in place through the
    /// graph; otherwise it passes through untouched.
    pub fn render(&self, block: &mut [f32]) {
        if let Some(graph) = self.claimed_graph() {
            graph.render(block);
        }
    }

    /// Generates an interleaved sine block with independent per-ear amplitude.
    pub fn sine_block(&self, frequency: f64, frames: usize, left: f32, right: f32) -> Vec<f32> {
        let sample_rate = f64::from(self.sample_rate);
        let mut block = Vec::with_capacity(frames * 2);

        for i in 0..frames {
            let t = i as f64 / sample_rate;
            let value = (2.0 * std::f64::consts::PI * frequency * t).sin() as f32;
            block.push(value * left);
            block.push(value * right);
        }
        block
    }

    /// Generates an interleaved square block alternating sign every frame.
    ///
    /// A channel's RMS equals its amplitude, which makes levels exact.
    pub fn square_block(&self, frames: usize, left: f32, right: f32) -> Vec<f32> {
        let mut block = Vec::with_capacity(frames * 2);
        for i in 0..frames {
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            block.push(sign * left);
            block.push(sign * right);
        }
        block
    }

    /// Generates an interleaved block of silence.
    pub fn silence_block(&self, frames: usize) -> Vec<f32> {
        vec![0.0; frames * 2]
    }
}

impl MediaSource for MockSource {
    fn id(&self) -> SourceId {
        self.id.clone()
    }

    fn playback_state(&self) -> PlaybackState {
        self.state.lock().playback
    }

    fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events.subscribe()
    }

    fn claim_output(&self, graph: GraphHandle) -> Result<(), MonoFixError> {
        let mut state = self.state.lock();
        match state.output {
            Output::Free => {
                state.output = Output::Claimed(graph);
                Ok(())
            }
            Output::Claimed(_) | Output::Foreign => Err(MonoFixError::already_claimed(&self.id)),
        }
    }

    fn release_output(&self) {
        let mut state = self.state.lock();
        if matches!(state.output, Output::Claimed(_)) {
            state.output = Output::Free;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{AudioContext, ContextState};
    use crate::graph::RoutingGraph;

    fn graph() -> GraphHandle {
        let context = AudioContext::new("test", 48000, ContextState::Running);
        RoutingGraph::new(context.create_graph(32)).graph().clone()
    }

    #[test]
    fn test_mock_source_starts_paused() {
        let mock = MockSource::new("a");
        assert_eq!(mock.playback_state(), PlaybackState::Paused);
        assert_eq!(
            MockSource::new("b").playing().playback_state(),
            PlaybackState::Playing
        );
    }

    #[test]
    fn test_transitions_are_published() {
        let mock = MockSource::new("a");
        let mut events = mock.subscribe();

        mock.play();
        mock.pause();
        mock.end();

        assert_eq!(events.try_recv().unwrap(), PlaybackEvent::Play);
        assert_eq!(events.try_recv().unwrap(), PlaybackEvent::Pause);
        assert_eq!(events.try_recv().unwrap(), PlaybackEvent::Ended);
        assert_eq!(mock.playback_state(), PlaybackState::Ended);
    }

    #[test]
    fn test_claim_is_exclusive() {
        let mock = MockSource::new("a");
        mock.claim_output(graph()).unwrap();
        assert!(mock.is_claimed());

        let second = mock.claim_output(graph());
        assert!(matches!(
            second,
            Err(MonoFixError::SourceAlreadyClaimed { .. })
        ));

        mock.release_output();
        assert!(!mock.is_claimed());
    }

    #[test]
    fn test_claimed_elsewhere_refuses_claim() {
        let mock = MockSource::new("a").claimed_elsewhere();
        assert!(mock.claim_output(graph()).is_err());

        // releasing does not take the output from the foreign holder
        mock.release_output();
        assert!(mock.claim_output(graph()).is_err());
    }

    #[test]
    fn test_render_without_claim_passes_through() {
        let mock = MockSource::new("a");
        let mut block = mock.square_block(4, 0.5, 0.0);
        let original = block.clone();
        mock.render(&mut block);
        assert_eq!(block, original);
    }

    #[test]
    fn test_render_goes_through_claimed_graph() {
        let mock = MockSource::new("a");
        let graph = graph();
        mock.claim_output(graph.clone()).unwrap();

        let mut block = mock.square_block(4, 0.5, 0.0);
        mock.render(&mut block);
        assert_eq!(&block[..2], &[0.5, 0.0]);

        let mut levels = crate::graph::ChannelSampler::new(32);
        let levels = levels.sample(&graph).unwrap();
        assert!(levels.left > 0.0);
        assert_eq!(levels.right, 0.0);
    }

    #[test]
    fn test_sine_block_shape() {
        let mock = MockSource::new("a").with_sample_rate(16000);
        let block = mock.sine_block(440.0, 160, 1.0, 0.0);

        assert_eq!(block.len(), 320);
        assert!(block.iter().step_by(2).any(|&s| s > 0.0));
        assert!(block.iter().step_by(2).any(|&s| s < 0.0));
        assert!(block.iter().skip(1).step_by(2).all(|&s| s == 0.0));
    }
}
