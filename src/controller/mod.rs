//! Per-source controller: adaptive polling, hysteresis and lifecycle.
//!
//! ```text
//!   idle ──play──→ polling ──pause/ended──→ idle
//!     │               │
//!     └──── remove ───┴──→ destroyed (terminal)
//! ```
//!
//! Each cycle runs to completion under the controller's state lock with no
//! await point inside it. The polling task only sleeps between cycles, and
//! a generation counter stops a cancelled task from running a stale cycle.

mod tasks;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::analysis::{classify, RoutingMode};
use crate::backend::AudioContext;
use crate::config::{PollingConfig, SharedConfig};
use crate::graph::{ChannelSampler, RoutingGraph};
use crate::source::{MediaSource, SourceId};
use crate::{EngineEvent, EventCallback, MonoFixError};

/// Point-in-time view of one controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerStatus {
    /// The monitored source.
    pub source_id: SourceId,
    /// Routing in effect, or `None` before the first decision.
    pub mode: Option<RoutingMode>,
    /// Delay before the next cycle.
    pub poll_interval: Duration,
    /// Consecutive cycles that kept the mode unchanged.
    pub stable_run_length: u32,
    /// Whether a polling timer is outstanding.
    pub polling: bool,
    /// Whether the controller has been torn down.
    pub destroyed: bool,
}

/// Owns one source's routing graph and polling loop.
///
/// Cloning shares the same controller.
#[derive(Clone)]
pub(crate) struct SourceController {
    shared: Arc<ControllerShared>,
}

pub(crate) struct ControllerShared {
    source: Arc<dyn MediaSource>,
    source_id: SourceId,
    context: Arc<AudioContext>,
    config: SharedConfig,
    polling: PollingConfig,
    runtime: Handle,
    event_callback: Option<EventCallback>,
    state: Mutex<ControllerState>,
}

struct ControllerState {
    routing: RoutingGraph,
    sampler: ChannelSampler,
    mode: Option<RoutingMode>,
    poll_interval: Duration,
    stable_run_length: u32,
    timer: Option<JoinHandle<()>>,
    listener: Option<JoinHandle<()>>,
    generation: u64,
    destroyed: bool,
}

impl ControllerState {
    /// Aborts the outstanding timer, if any. Returns true if one existed.
    fn cancel_timer(&mut self) -> bool {
        self.generation += 1;
        match self.timer.take() {
            Some(timer) => {
                timer.abort();
                true
            }
            None => false,
        }
    }
}

/// Everything a controller needs from the engine.
pub(crate) struct ControllerDeps {
    pub context: Arc<AudioContext>,
    pub config: SharedConfig,
    pub polling: PollingConfig,
    pub runtime: Handle,
    pub event_callback: Option<EventCallback>,
}

impl SourceController {
    /// Builds the source's graph, claims its output and wires stereo.
    ///
    /// Polling does not begin until [`start`](Self::start).
    pub(crate) fn attach(
        source: Arc<dyn MediaSource>,
        deps: ControllerDeps,
    ) -> Result<Self, MonoFixError> {
        let source_id = source.id();
        deps.context.resume_if_suspended();

        let graph = deps.context.create_graph(deps.polling.window_size);
        if let Err(e) = source.claim_output(graph.clone()) {
            tracing::warn!(source = %source_id, error = %e, "cannot claim source output");
            return Err(e);
        }

        let state = ControllerState {
            routing: RoutingGraph::new(graph),
            sampler: ChannelSampler::new(deps.polling.window_size),
            mode: None,
            poll_interval: deps.polling.fast_interval,
            stable_run_length: 0,
            timer: None,
            listener: None,
            generation: 0,
            destroyed: false,
        };

        let shared = Arc::new(ControllerShared {
            source,
            source_id,
            context: deps.context,
            config: deps.config,
            polling: deps.polling,
            runtime: deps.runtime,
            event_callback: deps.event_callback,
            state: Mutex::new(state),
        });

        tracing::info!(
            source = %shared.source_id,
            graph = shared.state.lock().routing.graph().id(),
            "attached to source"
        );

        Ok(Self { shared })
    }

    /// Starts listening for playback events, and polls right away if the
    /// source is already playing.
    pub(crate) fn start(&self) {
        let events = self.shared.source.subscribe();
        {
            let mut state = self.shared.state.lock();
            if state.destroyed || state.listener.is_some() {
                return;
            }
            let listener = self
                .shared
                .runtime
                .spawn(tasks::watch_playback(Arc::downgrade(&self.shared), events));
            state.listener = Some(listener);
        }

        if self.shared.source.playback_state().is_playing() {
            self.shared.on_play();
        }
    }

    pub(crate) fn source_id(&self) -> &SourceId {
        &self.shared.source_id
    }

    #[cfg(test)]
    pub(crate) fn on_play(&self) {
        self.shared.on_play();
    }

    #[cfg(test)]
    pub(crate) fn on_pause_or_ended(&self) {
        self.shared.on_pause_or_ended();
    }

    pub(crate) fn reapply_config(&self) {
        self.shared.reapply_config();
    }

    pub(crate) fn destroy(&self) -> bool {
        self.shared.destroy()
    }

    pub(crate) fn status(&self) -> ControllerStatus {
        self.shared.status()
    }

    pub(crate) fn mode(&self) -> Option<RoutingMode> {
        self.shared.state.lock().mode
    }

    #[cfg(test)]
    pub(crate) fn graph(&self) -> crate::graph::GraphHandle {
        self.shared.state.lock().routing.graph().clone()
    }
}

/// Result of one polling cycle.
struct Cycle {
    event: Option<EngineEvent>,
    next: Option<Duration>,
}

impl Cycle {
    fn idle() -> Self {
        Self {
            event: None,
            next: None,
        }
    }
}

impl ControllerShared {
    fn emit(&self, event: Option<EngineEvent>) {
        if let (Some(callback), Some(event)) = (&self.event_callback, event) {
            callback(event);
        }
    }

    /// Fresh play: reset cadence and stability, run one cycle, schedule the next.
    ///
    /// Ignored while a timer is already outstanding.
    fn on_play(self: &Arc<Self>) {
        let event = {
            let mut state = self.state.lock();
            if state.destroyed || state.timer.is_some() {
                return;
            }
            state.poll_interval = self.polling.fast_interval;
            state.stable_run_length = 0;

            let cycle = self.run_cycle(&mut state);
            if let Some(delay) = cycle.next {
                state.generation += 1;
                let timer = self.runtime.spawn(tasks::poll_loop(
                    Arc::downgrade(self),
                    state.generation,
                    delay,
                ));
                state.timer = Some(timer);
            }
            cycle.event
        };
        self.emit(event);
    }

    fn on_pause_or_ended(&self) {
        let mut state = self.state.lock();
        if state.destroyed {
            return;
        }
        if state.cancel_timer() {
            tracing::debug!(source = %self.source_id, "playback stopped, polling paused");
        }
    }

    /// Runs the cycle scheduled for `generation`.
    ///
    /// Returns the delay before the following cycle, or `None` once this
    /// timer is finished.
    fn scheduled_cycle(&self, generation: u64) -> Option<Duration> {
        let (event, next) = {
            let mut state = self.state.lock();
            if state.destroyed || state.generation != generation {
                return None;
            }
            let cycle = self.run_cycle(&mut state);
            if cycle.next.is_none() {
                state.timer = None;
            }
            (cycle.event, cycle.next)
        };
        self.emit(event);
        next
    }

    fn run_cycle(&self, state: &mut ControllerState) -> Cycle {
        if state.destroyed {
            return Cycle::idle();
        }
        if !self.source.playback_state().is_playing() {
            tracing::debug!(source = %self.source_id, "source not playing, polling paused");
            return Cycle::idle();
        }

        self.context.resume_if_suspended();

        let levels = match state.sampler.sample(state.routing.graph()) {
            Ok(levels) => levels,
            Err(e) => {
                tracing::error!(source = %self.source_id, error = %e, "sampling failed");
                return Cycle::idle();
            }
        };

        let config = self.config.snapshot();
        let target = if config.enabled {
            classify(levels.left, levels.right, &config)
        } else {
            RoutingMode::Stereo
        };

        let event = if state.mode == Some(target) {
            state.stable_run_length = state.stable_run_length.saturating_add(1);
            None
        } else {
            state.routing.apply(target);
            state.mode = Some(target);
            state.stable_run_length = 0;
            tracing::info!(source = %self.source_id, mode = %target, "routing changed");
            Some(EngineEvent::ModeChanged {
                source_id: self.source_id.clone(),
                mode: target,
            })
        };

        if state.stable_run_length >= self.polling.stable_checks_before_slow {
            state.poll_interval = self.polling.slow_interval;
        }

        tracing::debug!(
            source = %self.source_id,
            rms_left = levels.left,
            rms_right = levels.right,
            mode = %target,
            stable = state.stable_run_length,
            interval_ms = state.poll_interval.as_millis() as u64,
            "check"
        );

        Cycle {
            event,
            next: Some(state.poll_interval),
        }
    }

    /// Re-decides from the current mode under the latest configuration.
    fn reapply_config(&self) {
        let event = {
            let mut state = self.state.lock();
            let Some(current) = state.mode else {
                return;
            };
            if state.destroyed {
                return;
            }

            let target = if self.config.snapshot().enabled {
                current
            } else {
                RoutingMode::Stereo
            };
            if target == current {
                return;
            }

            state.routing.apply(target);
            state.mode = Some(target);
            tracing::info!(source = %self.source_id, mode = %target, "routing changed by config");
            EngineEvent::ModeChanged {
                source_id: self.source_id.clone(),
                mode: target,
            }
        };
        self.emit(Some(event));
    }

    /// Cancels all work, disconnects the graph and releases the source.
    ///
    /// Returns false if already destroyed.
    fn destroy(&self) -> bool {
        {
            let mut state = self.state.lock();
            if state.destroyed {
                return false;
            }
            state.destroyed = true;
            state.cancel_timer();
            if let Some(listener) = state.listener.take() {
                listener.abort();
            }
            state.routing.teardown();
        }
        self.source.release_output();
        tracing::info!(source = %self.source_id, "detached from source");
        true
    }

    fn status(&self) -> ControllerStatus {
        let state = self.state.lock();
        ControllerStatus {
            source_id: self.source_id.clone(),
            mode: state.mode,
            poll_interval: state.poll_interval,
            stable_run_length: state.stable_run_length,
            polling: state.timer.is_some(),
            destroyed: state.destroyed,
        }
    }
}
