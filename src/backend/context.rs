//! The shared audio context.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::graph::{GraphHandle, SignalGraph, STATIC_PATHS};

/// Whether the context is processing audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Processing audio.
    Running,
    /// Created but not yet allowed to process (autoplay restrictions).
    Suspended,
}

/// Process-lifetime audio context shared by every source controller.
///
/// Hands out statically wired signal graphs, one per source.
#[derive(Debug)]
pub struct AudioContext {
    backend_name: &'static str,
    sample_rate: u32,
    suspended: AtomicBool,
    next_graph_id: AtomicU64,
}

impl AudioContext {
    /// Creates a context. Called by [`AudioBackend`](crate::backend::AudioBackend) implementations.
    pub fn new(backend_name: &'static str, sample_rate: u32, state: ContextState) -> Self {
        tracing::info!(
            backend = backend_name,
            sample_rate,
            ?state,
            "audio context created"
        );
        Self {
            backend_name,
            sample_rate,
            suspended: AtomicBool::new(state == ContextState::Suspended),
            next_graph_id: AtomicU64::new(1),
        }
    }

    /// Name of the backend that created this context.
    pub fn backend_name(&self) -> &'static str {
        self.backend_name
    }

    /// Processing sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Current state.
    pub fn state(&self) -> ContextState {
        if self.suspended.load(Ordering::SeqCst) {
            ContextState::Suspended
        } else {
            ContextState::Running
        }
    }

    /// Resumes a suspended context. Returns true if it was suspended.
    pub fn resume_if_suspended(&self) -> bool {
        let was_suspended = self.suspended.swap(false, Ordering::SeqCst);
        if was_suspended {
            tracing::debug!(backend = self.backend_name, "audio context resumed");
        }
        was_suspended
    }

    /// Suspends the context.
    pub fn suspend(&self) {
        self.suspended.store(true, Ordering::SeqCst);
    }

    /// Creates a graph with its static wiring in place:
    /// input to splitter, splitter to both analysers, merger to output.
    ///
    /// No routing exists between splitter and merger yet.
    pub fn create_graph(&self, window_size: usize) -> GraphHandle {
        let id = self.next_graph_id.fetch_add(1, Ordering::SeqCst);
        let mut graph = SignalGraph::new(id, window_size);
        for connection in STATIC_PATHS {
            graph.connect(connection);
        }
        GraphHandle::new(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_if_suspended() {
        let context = AudioContext::new("test", 48000, ContextState::Suspended);
        assert!(context.resume_if_suspended());
        assert_eq!(context.state(), ContextState::Running);
        assert!(!context.resume_if_suspended());

        context.suspend();
        assert_eq!(context.state(), ContextState::Suspended);
    }

    #[test]
    fn test_create_graph_has_static_wiring_only() {
        let context = AudioContext::new("test", 48000, ContextState::Running);
        let graph = context.create_graph(32);

        assert_eq!(graph.connection_count(), STATIC_PATHS.len());
        assert_eq!(graph.active_routing(), None);
    }

    #[test]
    fn test_graph_ids_are_unique() {
        let context = AudioContext::new("test", 48000, ContextState::Running);
        let a = context.create_graph(32);
        let b = context.create_graph(32);
        assert_ne!(a.id(), b.id());
        assert!(!a.same_graph(&b));
    }
}
