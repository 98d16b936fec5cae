//! Per-source signal graph and the routing built on top of it.
//!
//! ```text
//! Input → Splitter ─┬─ L ─→ LeftAnalyser
//!                   ├─ R ─→ RightAnalyser
//!                   └─ (stereo: L→L, R→R | mono: L+R → Combiner → L, R) → Merger → Output
//! ```
//!
//! - **Signal graph**: nodes and connections, renders interleaved stereo blocks
//! - **Routing graph**: switches the paths between splitter and merger
//! - **Channel sampler**: reads analyser windows and turns them into levels

mod node;
mod routing;
mod sampler;

pub use node::{Channel, Connection, Node, SignalGraph};
pub use routing::RoutingGraph;
pub use sampler::ChannelSampler;

pub(crate) use node::{MONO_PATHS, STATIC_PATHS, STEREO_PATHS};

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::analysis::RoutingMode;

/// Shared handle to a source's [`SignalGraph`].
///
/// The audio path renders through it while the controller samples and
/// rewires it; both sides lock the same graph. Cloning is cheap.
#[derive(Clone)]
pub struct GraphHandle {
    inner: Arc<Mutex<SignalGraph>>,
}

impl GraphHandle {
    pub(crate) fn new(graph: SignalGraph) -> Self {
        Self {
            inner: Arc::new(Mutex::new(graph)),
        }
    }

    /// Renders one interleaved stereo block in place.
    pub fn render(&self, block: &mut [f32]) {
        self.inner.lock().render(block);
    }

    /// Identifier assigned by the audio context.
    pub fn id(&self) -> u64 {
        self.inner.lock().id()
    }

    /// Snapshot of every current connection.
    pub fn connections(&self) -> Vec<Connection> {
        self.inner.lock().connections().copied().collect()
    }

    /// Number of current connections.
    pub fn connection_count(&self) -> usize {
        self.inner.lock().connection_count()
    }

    /// Routing currently wired between splitter and merger, if well-formed.
    pub fn active_routing(&self) -> Option<RoutingMode> {
        self.inner.lock().active_routing()
    }

    /// Returns true if both handles point at the same graph.
    pub fn same_graph(&self, other: &GraphHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, SignalGraph> {
        self.inner.lock()
    }
}

impl std::fmt::Debug for GraphHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphHandle")
            .field("id", &self.id())
            .field("connections", &self.connection_count())
            .finish()
    }
}
