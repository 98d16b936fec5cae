//! Live switching between stereo passthrough and mono-sum routing.

use crate::analysis::RoutingMode;
use crate::graph::{GraphHandle, Node, SignalGraph, MONO_PATHS, STEREO_PATHS};

/// Two-mode routing over a source's signal graph.
///
/// Every switch first removes all paths between the splitter and the merger,
/// then connects the paths of the new mode, so the two modes are never wired
/// in parallel. The graph starts in stereo.
pub struct RoutingGraph {
    graph: GraphHandle,
    mode: RoutingMode,
    torn_down: bool,
}

impl RoutingGraph {
    /// Takes over a statically wired graph and applies stereo routing.
    pub fn new(graph: GraphHandle) -> Self {
        connect_mode(&mut graph.lock(), RoutingMode::Stereo);
        Self {
            graph,
            mode: RoutingMode::Stereo,
            torn_down: false,
        }
    }

    /// Routes left to left and right to right.
    pub fn apply_stereo(&mut self) {
        self.apply(RoutingMode::Stereo);
    }

    /// Sums both channels and sends the sum to both outputs.
    pub fn apply_mono(&mut self) {
        self.apply(RoutingMode::Mono);
    }

    /// Switches to `mode`. Applying the current mode again rewires the same paths.
    ///
    /// Does nothing once the graph has been torn down.
    pub fn apply(&mut self, mode: RoutingMode) {
        if self.torn_down {
            return;
        }
        connect_mode(&mut self.graph.lock(), mode);
        self.mode = mode;
        tracing::debug!(graph = self.graph.id(), %mode, "applied routing");
    }

    /// Mode most recently applied.
    pub fn mode(&self) -> RoutingMode {
        self.mode
    }

    /// The underlying graph.
    pub fn graph(&self) -> &GraphHandle {
        &self.graph
    }

    /// Disconnects every node. Irreversible.
    pub fn teardown(&mut self) {
        let mut graph = self.graph.lock();
        for node in Node::ALL {
            graph.disconnect_node(node);
        }
        graph.clear_history();
        self.torn_down = true;
    }

    /// Returns true after [`teardown`](Self::teardown).
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

fn connect_mode(graph: &mut SignalGraph, mode: RoutingMode) {
    graph.disconnect(Node::Splitter, Node::Merger);
    graph.disconnect(Node::Splitter, Node::Combiner);
    graph.disconnect(Node::Combiner, Node::Merger);

    let paths: &[_] = match mode {
        RoutingMode::Stereo => &STEREO_PATHS,
        RoutingMode::Mono => &MONO_PATHS,
    };
    for &connection in paths {
        graph.connect(connection);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{SignalGraph, STATIC_PATHS};

    fn routing() -> RoutingGraph {
        let mut graph = SignalGraph::new(7, 8);
        for c in STATIC_PATHS {
            graph.connect(c);
        }
        RoutingGraph::new(GraphHandle::new(graph))
    }

    #[test]
    fn test_starts_in_stereo() {
        let routing = routing();
        assert_eq!(routing.mode(), RoutingMode::Stereo);
        assert_eq!(routing.graph().active_routing(), Some(RoutingMode::Stereo));
    }

    #[test]
    fn test_mono_then_stereo_leaves_only_stereo_paths() {
        let mut routing = routing();
        routing.apply_mono();
        assert_eq!(routing.graph().active_routing(), Some(RoutingMode::Mono));

        routing.apply_stereo();
        let connections = routing.graph().connections();
        assert_eq!(routing.graph().active_routing(), Some(RoutingMode::Stereo));
        assert!(!connections.iter().any(|c| c.from == Node::Combiner));
        assert!(!connections.iter().any(|c| c.to == Node::Combiner));
        assert_eq!(connections.len(), STATIC_PATHS.len() + STEREO_PATHS.len());
    }

    #[test]
    fn test_repeated_apply_is_idempotent() {
        let mut routing = routing();
        routing.apply_mono();
        routing.apply_mono();
        assert_eq!(
            routing.graph().connection_count(),
            STATIC_PATHS.len() + MONO_PATHS.len()
        );
    }

    #[test]
    fn test_mono_routing_delivers_both_channels_to_each_ear() {
        let mut routing = routing();
        routing.apply_mono();

        let mut block = vec![0.0, 0.3, 0.0, 0.3];
        routing.graph().render(&mut block);
        assert_eq!(block, vec![0.3, 0.3, 0.3, 0.3]);
    }

    #[test]
    fn test_teardown_disconnects_everything() {
        let mut routing = routing();
        routing.apply_mono();
        routing.teardown();

        assert!(routing.is_torn_down());
        assert_eq!(routing.graph().connection_count(), 0);

        // no rewiring after teardown
        routing.apply_stereo();
        assert_eq!(routing.graph().connection_count(), 0);
    }
}
