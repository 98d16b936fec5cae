//! Node/port/connection model for one source's signal path.

use std::collections::BTreeSet;

use ringbuf::traits::{Consumer, Observer, RingBuffer};
use ringbuf::HeapRb;

use crate::analysis::RoutingMode;

/// Byte value the analysers report for a zero sample.
const BYTE_CENTER: u8 = 128;

/// A processing node inside a source's graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Node {
    /// The source's stereo output, as handed to the graph.
    Input,
    /// Splits the stereo input into output 0 (left) and output 1 (right).
    Splitter,
    /// Unity-gain summing node used for mono routing.
    Combiner,
    /// Merges input 0 (left) and input 1 (right) back into stereo.
    Merger,
    /// Records the most recent left-channel samples.
    LeftAnalyser,
    /// Records the most recent right-channel samples.
    RightAnalyser,
    /// What the listener hears.
    Output,
}

impl Node {
    /// Every node, in a fixed order.
    pub const ALL: [Node; 7] = [
        Node::Input,
        Node::Splitter,
        Node::Combiner,
        Node::Merger,
        Node::LeftAnalyser,
        Node::RightAnalyser,
        Node::Output,
    ];
}

/// A directed edge from one node's output port to another node's input port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Connection {
    /// Upstream node.
    pub from: Node,
    /// Output port on `from`.
    pub output: u8,
    /// Downstream node.
    pub to: Node,
    /// Input port on `to`.
    pub input: u8,
}

impl Connection {
    /// Creates a connection.
    pub const fn new(from: Node, output: u8, to: Node, input: u8) -> Self {
        Self {
            from,
            output,
            to,
            input,
        }
    }
}

/// Stereo paths: L to L, R to R.
pub(crate) const STEREO_PATHS: [Connection; 2] = [
    Connection::new(Node::Splitter, 0, Node::Merger, 0),
    Connection::new(Node::Splitter, 1, Node::Merger, 1),
];

/// Mono paths: L and R into the combiner, combiner out to both sides.
pub(crate) const MONO_PATHS: [Connection; 4] = [
    Connection::new(Node::Splitter, 0, Node::Combiner, 0),
    Connection::new(Node::Splitter, 1, Node::Combiner, 0),
    Connection::new(Node::Combiner, 0, Node::Merger, 0),
    Connection::new(Node::Combiner, 0, Node::Merger, 1),
];

/// Wiring that never changes while the graph is alive.
pub(crate) const STATIC_PATHS: [Connection; 4] = [
    Connection::new(Node::Input, 0, Node::Splitter, 0),
    Connection::new(Node::Splitter, 0, Node::LeftAnalyser, 0),
    Connection::new(Node::Splitter, 1, Node::RightAnalyser, 0),
    Connection::new(Node::Merger, 0, Node::Output, 0),
];

/// Which analyser to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Left channel.
    Left,
    /// Right channel.
    Right,
}

/// Keeps the most recent `window_size` samples of one channel.
struct ChannelAnalyser {
    history: HeapRb<f32>,
}

impl ChannelAnalyser {
    fn new(window_size: usize) -> Self {
        Self {
            history: HeapRb::new(window_size.max(1)),
        }
    }

    fn push(&mut self, sample: f32) {
        self.history.push_overwrite(sample);
    }

    /// Writes the newest samples as bytes centered at 128, oldest first.
    ///
    /// Positions not yet covered by recorded audio read as silence.
    fn read_bytes(&self, out: &mut [u8]) {
        let available = self.history.occupied_len().min(out.len());
        let skip = self.history.occupied_len() - available;
        let pad = out.len() - available;

        out[..pad].fill(BYTE_CENTER);
        for (slot, &sample) in out[pad..].iter_mut().zip(self.history.iter().skip(skip)) {
            *slot = sample_to_byte(sample);
        }
    }

    fn clear(&mut self) {
        self.history.clear();
    }
}

/// Converts a float sample in [-1, 1] to an unsigned byte centered at 128.
fn sample_to_byte(sample: f32) -> u8 {
    ((sample + 1.0) * 128.0).clamp(0.0, 255.0) as u8
}

/// The signal path of one source.
///
/// Renders interleaved stereo blocks in place according to whatever
/// connections currently exist, and feeds the analysers along the way.
pub struct SignalGraph {
    id: u64,
    connections: BTreeSet<Connection>,
    combiner_gain: f32,
    left: ChannelAnalyser,
    right: ChannelAnalyser,
}

impl SignalGraph {
    /// Creates a graph with no connections.
    pub(crate) fn new(id: u64, window_size: usize) -> Self {
        Self {
            id,
            connections: BTreeSet::new(),
            combiner_gain: 1.0,
            left: ChannelAnalyser::new(window_size),
            right: ChannelAnalyser::new(window_size),
        }
    }

    /// Identifier assigned by the audio context.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Adds a connection. Connecting an existing edge again changes nothing.
    pub fn connect(&mut self, connection: Connection) {
        self.connections.insert(connection);
    }

    /// Removes every edge from `from` to `to`, returning how many were removed.
    ///
    /// Disconnecting nodes that are not connected is a no-op.
    pub fn disconnect(&mut self, from: Node, to: Node) -> usize {
        let before = self.connections.len();
        self.connections.retain(|c| !(c.from == from && c.to == to));
        before - self.connections.len()
    }

    /// Removes every outgoing edge of `node`.
    pub fn disconnect_node(&mut self, node: Node) -> usize {
        let before = self.connections.len();
        self.connections.retain(|c| c.from != node);
        before - self.connections.len()
    }

    /// Returns true if the exact edge exists.
    pub fn is_connected(&self, connection: &Connection) -> bool {
        self.connections.contains(connection)
    }

    /// All current connections, in a stable order.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    /// Number of current connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Infers the active routing from the switchable paths.
    ///
    /// Returns `None` unless exactly one mode's paths are present and nothing
    /// else connects the splitter, combiner and merger.
    pub fn active_routing(&self) -> Option<RoutingMode> {
        let switchable: BTreeSet<Connection> = self
            .connections
            .iter()
            .filter(|c| is_switchable(c))
            .copied()
            .collect();

        if switchable == STEREO_PATHS.into_iter().collect() {
            Some(RoutingMode::Stereo)
        } else if switchable == MONO_PATHS.into_iter().collect() {
            Some(RoutingMode::Mono)
        } else {
            None
        }
    }

    /// Renders one interleaved stereo block in place.
    ///
    /// A trailing half frame is left untouched.
    pub fn render(&mut self, block: &mut [f32]) {
        let edges: Vec<Connection> = self.connections.iter().copied().collect();
        let fed = edges.iter().any(|c| c.from == Node::Input && c.to == Node::Splitter);
        let audible = edges.iter().any(|c| c.from == Node::Merger && c.to == Node::Output);

        for frame in block.chunks_exact_mut(2) {
            let split = if fed { [frame[0], frame[1]] } else { [0.0; 2] };
            let mut combined = 0.0;
            let mut merged = [0.0_f32; 2];

            for edge in edges.iter().filter(|c| c.from == Node::Splitter) {
                let value = split[usize::from(edge.output.min(1))];
                match edge.to {
                    Node::LeftAnalyser => self.left.push(value),
                    Node::RightAnalyser => self.right.push(value),
                    Node::Combiner => combined += value,
                    Node::Merger => merged[usize::from(edge.input.min(1))] += value,
                    _ => {}
                }
            }

            combined *= self.combiner_gain;
            for edge in edges
                .iter()
                .filter(|c| c.from == Node::Combiner && c.to == Node::Merger)
            {
                merged[usize::from(edge.input.min(1))] += combined;
            }

            if audible {
                frame.copy_from_slice(&merged);
            } else {
                frame.fill(0.0);
            }
        }
    }

    /// Reads the latest window of one channel as unsigned bytes.
    pub fn read_window(&self, channel: Channel, out: &mut [u8]) {
        match channel {
            Channel::Left => self.left.read_bytes(out),
            Channel::Right => self.right.read_bytes(out),
        }
    }

    /// Forgets all recorded analyser history.
    pub(crate) fn clear_history(&mut self) {
        self.left.clear();
        self.right.clear();
    }
}

fn is_switchable(c: &Connection) -> bool {
    matches!(
        (c.from, c.to),
        (Node::Splitter, Node::Merger | Node::Combiner) | (Node::Combiner, Node::Merger)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wired(paths: &[Connection]) -> SignalGraph {
        let mut graph = SignalGraph::new(1, 4);
        for &c in STATIC_PATHS.iter().chain(paths) {
            graph.connect(c);
        }
        graph
    }

    #[test]
    fn test_disconnect_missing_edge_is_noop() {
        let mut graph = SignalGraph::new(1, 4);
        assert_eq!(graph.disconnect(Node::Splitter, Node::Merger), 0);
        assert_eq!(graph.disconnect_node(Node::Combiner), 0);
    }

    #[test]
    fn test_disconnect_removes_all_ports_between_nodes() {
        let mut graph = wired(&STEREO_PATHS);
        assert_eq!(graph.disconnect(Node::Splitter, Node::Merger), 2);
        assert_eq!(graph.connection_count(), STATIC_PATHS.len());
    }

    #[test]
    fn test_active_routing_detection() {
        assert_eq!(wired(&STEREO_PATHS).active_routing(), Some(RoutingMode::Stereo));
        assert_eq!(wired(&MONO_PATHS).active_routing(), Some(RoutingMode::Mono));
        assert_eq!(wired(&[]).active_routing(), None);

        let mut both = wired(&STEREO_PATHS);
        for c in MONO_PATHS {
            both.connect(c);
        }
        assert_eq!(both.active_routing(), None);
    }

    #[test]
    fn test_render_stereo_passthrough() {
        let mut graph = wired(&STEREO_PATHS);
        let mut block = vec![0.5, -0.25, 0.1, 0.2];
        graph.render(&mut block);
        assert_eq!(block, vec![0.5, -0.25, 0.1, 0.2]);
    }

    #[test]
    fn test_render_mono_sum_reaches_both_sides() {
        let mut graph = wired(&MONO_PATHS);
        let mut block = vec![0.5, 0.0, 0.0, 0.25];
        graph.render(&mut block);
        assert_eq!(block, vec![0.5, 0.5, 0.25, 0.25]);
    }

    #[test]
    fn test_render_without_output_is_silent() {
        let mut graph = SignalGraph::new(1, 4);
        let mut block = vec![0.5, 0.5];
        graph.render(&mut block);
        assert_eq!(block, vec![0.0, 0.0]);
    }

    #[test]
    fn test_render_feeds_analysers() {
        let mut graph = wired(&STEREO_PATHS);
        let mut block = vec![-0.5, 0.5, -0.5, 0.5];
        graph.render(&mut block);

        let mut left = [0u8; 4];
        let mut right = [0u8; 4];
        graph.read_window(Channel::Left, &mut left);
        graph.read_window(Channel::Right, &mut right);

        // two recorded samples, two padded with silence
        assert_eq!(left, [128, 128, 64, 64]);
        assert_eq!(right, [128, 128, 192, 192]);
    }

    #[test]
    fn test_analyser_keeps_most_recent_window() {
        let mut graph = wired(&STEREO_PATHS);
        let mut block: Vec<f32> = [-1.0, 0.0].repeat(4);
        block.extend([0.0, 0.0].repeat(2));
        graph.render(&mut block);

        let mut left = [0u8; 4];
        graph.read_window(Channel::Left, &mut left);
        assert_eq!(left, [0, 0, 128, 128]);
    }

    #[test]
    fn test_clear_history_reads_silence() {
        let mut graph = wired(&STEREO_PATHS);
        let mut block = vec![-1.0, -1.0];
        graph.render(&mut block);
        graph.clear_history();

        let mut left = [0u8; 4];
        graph.read_window(Channel::Left, &mut left);
        assert_eq!(left, [128; 4]);
    }

    #[test]
    fn test_sample_to_byte_clamps() {
        assert_eq!(sample_to_byte(0.0), 128);
        assert_eq!(sample_to_byte(-1.0), 0);
        assert_eq!(sample_to_byte(1.0), 255);
        assert_eq!(sample_to_byte(-3.0), 0);
    }
}
