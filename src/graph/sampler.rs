//! Pulls analyser windows out of a graph and measures them.

use crate::analysis::ChannelLevels;
use crate::graph::{Channel, GraphHandle};
use crate::MonoFixError;

/// Reads fixed-size left/right windows from a graph's analysers.
///
/// Buffers are allocated once and reused for every sample.
pub struct ChannelSampler {
    left: Vec<u8>,
    right: Vec<u8>,
}

impl ChannelSampler {
    /// Creates a sampler reading `window_size` samples per channel.
    pub fn new(window_size: usize) -> Self {
        Self {
            left: vec![0; window_size],
            right: vec![0; window_size],
        }
    }

    /// Samples both channels and returns their RMS levels.
    ///
    /// # Errors
    ///
    /// Returns [`MonoFixError::InvalidInput`] if the sampler was built with
    /// an empty window.
    pub fn sample(&mut self, graph: &GraphHandle) -> Result<ChannelLevels, MonoFixError> {
        {
            let graph = graph.lock();
            graph.read_window(Channel::Left, &mut self.left);
            graph.read_window(Channel::Right, &mut self.right);
        }
        ChannelLevels::from_windows(&self.left, &self.right)
    }

    /// The most recently sampled windows.
    pub fn windows(&self) -> (&[u8], &[u8]) {
        (&self.left, &self.right)
    }
}
