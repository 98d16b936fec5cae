//! Channel analysis: loudness estimation and one-ear classification.
//!
//! Both stages are pure functions of a single sample window. Smoothing over
//! time belongs to the source controller.

mod classify;
mod level;

pub use classify::{classify, RoutingMode, AGGRESSIVE_RATIO, SILENCE_THRESHOLD};
pub use level::{rms, ChannelLevels};
