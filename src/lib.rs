//! # mono-fix
//!
//! **Note:** This crate is under active development. The API may change before 1.0.
//!
//! Real-time one-ear detection with live stereo/mono-sum routing.
//!
//! Some media intermittently carries audio in only one channel. `mono-fix`
//! watches each source's left and right levels and, when one ear goes silent
//! (or, in aggressive mode, much quieter), routes both channels summed to
//! both ears. Genuine stereo passes through untouched.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mono_fix::{Engine, EngineEvent, OfflineBackend};
//!
//! let engine = Engine::builder()
//!     .backend(OfflineBackend::new())
//!     .on_event(|e| tracing::info!(?e, "mono-fix event"))
//!     .build()?;
//!
//! // Discovery hands sources over as they appear and disappear
//! engine.on_source_added(player.clone())?;
//! // ...
//! engine.on_source_removed(&player.id());
//! ```
//!
//! ## Architecture
//!
//! - **Energy estimator / classifier** ([`analysis`]): pure RMS and one-ear decision
//! - **Signal graph** ([`graph`]): per-source nodes, analysers and switchable routing
//! - **Source controller**: adaptive polling with hysteresis, one per source
//! - **Engine**: registry of controllers, shared audio context, config broadcast
//!
//! Polling runs on Tokio timers. A cycle never awaits, so a source's cycles
//! are strictly sequential and teardown always sees a consistent graph.

#![warn(missing_docs)]
// Level math converts between sample formats on purpose
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_lossless
)]
// unwrap/expect allowed in tests only
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::missing_panics_doc, clippy::missing_errors_doc)]

pub mod analysis;
pub mod backend;
mod config;
mod controller;
mod engine;
mod error;
mod event;
pub mod graph;
pub mod source;
mod status;

pub use analysis::RoutingMode;
pub use backend::{AudioBackend, OfflineBackend};
pub use config::{EngineConfig, PollingConfig, SharedConfig};
pub use controller::ControllerStatus;
pub use engine::{Engine, EngineBuilder};
pub use error::MonoFixError;
pub use event::{event_callback, EngineEvent, EventCallback};
pub use source::{MediaSource, MockSource, PlaybackEvent, PlaybackState, SourceId};
pub use status::{EngineStatus, StatusLabel};

#[cfg(feature = "device-probe")]
pub use backend::DeviceBackend;
