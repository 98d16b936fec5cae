//! Engine notifications.
//!
//! Events are informational: the engine keeps running after any of them.
//! They are delivered after every internal lock is released, so a callback
//! may call back into the [`Engine`](crate::Engine).

use std::sync::Arc;

use crate::analysis::RoutingMode;
use crate::source::SourceId;

/// Notifications emitted by the engine.
///
/// # Example
///
/// ```
/// use mono_fix::EngineEvent;
///
/// fn handle_event(event: EngineEvent) {
///     match event {
///         EngineEvent::ModeChanged { source_id, mode } => {
///             eprintln!("{source_id} now routed as {mode}");
///         }
///         EngineEvent::BackendUnavailable { reason } => {
///             eprintln!("audio processing unavailable: {reason}");
///         }
///         EngineEvent::SourceAttached { source_id } => {
///             eprintln!("monitoring {source_id}");
///         }
///         EngineEvent::SourceDetached { source_id } => {
///             eprintln!("released {source_id}");
///         }
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A source's routing switched.
    ///
    /// Also emitted for the first decision after a source is attached.
    ModeChanged {
        /// The source whose routing changed.
        source_id: SourceId,
        /// The routing now in effect.
        mode: RoutingMode,
    },

    /// The audio backend could not be created.
    ///
    /// The source that triggered the attempt plays unmodified; the engine
    /// tries again for the next source.
    BackendUnavailable {
        /// Why creation failed.
        reason: String,
    },

    /// A source is now monitored.
    SourceAttached {
        /// The attached source.
        source_id: SourceId,
    },

    /// A source was released and plays unmodified from now on.
    SourceDetached {
        /// The released source.
        source_id: SourceId,
    },
}

impl EngineEvent {
    /// The source this event concerns, if any.
    pub fn source_id(&self) -> Option<&SourceId> {
        match self {
            Self::ModeChanged { source_id, .. }
            | Self::SourceAttached { source_id }
            | Self::SourceDetached { source_id } => Some(source_id),
            Self::BackendUnavailable { .. } => None,
        }
    }
}

/// Callback type for receiving engine events.
///
/// Register one via [`EngineBuilder::on_event()`].
///
/// [`EngineBuilder::on_event()`]: crate::EngineBuilder::on_event
///
/// # Example
///
/// ```ignore
/// use mono_fix::Engine;
///
/// let engine = Engine::builder()
///     .on_event(|event| {
///         tracing::info!(?event, "mono-fix event");
///     })
///     .build()?;
/// ```
pub type EventCallback = Arc<dyn Fn(EngineEvent) + Send + Sync>;

/// Creates an [`EventCallback`] from a closure.
///
/// # Example
///
/// ```
/// use mono_fix::{event_callback, EngineEvent};
///
/// let callback = event_callback(|event| {
///     println!("Got event: {:?}", event);
/// });
/// ```
pub fn event_callback<F>(f: F) -> EventCallback
where
    F: Fn(EngineEvent) + Send + Sync + 'static,
{
    Arc::new(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_event_debug() {
        let event = EngineEvent::ModeChanged {
            source_id: SourceId::new("player-1"),
            mode: RoutingMode::Mono,
        };
        let debug = format!("{event:?}");
        assert!(debug.contains("ModeChanged"));
        assert!(debug.contains("Mono"));
    }

    #[test]
    fn test_source_id_accessor() {
        let attached = EngineEvent::SourceAttached {
            source_id: SourceId::new("a"),
        };
        assert_eq!(attached.source_id(), Some(&SourceId::new("a")));

        let unavailable = EngineEvent::BackendUnavailable {
            reason: "none".to_string(),
        };
        assert_eq!(unavailable.source_id(), None);
    }

    #[test]
    fn test_event_callback_helper() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let called = Arc::new(AtomicBool::new(false));
        let called_clone = called.clone();

        let callback = event_callback(move |_| {
            called_clone.store(true, Ordering::SeqCst);
        });

        callback(EngineEvent::BackendUnavailable {
            reason: String::new(),
        });
        assert!(called.load(Ordering::SeqCst));
    }
}
