//! The engine: registry of live source controllers.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;

use crate::analysis::RoutingMode;
use crate::backend::{default_backend, AudioBackend, AudioContext, ContextState};
use crate::controller::{ControllerDeps, ControllerStatus, SourceController};
use crate::source::{MediaSource, SourceId};
use crate::status::{EngineStatus, StatusLabel};
use crate::{
    event_callback, EngineConfig, EngineEvent, EventCallback, MonoFixError, PollingConfig,
    SharedConfig,
};

/// Monitors media sources and routes each one as stereo or mono.
///
/// Holds the registry of live source controllers, the lazily created
/// audio context they share, and the shared configuration.
///
/// # Example
///
/// ```ignore
/// use mono_fix::{Engine, OfflineBackend};
///
/// let engine = Engine::builder()
///     .backend(OfflineBackend::new())
///     .on_event(|event| tracing::info!(?event, "mono-fix"))
///     .build()?;
///
/// engine.on_source_added(player)?;
/// ```
pub struct Engine {
    backend: Box<dyn AudioBackend>,
    context: Mutex<Option<Arc<AudioContext>>>,
    controllers: Mutex<HashMap<SourceId, SourceController>>,
    config: SharedConfig,
    polling: PollingConfig,
    runtime: Handle,
    event_callback: Option<EventCallback>,
}

impl Engine {
    /// Creates a new builder.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Starts monitoring a source.
    ///
    /// Adding a source that is already registered does nothing. A source that
    /// is already playing starts polling right away.
    ///
    /// # Errors
    ///
    /// - [`MonoFixError::BackendUnavailable`] if the shared audio context
    ///   cannot be created; a
    ///   [`EngineEvent::BackendUnavailable`] is emitted too.
    /// - [`MonoFixError::SourceAlreadyClaimed`] if something else holds the
    ///   source's output.
    ///
    /// Either way the source keeps playing unmodified.
    pub fn on_source_added(&self, source: Arc<dyn MediaSource>) -> Result<(), MonoFixError> {
        let source_id = source.id();

        let attached = {
            let mut controllers = self.controllers.lock();
            if controllers.contains_key(&source_id) {
                tracing::debug!(source = %source_id, "source already monitored");
                return Ok(());
            }
            self.audio_context()
                .and_then(|context| {
                    SourceController::attach(
                        source,
                        ControllerDeps {
                            context,
                            config: self.config.clone(),
                            polling: self.polling.clone(),
                            runtime: self.runtime.clone(),
                            event_callback: self.event_callback.clone(),
                        },
                    )
                })
                .map(|controller| {
                    controllers.insert(source_id.clone(), controller.clone());
                    controller
                })
        };

        match attached {
            Ok(controller) => {
                self.emit(EngineEvent::SourceAttached { source_id });
                controller.start();
                Ok(())
            }
            Err(e) => {
                if let MonoFixError::BackendUnavailable { reason } = &e {
                    self.emit(EngineEvent::BackendUnavailable {
                        reason: reason.clone(),
                    });
                }
                Err(e)
            }
        }
    }

    /// Stops monitoring a source and releases its output.
    ///
    /// Returns false if the source was not registered.
    pub fn on_source_removed(&self, source_id: &SourceId) -> bool {
        let removed = self.controllers.lock().remove(source_id);
        match removed {
            Some(controller) => {
                controller.destroy();
                self.emit(EngineEvent::SourceDetached {
                    source_id: source_id.clone(),
                });
                true
            }
            None => false,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> EngineConfig {
        self.config.snapshot()
    }

    /// Replaces the configuration and re-applies it to every live source.
    pub fn set_config(&self, config: EngineConfig) {
        let previous = self.config.replace(config);
        tracing::info!(?previous, current = ?config, "configuration replaced");
        self.broadcast_config();
    }

    /// Flips the master switch. Returns the new value.
    pub fn toggle_enabled(&self) -> bool {
        let config = self.config.update(|c| c.enabled = !c.enabled);
        tracing::info!(enabled = config.enabled, "toggled mono fix");
        self.broadcast_config();
        config.enabled
    }

    /// Flips aggressive detection. Returns the new value.
    pub fn toggle_aggressive(&self) -> bool {
        let config = self.config.update(|c| c.aggressive_mode = !c.aggressive_mode);
        tracing::info!(aggressive = config.aggressive_mode, "toggled aggressive mode");
        self.broadcast_config();
        config.aggressive_mode
    }

    /// Routing currently in effect for a source.
    ///
    /// `None` if the source is unknown or not yet classified.
    pub fn mode(&self, source_id: &SourceId) -> Option<RoutingMode> {
        let controller = self.controllers.lock().get(source_id).cloned()?;
        controller.mode()
    }

    /// Status of a single source.
    pub fn source_status(&self, source_id: &SourceId) -> Option<ControllerStatus> {
        let controller = self.controllers.lock().get(source_id).cloned()?;
        Some(controller.status())
    }

    /// Snapshot of every live source plus the indicator label.
    pub fn status(&self) -> EngineStatus {
        let config = self.config.snapshot();
        let mut sources: Vec<ControllerStatus> = self
            .live_controllers()
            .iter()
            .map(SourceController::status)
            .collect();
        sources.sort_by(|a, b| a.source_id.cmp(&b.source_id));

        let label = StatusLabel::for_mode(sources.first().and_then(|s| s.mode), &config);
        EngineStatus {
            config,
            label,
            sources,
        }
    }

    /// Ids of every live source, sorted.
    pub fn source_ids(&self) -> Vec<SourceId> {
        let mut ids: Vec<SourceId> = self.controllers.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of live sources.
    pub fn len(&self) -> usize {
        self.controllers.lock().len()
    }

    /// Returns true if no source is monitored.
    pub fn is_empty(&self) -> bool {
        self.controllers.lock().is_empty()
    }

    /// State of the shared audio context, or `None` before the first source.
    pub fn context_state(&self) -> Option<ContextState> {
        self.context.lock().as_ref().map(|context| context.state())
    }

    /// Releases every source.
    pub fn shutdown(&self) {
        let drained: Vec<SourceController> = self
            .controllers
            .lock()
            .drain()
            .map(|(_, controller)| controller)
            .collect();

        for controller in drained {
            controller.destroy();
            self.emit(EngineEvent::SourceDetached {
                source_id: controller.source_id().clone(),
            });
        }
    }

    /// Returns the shared context, creating it on first use.
    ///
    /// A failure is not remembered; the next source tries again.
    fn audio_context(&self) -> Result<Arc<AudioContext>, MonoFixError> {
        let mut slot = self.context.lock();
        if let Some(context) = slot.as_ref() {
            return Ok(context.clone());
        }

        match self.backend.create_context() {
            Ok(context) => {
                let context = Arc::new(context);
                *slot = Some(context.clone());
                Ok(context)
            }
            Err(e) => {
                tracing::warn!(backend = self.backend.name(), error = %e, "mono fix disabled for this source");
                Err(e)
            }
        }
    }

    fn live_controllers(&self) -> Vec<SourceController> {
        self.controllers.lock().values().cloned().collect()
    }

    fn broadcast_config(&self) {
        for controller in self.live_controllers() {
            controller.reapply_config();
        }
    }

    fn emit(&self, event: EngineEvent) {
        if let Some(ref callback) = self.event_callback {
            callback(event);
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        for (_, controller) in self.controllers.get_mut().drain() {
            controller.destroy();
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("backend", &self.backend.name())
            .field("sources", &self.len())
            .field("config", &self.config.snapshot())
            .finish_non_exhaustive()
    }
}

/// Builder for configuring an [`Engine`].
#[must_use]
pub struct EngineBuilder {
    backend: Option<Box<dyn AudioBackend>>,
    config: EngineConfig,
    polling: PollingConfig,
    runtime: Option<Handle>,
    event_callback: Option<EventCallback>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            backend: None,
            config: EngineConfig::default(),
            polling: PollingConfig::default(),
            runtime: None,
            event_callback: None,
        }
    }

    /// Set the audio backend.
    ///
    /// Default: [`default_backend()`](crate::backend::default_backend).
    pub fn backend(mut self, backend: impl AudioBackend + 'static) -> Self {
        self.backend = Some(Box::new(backend));
        self
    }

    /// Set the initial configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the polling tunables.
    pub fn polling(mut self, polling: PollingConfig) -> Self {
        self.polling = polling;
        self
    }

    /// Set the runtime the polling tasks run on.
    ///
    /// Default: the runtime `build()` is called from.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Set an event callback for engine notifications.
    pub fn on_event<F>(mut self, callback: F) -> Self
    where
        F: Fn(EngineEvent) + Send + Sync + 'static,
    {
        self.event_callback = Some(event_callback(callback));
        self
    }

    /// Validates the settings and builds the engine.
    ///
    /// No audio context is created until the first source is added.
    ///
    /// # Errors
    ///
    /// - [`MonoFixError::InvalidInput`] for invalid polling tunables.
    /// - [`MonoFixError::NoRuntime`] outside a Tokio runtime without a
    ///   [`runtime`](Self::runtime) handle.
    pub fn build(self) -> Result<Engine, MonoFixError> {
        self.polling.validate()?;

        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| MonoFixError::NoRuntime)?,
        };
        let backend = self.backend.unwrap_or_else(default_backend);

        tracing::info!(
            backend = backend.name(),
            enabled = self.config.enabled,
            aggressive = self.config.aggressive_mode,
            "engine created"
        );

        Ok(Engine {
            backend,
            context: Mutex::new(None),
            controllers: Mutex::new(HashMap::new()),
            config: SharedConfig::new(self.config),
            polling: self.polling,
            runtime,
            event_callback: self.event_callback,
        })
    }
}
