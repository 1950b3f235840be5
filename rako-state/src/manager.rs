//! Per-bridge synchronizer: registration demand drives the listener task
//!
//! [`BridgeSync`] owns the registry and the listener task handle of one
//! bridge behind a single async mutex. Registration and deregistration hold
//! that mutex across their check-then-act, so the 0→1 transition spawns
//! exactly one listener and the 1→0 transition stops it exactly once. The
//! listener task takes the same mutex to read the registry while dispatching.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use rako_protocol::{Bridge, LevelCache, ListenerFactory};

use crate::config::SyncConfig;
use crate::error::Result;
use crate::observer::{LightObserver, Observer, SwitchObserver};
use crate::registry::Registry;
use crate::worker::{run_listener, ListenerContext};

/// State guarded by the per-bridge mutex
#[derive(Debug, Default)]
pub(crate) struct BridgeState {
    pub(crate) registry: Registry,
    listener: Option<ListenerTask>,
}

/// A spawned listener and the token that stops it
#[derive(Debug)]
struct ListenerTask {
    cancel: CancellationToken,
    handle: JoinHandle<Result<()>>,
}

/// Lifecycle of the bridge's listener task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerStatus {
    /// No task recorded
    Stopped,
    /// Task recorded and still running
    Running,
    /// Task recorded but it has ended on its own (transport failure).
    /// It is not restarted until every observer deregisters and one
    /// registers again.
    Terminated,
}

/// Keeps registered lights and switches of one bridge in sync with its
/// status broadcasts
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use rako_protocol::Bridge;
/// use rako_state::{BridgeSync, LightEntity, Observer, SyncConfig};
///
/// let bridge = Bridge::new("192.168.1.20".parse()?, "Rako", "00:11:22:33:44:55");
/// let sync = BridgeSync::new(bridge.clone(), SyncConfig::default())?;
///
/// let lamp = Arc::new(LightEntity::new(&bridge, 3, 1, "Lamp"));
/// sync.register_for_updates(&Observer::light(lamp.clone())).await;
///
/// let mut brightness = lamp.subscribe();
/// while brightness.changed().await.is_ok() {
///     println!("Lamp: {}", *brightness.borrow());
/// }
/// ```
pub struct BridgeSync {
    bridge: Arc<Bridge>,
    levels: Arc<LevelCache>,
    factory: Arc<dyn ListenerFactory>,
    config: SyncConfig,
    state: Arc<Mutex<BridgeState>>,
}

impl BridgeSync {
    /// Create a synchronizer listening on real UDP sockets
    pub fn new(bridge: Bridge, config: SyncConfig) -> Result<Self> {
        let factory = Arc::new(config.listener_factory());
        Self::with_factory(bridge, config, factory)
    }

    /// Create a synchronizer with a custom listener factory
    pub fn with_factory(
        bridge: Bridge,
        config: SyncConfig,
        factory: Arc<dyn ListenerFactory>,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            bridge: Arc::new(bridge),
            levels: Arc::new(LevelCache::new()),
            factory,
            config,
            state: Arc::new(Mutex::new(BridgeState::default())),
        })
    }

    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Scene levels used to expand scene broadcasts; populated by the host
    pub fn level_cache(&self) -> &LevelCache {
        &self.levels
    }

    /// Register an observer; the first registration starts the listener
    pub async fn register_for_updates(&self, observer: &Observer) {
        let mut state = self.state.lock().await;
        state.registry.register(observer);

        let count = state.registry.size();
        tracing::debug!(
            "Registered {:?} on {} ({} registered)",
            observer,
            self.bridge.id(),
            count
        );

        if count == 1 {
            if state.listener.is_some() {
                tracing::debug!("Listener already recorded for {}", self.bridge.id());
            } else {
                state.listener = Some(self.spawn_listener());
            }
        }
    }

    /// Deregister an observer; the last deregistration stops the listener
    /// and waits for it to finish
    pub async fn deregister_for_updates(&self, observer: &Observer) {
        let mut state = self.state.lock().await;
        state.registry.deregister(observer);

        let count = state.registry.size();
        tracing::debug!(
            "Deregistered {:?} on {} ({} registered)",
            observer,
            self.bridge.id(),
            count
        );

        if count == 0 {
            if let Some(task) = state.listener.take() {
                self.stop_listener(task).await;
            }
        }
    }

    /// Bridge teardown: drop every registration and stop the listener
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        state.registry.clear();

        if let Some(task) = state.listener.take() {
            self.stop_listener(task).await;
        }
    }

    pub async fn lookup_light(&self, unique_id: &str) -> Option<Arc<dyn LightObserver>> {
        self.state.lock().await.registry.lookup_light(unique_id)
    }

    pub async fn lookup_switch(&self, unique_id: &str) -> Option<Arc<dyn SwitchObserver>> {
        self.state.lock().await.registry.lookup_switch(unique_id)
    }

    pub async fn registered_count(&self) -> usize {
        self.state.lock().await.registry.size()
    }

    pub async fn listener_status(&self) -> ListenerStatus {
        match &self.state.lock().await.listener {
            None => ListenerStatus::Stopped,
            Some(task) if task.handle.is_finished() => ListenerStatus::Terminated,
            Some(_) => ListenerStatus::Running,
        }
    }

    fn spawn_listener(&self) -> ListenerTask {
        let cancel = CancellationToken::new();
        let ctx = ListenerContext {
            bridge: Arc::clone(&self.bridge),
            levels: Arc::clone(&self.levels),
            factory: Arc::clone(&self.factory),
            state: Arc::clone(&self.state),
        };

        tracing::info!("Starting status listener for {}", self.bridge);
        let handle = tokio::spawn(run_listener(ctx, cancel.clone()));

        ListenerTask { cancel, handle }
    }

    /// Cancel the listener and wait for it, aborting after the shutdown timeout
    async fn stop_listener(&self, task: ListenerTask) {
        let ListenerTask { cancel, mut handle } = task;
        cancel.cancel();

        let joined = match tokio::time::timeout(self.config.shutdown_timeout, &mut handle).await {
            Ok(joined) => joined,
            Err(_) => {
                tracing::warn!(
                    "Status listener for {} did not stop within {:?}, aborting",
                    self.bridge,
                    self.config.shutdown_timeout
                );
                handle.abort();
                handle.await
            }
        };

        match joined {
            Ok(Ok(())) => tracing::info!("Status listener for {} stopped", self.bridge),
            Ok(Err(e)) => {
                tracing::debug!("Status listener for {} had already ended: {}", self.bridge, e)
            }
            Err(e) if e.is_cancelled() => {
                tracing::debug!("Status listener for {} cancelled", self.bridge)
            }
            Err(e) => tracing::error!("Status listener for {} panicked: {}", self.bridge, e),
        }
    }
}

impl Drop for BridgeSync {
    fn drop(&mut self) {
        // Without an async context the task can only be signalled, not awaited.
        if let Ok(mut state) = self.state.try_lock() {
            if let Some(task) = state.listener.take() {
                tracing::debug!("BridgeSync for {} dropped with a running listener", self.bridge);
                task.cancel.cancel();
            }
        }
    }
}
