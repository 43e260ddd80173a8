//! Layout engine bootstrap shared by concurrent render calls.
//!
//! The precompiled layout module may only be loaded and registered once per
//! process; every render call funnels through an [`EngineGate`] that collapses
//! concurrent first callers into a single load and replays the outcome, good
//! or bad, to everyone who arrives later.

use crate::{Error, Result};
use futures::future::BoxFuture;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, OnceLock};
use tokio::sync::OnceCell;

/// Opaque handle to a loaded layout module.
///
/// Produced by a [`LayoutModuleLoader`], handed to the renderer exactly once
/// during bootstrap. The pipeline itself never looks inside; loader and
/// renderer agree on the concrete type via [`EngineHandle::downcast_ref`].
#[derive(Clone)]
pub struct EngineHandle {
    raw: Arc<dyn Any + Send + Sync>,
}

impl EngineHandle {
    /// Wrap a loader-specific engine value.
    pub fn new<T: Any + Send + Sync>(engine: T) -> Self {
        Self {
            raw: Arc::new(engine),
        }
    }

    /// Recover the loader-specific value, if `T` is what the loader stored.
    pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.raw.downcast_ref()
    }
}

impl fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EngineHandle")
    }
}

/// Loads the precompiled layout module from its raw bytes.
///
/// Loading is a suspension point (the module may be compiled or validated
/// asynchronously); failures should carry enough detail to diagnose a corrupt
/// or missing module, since they are cached for the rest of the gate's life.
pub trait LayoutModuleLoader: Send + Sync {
    fn load<'a>(&'a self, module: &'a [u8]) -> BoxFuture<'a, Result<EngineHandle>>;
}

/// Lifecycle of a layout engine behind an [`EngineGate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

/// One-shot initialization gate for the layout engine.
///
/// The first caller runs the init future; callers arriving while it is in
/// flight await the same future instead of starting a second load. Once the
/// outcome is known it is final: success hands out clones of the same
/// [`EngineHandle`], failure re-delivers the same [`Error::EngineInit`]
/// without retrying. A gate never resets.
pub struct EngineGate {
    cell: OnceCell<std::result::Result<EngineHandle, String>>,
    state: Mutex<EngineState>,
}

impl EngineGate {
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
            state: Mutex::new(EngineState::Uninitialized),
        }
    }

    /// The process-wide gate used by pipelines that do not bring their own.
    pub fn global() -> Arc<EngineGate> {
        static GLOBAL: OnceLock<Arc<EngineGate>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(EngineGate::new())).clone()
    }

    /// Current lifecycle state, for observability and tests.
    pub fn state(&self) -> EngineState {
        *self.state.lock().unwrap()
    }

    fn set_state(&self, next: EngineState) {
        *self.state.lock().unwrap() = next;
    }

    /// Run `init` at most once for this gate and share its outcome with every
    /// caller, present and future.
    pub async fn ensure_ready<F, Fut>(&self, init: F) -> Result<EngineHandle>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<EngineHandle>>,
    {
        let outcome = self
            .cell
            .get_or_init(|| async {
                self.set_state(EngineState::Initializing);
                log::debug!("loading layout module");
                match init().await {
                    Ok(handle) => {
                        self.set_state(EngineState::Ready);
                        Ok(handle)
                    }
                    Err(err) => {
                        log::warn!("layout module initialization failed: {}", err);
                        self.set_state(EngineState::Failed);
                        // Keep the message, not the double-wrapped kind
                        Err(match err {
                            Error::EngineInit(msg) => msg,
                            other => other.to_string(),
                        })
                    }
                }
            })
            .await;

        match outcome {
            Ok(handle) => Ok(handle.clone()),
            Err(message) => Err(Error::EngineInit(message.clone())),
        }
    }
}

impl Default for EngineGate {
    fn default() -> Self {
        Self::new()
    }
}
