//! Lifecycle hooks.

use crate::error::HookError;
use crate::view::{ViewInstance, ViewType};
use core::fmt;
use std::sync::Arc;

/// Lifecycle moments signaled by the host runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecyclePhase {
    /// The view was attached to the host tree.
    Mount,
    /// New props were applied.
    DidUpdateProps,
    /// The view is about to be discarded.
    Unmount,
}

type HookCallback<V> = dyn Fn(&ViewInstance<V>) -> Result<(), HookError> + Send + Sync;

/// A callback registered for one lifecycle phase.
pub struct LifecycleHook<V: ViewType> {
    phase: LifecyclePhase,
    callback: Arc<HookCallback<V>>,
}

impl<V: ViewType> LifecycleHook<V> {
    pub fn new<F>(phase: LifecyclePhase, callback: F) -> LifecycleHook<V>
    where
        F: 'static + Fn(&ViewInstance<V>) -> Result<(), HookError> + Send + Sync,
    {
        LifecycleHook {
            phase,
            callback: Arc::new(callback),
        }
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }
}

impl<V: ViewType> Clone for LifecycleHook<V> {
    fn clone(&self) -> Self {
        LifecycleHook {
            phase: self.phase,
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<V: ViewType> fmt::Debug for LifecycleHook<V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LifecycleHook<{:?}>", self.phase)
    }
}

/// Invokes every hook registered for `phase`, in registration order.
///
/// The first failing hook aborts the dispatch; its error is returned.
pub fn dispatch<V: ViewType>(
    hooks: &[LifecycleHook<V>],
    phase: LifecyclePhase,
    view: &ViewInstance<V>,
) -> Result<(), HookError> {
    for hook in hooks.iter().filter(|hook| hook.phase == phase) {
        (hook.callback)(view)?;
    }
    Ok(())
}
