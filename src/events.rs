//! Events.
//!
//! Event fields on a property bag are [`EventEmitter`]s. The factory binds every emitter of a new
//! view to that view's dispatch channel; from then on, emitting sends an [`Event`] to the host
//! runtime, which picks it up whenever it polls.

use crate::view::ViewId;
use core::fmt;
use crossbeam::channel::Sender;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use tracing::trace;

/// An event on its way to the host runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// The view that emitted the event.
    pub view: ViewId,

    /// Resolved event name, as reported to the host runtime.
    pub name: String,

    /// Event payload.
    pub payload: Value,
}

pub(crate) type EventSender = Sender<Event>;

struct Binding {
    view: ViewId,
    name: String,
    sender: EventSender,
}

/// An event field.
///
/// Clones share the same binding, so an emitter may be moved into callback closures.
#[derive(Clone, Default)]
pub struct EventEmitter {
    custom_name: Option<&'static str>,
    binding: Arc<Mutex<Option<Binding>>>,
}

impl EventEmitter {
    /// Creates an emitter whose name is derived from its field label.
    pub fn new() -> EventEmitter {
        EventEmitter::default()
    }

    /// Creates an emitter with a custom event name.
    pub fn named(name: &'static str) -> EventEmitter {
        EventEmitter {
            custom_name: Some(name),
            binding: Arc::default(),
        }
    }

    /// The custom event name, if any.
    pub fn custom_name(&self) -> Option<&'static str> {
        self.custom_name
    }

    /// Returns true once the emitter has been wired to a dispatch channel.
    pub fn is_bound(&self) -> bool {
        self.binding.lock().is_some()
    }

    /// Sends an event to the host runtime.
    ///
    /// Returns false if the event was dropped, which happens if the emitter hasn’t been bound yet
    /// or the host runtime has gone away.
    pub fn emit(&self, payload: Value) -> bool {
        let binding = self.binding.lock();
        let binding = match &*binding {
            Some(binding) => binding,
            None => {
                trace!(custom_name = ?self.custom_name, "dropping event from unbound emitter");
                return false;
            }
        };

        let event = Event {
            view: binding.view,
            name: binding.name.clone(),
            payload,
        };
        if binding.sender.send(event).is_err() {
            trace!(view = ?binding.view, name = %binding.name, "dispatch channel is disconnected");
            return false;
        }
        true
    }

    /// Routes this emitter through a view’s dispatch channel.
    pub(crate) fn bind(&self, view: ViewId, name: String, sender: EventSender) {
        *self.binding.lock() = Some(Binding { view, name, sender });
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &*self.binding.lock() {
            Some(binding) => write!(f, "EventEmitter({:?})", binding.name),
            None => write!(f, "EventEmitter(unbound)"),
        }
    }
}
