use crate::config::Capabilities;
use crate::error::{BridgeError, FunctionError};
use crate::events::{Event, EventSender};
use crate::hosting::CompatibilityContext;
use core::any::Any;
use core::fmt;
use crossbeam::channel::{self, Receiver, TryRecvError};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Creates script-host objects. Provided by the host runtime.
pub trait ScriptBridge: Send + Sync {
    /// Creates a fresh, empty script-host object.
    fn create_object(&self) -> Result<Box<dyn ScriptObject>, BridgeError>;
}

/// An object living in the host runtime’s script environment.
pub trait ScriptObject: Any + fmt::Debug {
    /// Exposes a function on this object.
    fn set_function(&mut self, name: &str, function: ExposedFunction);

    /// For downcasting.
    fn as_any(&self) -> &dyn Any;
}

type FunctionBody = dyn Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync;

/// A function exposed to the script environment.
#[derive(Clone)]
pub struct ExposedFunction(Arc<FunctionBody>);

impl ExposedFunction {
    pub fn new<F>(function: F) -> ExposedFunction
    where
        F: 'static + Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync,
    {
        ExposedFunction(Arc::new(function))
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, FunctionError> {
        (self.0)(args)
    }
}

impl fmt::Debug for ExposedFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ExposedFunction")
    }
}

/// A script-host object that just keeps its functions in a map.
///
/// For hosts without a script engine of their own, and for testing.
#[derive(Debug, Default)]
pub struct PlainObject {
    functions: BTreeMap<String, ExposedFunction>,
}

impl PlainObject {
    /// Names of all exposed functions, sorted.
    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    /// Calls an exposed function.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, FunctionError> {
        match self.functions.get(name) {
            Some(function) => function.call(args),
            None => Err(FunctionError::Unknown {
                name: name.to_string(),
            }),
        }
    }
}

impl ScriptObject for PlainObject {
    fn set_function(&mut self, name: &str, function: ExposedFunction) {
        self.functions.insert(name.to_string(), function);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A bridge that hands out [`PlainObject`]s.
#[derive(Debug, Default)]
pub struct PlainBridge;

impl ScriptBridge for PlainBridge {
    fn create_object(&self) -> Result<Box<dyn ScriptObject>, BridgeError> {
        Ok(Box::new(PlainObject::default()))
    }
}

/// Connects views to the host runtime.
///
/// Owns the dispatch channel all views send their events through, and the script bridge, if the
/// host runtime provides one. Shared by all definitions; views only hold weak references to it.
pub struct RuntimeContext {
    capabilities: Capabilities,
    compatibility: CompatibilityContext,
    bridge: Option<Box<dyn ScriptBridge>>,
    event_sender: EventSender,
    event_recv: Receiver<Event>,
}

impl RuntimeContext {
    /// Creates a new runtime context without a script bridge.
    pub fn new(capabilities: Capabilities) -> RuntimeContext {
        let (event_sender, event_recv) = channel::unbounded();

        RuntimeContext {
            capabilities,
            compatibility: CompatibilityContext::new(),
            bridge: None,
            event_sender,
            event_recv,
        }
    }

    /// Attaches a script bridge.
    pub fn with_bridge<B: ScriptBridge + 'static>(mut self, bridge: B) -> RuntimeContext {
        self.bridge = Some(Box::new(bridge));
        self
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// The compatibility context hosted legacy content is composed under.
    pub fn compatibility_context(&self) -> &CompatibilityContext {
        &self.compatibility
    }

    /// The script bridge.
    pub fn script_bridge(&self) -> Result<&dyn ScriptBridge, BridgeError> {
        self.bridge.as_deref().ok_or(BridgeError::Unavailable)
    }

    pub(crate) fn event_sender(&self) -> EventSender {
        self.event_sender.clone()
    }

    /// Receives all pending events from the dispatch channel.
    pub fn poll_events(&self) -> Vec<Event> {
        let mut events = Vec::new();
        loop {
            match self.event_recv.try_recv() {
                Ok(event) => events.push(event),
                // the context holds a sender itself, so it can’t be disconnected
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }
}

impl fmt::Debug for RuntimeContext {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RuntimeContext")
            .field("capabilities", &self.capabilities)
            .field("has_bridge", &self.bridge.is_some())
            .field("pending_events", &self.event_recv.len())
            .finish()
    }
}
