//! Native view definitions for a host UI runtime.
//!
//! # Conceptual overview
//! A host runtime owns a component tree and asks for native views by name: “create a view named
//! `Slider` with these properties”. Roost turns statically declared view types into what the host
//! needs for that.
//!
//! ## Property bags
//! Every view type has a property bag: a plain struct of [`Field`]s (props the host can set) and
//! [`EventEmitter`]s (events the view can send), and optionally an ordered list of children.
//! Bags describe their own fields (see [`impl_props`]), so prop and event names can be read off a
//! throwaway default instance, before any real view exists and without a hand-written registry.
//!
//! ## Definitions
//! A [`ViewDefinition`] is the immutable metadata for one view type, built once at registration
//! time from a list of [`Element`]s: a name override, prop and event declarations, lifecycle hooks
//! and functions exposed to the host’s script environment. The [`ViewRegistry`] holds all
//! definitions by name and is what the host runtime talks to.
//!
//! ## Views
//! A definition creates one [`ViewInstance`] per tree node. Each instance owns a fresh property
//! bag whose event fields are wired to the runtime’s dispatch channel; the host drains that channel
//! with [`RuntimeContext::poll_events`]. View types that wrap a legacy single-view adapter are
//! backed by that adapter; all others are composed natively. If the runtime build can’t compose
//! views natively, a placeholder carrying a diagnostic is handed out instead.
//!
//! ## Children
//! Child lists may mix native views and legacy adapters, and may have holes. [`render_children`]
//! flattens them in order, unwrapping each adapter’s content view and embedding it under a
//! [`CompatibilityContext`] that stands in for the shadow node legacy content expects.
//!
//! ## Threading
//! Everything here is driven from the host runtime’s render thread. Nothing is designed for
//! concurrent use of the same definition or view; types are `Send + Sync` only so handles may
//! be stored wherever the host likes.

pub mod children;
pub mod config;
pub mod definition;
pub mod error;
pub mod events;
pub mod host;
pub mod hosting;
pub mod inspector;
pub mod lifecycle;
#[macro_use]
pub mod props;
pub mod rect;
pub mod registry;
pub mod view;

pub use children::{children, passthrough, render_children, ChildRef, ComposedChild};
pub use config::Capabilities;
pub use definition::{Element, ViewDefinition, ViewProp};
pub use error::{BridgeError, DefinitionError, FunctionError, HookError, PropError, UpdateError};
pub use events::{Event, EventEmitter};
pub use host::{
    ExposedFunction, PlainBridge, PlainObject, RuntimeContext, ScriptBridge, ScriptObject,
};
pub use hosting::{CompatibilityContext, HostedContent, HostingAdapter, ShadowNodeProxy};
pub use inspector::Schema;
pub use lifecycle::{LifecycleHook, LifecyclePhase};
pub use props::{Field, PropertyBag, Reflect, Staged};
pub use rect::Rect;
pub use registry::{AnyDefinition, ViewRegistry};
pub use view::{
    AnyView, AnyViewInstance, BindingState, PlatformView, Strategy, UnimplementedView, View,
    ViewId, ViewInstance, ViewType,
};
