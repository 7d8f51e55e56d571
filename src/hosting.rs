//! Legacy single-view adapters.
//!
//! A hosting adapter wraps a legacy view implementation that owns exactly one content view.
//! Legacy content expects to live under a shadow node, which native composition doesn’t have; a
//! [`CompatibilityContext`] carrying a mock [`ShadowNodeProxy`] stands in for it.

use crate::rect::Rect;
use crate::view::{AnyView, View, ViewId};
use cgmath::Vector2;
use core::any::Any;
use std::sync::Arc;

/// A legacy single-view adapter.
pub trait HostingAdapter: Any + std::fmt::Debug + Send + Sync {
    /// The adapter’s identity.
    fn id(&self) -> ViewId;

    /// The one content view this adapter owns.
    fn content_view(&self) -> AnyView;

    /// The adapter’s frame.
    fn frame(&self) -> Rect {
        Rect::zero()
    }
}

/// Stand-in for the shadow node legacy content expects to be attached to.
///
/// Accepts every request and does nothing with it.
#[derive(Debug, Default)]
pub struct ShadowNodeProxy {
    _private: (),
}

impl ShadowNodeProxy {
    /// Always true.
    pub fn is_mock(&self) -> bool {
        true
    }

    /// Legacy content reports its intrinsic size here. Ignored.
    pub fn set_size(&self, size: Vector2<f64>) {
        let _ = size;
    }
}

/// The environment legacy content observes inside native composition.
///
/// Immutable; create one per composition pass or share one across passes.
#[derive(Debug, Clone, Default)]
pub struct CompatibilityContext {
    shadow_node: Arc<ShadowNodeProxy>,
}

impl CompatibilityContext {
    pub fn new() -> CompatibilityContext {
        CompatibilityContext::default()
    }

    pub fn shadow_node(&self) -> &ShadowNodeProxy {
        &self.shadow_node
    }
}

/// A hosting adapter’s content view, embedded under a compatibility context.
#[derive(Debug)]
pub struct HostedContent {
    adapter: ViewId,
    content: AnyView,
    frame: Rect,
    context: CompatibilityContext,
}

impl HostedContent {
    /// Unwraps an adapter’s content view.
    pub fn new(adapter: &dyn HostingAdapter, context: CompatibilityContext) -> HostedContent {
        HostedContent {
            adapter: adapter.id(),
            content: adapter.content_view(),
            frame: adapter.frame(),
            context,
        }
    }

    /// The adapter this content was taken from.
    pub fn adapter(&self) -> ViewId {
        self.adapter
    }

    pub fn content(&self) -> &AnyView {
        &self.content
    }

    pub fn context(&self) -> &CompatibilityContext {
        &self.context
    }
}

impl View for HostedContent {
    fn id(&self) -> ViewId {
        self.content.id()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn frame(&self) -> Rect {
        self.frame
    }
}
