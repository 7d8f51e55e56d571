//! Children composition.

use crate::hosting::{CompatibilityContext, HostedContent, HostingAdapter};
use crate::view::{AnyView, ViewId};
use std::sync::Arc;

/// One slot in a parent’s child list.
#[derive(Debug, Clone)]
pub enum ChildRef {
    /// A natively composed view.
    Native(AnyView),
    /// A legacy adapter, which owns exactly one content view.
    Hosted(Arc<dyn HostingAdapter>),
}

impl ChildRef {
    /// The child’s own stable identity.
    pub fn id(&self) -> ViewId {
        match self {
            ChildRef::Native(view) => view.id(),
            ChildRef::Hosted(adapter) => adapter.id(),
        }
    }

    pub fn is_hosted(&self) -> bool {
        match self {
            ChildRef::Native(_) => false,
            ChildRef::Hosted(_) => true,
        }
    }
}

/// A rendered child.
#[derive(Debug, Clone)]
pub struct ComposedChild<R> {
    /// Position in the input child list; this is the child’s identity for diffing.
    pub index: usize,
    /// True if the view was unwrapped from a hosting adapter.
    pub is_hosting_view: bool,
    pub view: R,
}

/// The default transform: hands the view through unchanged.
pub fn passthrough(view: AnyView, is_hosting_view: bool) -> AnyView {
    let _ = is_hosting_view;
    view
}

/// Renders a child list, in order.
///
/// Holes render nothing. Native children are handed to `transform` as they are; hosted children
/// have their content view unwrapped and embedded under `context` first.
pub fn render_children<R, F>(
    children: &[Option<ChildRef>],
    context: &CompatibilityContext,
    mut transform: F,
) -> Vec<ComposedChild<R>>
where
    F: FnMut(AnyView, bool) -> R,
{
    let mut composed = Vec::with_capacity(children.len());
    for (index, child) in children.iter().enumerate() {
        let child = match child {
            Some(child) => child,
            None => continue,
        };

        let (view, is_hosting_view) = match child {
            ChildRef::Native(view) => (Arc::clone(view), false),
            ChildRef::Hosted(adapter) => {
                let hosted: AnyView = Arc::new(HostedContent::new(&**adapter, context.clone()));
                (hosted, true)
            }
        };

        composed.push(ComposedChild {
            index,
            is_hosting_view,
            view: transform(view, is_hosting_view),
        });
    }
    composed
}

/// Flattens a child list, skipping holes, keyed by each child’s own identity.
///
/// Hosted children are returned as they are.
pub fn children(children: &[Option<ChildRef>]) -> Vec<(ViewId, ChildRef)> {
    children
        .iter()
        .flatten()
        .map(|child| (child.id(), child.clone()))
        .collect()
}
