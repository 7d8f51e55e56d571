use crate::children::{passthrough, render_children, ChildRef, ComposedChild};
use crate::error::PropError;
use crate::events::EventSender;
use crate::host::RuntimeContext;
use crate::hosting::{CompatibilityContext, HostingAdapter};
use crate::props::PropertyBag;
use crate::rect::Rect;
use core::any::Any;
use core::fmt;
use core::marker::PhantomData;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::sync::{Arc, Weak};
use uuid::Uuid;

/// A unique identifier for a view.
///
/// (this is just a UUID)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(u32, u16, u16, [u8; 8]);

impl ViewId {
    pub fn new() -> ViewId {
        let uuid = Uuid::new_v4();
        let (a, b, c, d) = uuid.as_fields();
        ViewId(a, b, c, *d)
    }
}

/// Anything the rendering engine can be handed.
pub trait View: Any + fmt::Debug + Send + Sync {
    /// The view’s stable identity.
    fn id(&self) -> ViewId;

    /// For downcasting.
    fn as_any(&self) -> &dyn Any;

    /// The view’s frame, if it has one of its own.
    fn frame(&self) -> Rect {
        Rect::zero()
    }
}

/// A type-erased view handle.
pub type AnyView = Arc<dyn View>;

/// A statically declared view type.
///
/// ```text
/// struct Slider;
/// impl ViewType for Slider {
///     type Props = SliderProps;
/// }
/// ```
pub trait ViewType: 'static {
    /// The property bag of this view type.
    type Props: PropertyBag;

    /// The declared identifier; used as the definition name unless overridden.
    ///
    /// Defaults to the type’s name without its module path.
    fn name() -> String {
        short_type_name(core::any::type_name::<Self>()).to_string()
    }

    /// Returns an adapter around a legacy view if this view type wraps one.
    ///
    /// View types that return an adapter are instantiated with the hosting strategy.
    fn legacy_adapter(context: &RuntimeContext) -> Option<Arc<dyn HostingAdapter>> {
        let _ = context;
        None
    }

    /// Renders the view’s contents.
    ///
    /// Renders the bag’s children by default.
    fn body(props: &Self::Props, context: &CompatibilityContext) -> Vec<ComposedChild<AnyView>> {
        match props.children() {
            Some(children) => render_children(children, context, passthrough),
            None => Vec::new(),
        }
    }
}

/// Strips the module path and generic arguments from a type name.
fn short_type_name(name: &str) -> &str {
    let name = match name.find('<') {
        Some(pos) => &name[..pos],
        None => name,
    };
    match name.rfind("::") {
        Some(pos) => &name[pos + 2..],
        None => name,
    }
}

/// How a view instance is backed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Composed natively from its props.
    NativeComposition,
    /// Hosts a legacy single-view adapter.
    HostingAdapter,
}

/// Binding progress of a view instance.
///
/// Events emitted before `Active` are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    /// The property bag exists but nothing is wired.
    Uninitialized,
    /// A dispatch channel has been attached.
    Bound,
    /// Event fields route through the dispatch channel.
    Active,
}

#[derive(Debug)]
enum Backing {
    Composed,
    Hosting(Arc<dyn HostingAdapter>),
}

struct Inner<P> {
    props: P,
    state: BindingState,
}

/// A concrete view, created from one definition.
///
/// Owns its property bag; only holds a weak reference to the runtime context.
pub struct ViewInstance<V: ViewType> {
    id: ViewId,
    definition: String,
    backing: Backing,
    context: Weak<RuntimeContext>,
    inner: Mutex<Inner<V::Props>>,
    _type: PhantomData<fn() -> V>,
}

impl<V: ViewType> ViewInstance<V> {
    /// Creates an unbound instance with a fresh property bag.
    pub(crate) fn new(
        definition: &str,
        adapter: Option<Arc<dyn HostingAdapter>>,
        context: &Arc<RuntimeContext>,
    ) -> ViewInstance<V> {
        ViewInstance {
            id: ViewId::new(),
            definition: definition.to_string(),
            backing: match adapter {
                Some(adapter) => Backing::Hosting(adapter),
                None => Backing::Composed,
            },
            context: Arc::downgrade(context),
            inner: Mutex::new(Inner {
                props: V::Props::default(),
                state: BindingState::Uninitialized,
            }),
            _type: PhantomData,
        }
    }

    /// Wires every event field of the bag to the dispatch channel.
    pub(crate) fn bind(&self, sender: EventSender) {
        let mut inner = self.inner.lock();
        inner.state = BindingState::Bound;
        for field in inner.props.fields() {
            if let Some((name, emitter)) = field.event() {
                emitter.bind(self.id, name, sender.clone());
            }
        }
        inner.state = BindingState::Active;
    }

    /// The name of the definition this view was created from.
    pub fn definition_name(&self) -> &str {
        &self.definition
    }

    pub fn strategy(&self) -> Strategy {
        match self.backing {
            Backing::Composed => Strategy::NativeComposition,
            Backing::Hosting(_) => Strategy::HostingAdapter,
        }
    }

    pub fn binding_state(&self) -> BindingState {
        self.inner.lock().state
    }

    /// The hosted legacy adapter, if this view uses the hosting strategy.
    pub fn hosting_adapter(&self) -> Option<&Arc<dyn HostingAdapter>> {
        match &self.backing {
            Backing::Composed => None,
            Backing::Hosting(adapter) => Some(adapter),
        }
    }

    /// The runtime context, if it’s still around.
    pub fn context(&self) -> Option<Arc<RuntimeContext>> {
        self.context.upgrade()
    }

    /// Runs a closure with the property bag.
    pub fn with_props<R>(&self, f: impl FnOnce(&V::Props) -> R) -> R {
        f(&self.inner.lock().props)
    }

    /// Runs a closure with the property bag, mutably.
    pub fn with_props_mut<R>(&self, f: impl FnOnce(&mut V::Props) -> R) -> R {
        f(&mut self.inner.lock().props)
    }

    /// Applies raw prop values.
    ///
    /// Either every value is written or, on the first unknown prop or invalid value, none is.
    pub fn update_props(&self, props: &Map<String, Value>) -> Result<(), PropError> {
        let mut inner = self.inner.lock();
        let mut fields = inner.props.fields_mut();

        let mut staged = Vec::with_capacity(props.len());
        for (name, value) in props {
            let index = fields
                .iter()
                .position(|field| field.prop_name().as_deref() == Some(name.as_str()))
                .ok_or_else(|| PropError::UnknownProp { name: name.clone() })?;
            staged.push((index, fields[index].field.parse(name, value.clone())?));
        }

        for (index, value) in staged {
            fields[index].field.commit(value);
        }
        Ok(())
    }

    /// Renders this view’s contents.
    pub fn body(&self, context: &CompatibilityContext) -> Vec<ComposedChild<AnyView>> {
        match &self.backing {
            Backing::Hosting(adapter) => {
                let slot = [Some(ChildRef::Hosted(Arc::clone(adapter)))];
                render_children(&slot, context, passthrough)
            }
            Backing::Composed => V::body(&self.inner.lock().props, context),
        }
    }
}

impl<V: ViewType> fmt::Debug for ViewInstance<V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ViewInstance")
            .field("id", &self.id)
            .field("definition", &self.definition)
            .field("backing", &self.backing)
            .field("state", &self.inner.try_lock().map(|inner| inner.state))
            .finish()
    }
}

impl<V: ViewType> View for ViewInstance<V> {
    fn id(&self) -> ViewId {
        self.id
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn frame(&self) -> Rect {
        match &self.backing {
            Backing::Composed => Rect::zero(),
            Backing::Hosting(adapter) => adapter.frame(),
        }
    }
}

/// A view instance of any view type.
pub trait AnyViewInstance: View {
    fn definition_name(&self) -> &str;
    fn strategy(&self) -> Strategy;
    fn binding_state(&self) -> BindingState;
    fn hosting_adapter(&self) -> Option<Arc<dyn HostingAdapter>>;
    fn update_props(&self, props: &Map<String, Value>) -> Result<(), PropError>;
    fn body(&self, context: &CompatibilityContext) -> Vec<ComposedChild<AnyView>>;

    /// Converts this into a plain view handle.
    fn into_view(self: Arc<Self>) -> AnyView;
}

impl<V: ViewType> AnyViewInstance for ViewInstance<V> {
    fn definition_name(&self) -> &str {
        ViewInstance::definition_name(self)
    }
    fn strategy(&self) -> Strategy {
        ViewInstance::strategy(self)
    }
    fn binding_state(&self) -> BindingState {
        ViewInstance::binding_state(self)
    }
    fn hosting_adapter(&self) -> Option<Arc<dyn HostingAdapter>> {
        ViewInstance::hosting_adapter(self).cloned()
    }
    fn update_props(&self, props: &Map<String, Value>) -> Result<(), PropError> {
        ViewInstance::update_props(self, props)
    }
    fn body(&self, context: &CompatibilityContext) -> Vec<ComposedChild<AnyView>> {
        ViewInstance::body(self, context)
    }
    fn into_view(self: Arc<Self>) -> AnyView {
        self
    }
}

/// Placeholder for views the current build can’t compose.
#[derive(Debug)]
pub struct UnimplementedView {
    id: ViewId,
    message: String,
}

impl UnimplementedView {
    pub fn new(message: impl Into<String>) -> UnimplementedView {
        UnimplementedView {
            id: ViewId::new(),
            message: message.into(),
        }
    }

    /// A human-readable diagnostic.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl View for UnimplementedView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A handle to a created view, as given to the host runtime.
#[derive(Debug, Clone)]
pub enum PlatformView {
    Instance(Arc<dyn AnyViewInstance>),
    Unimplemented(Arc<UnimplementedView>),
}

impl PlatformView {
    pub fn id(&self) -> ViewId {
        match self {
            PlatformView::Instance(instance) => instance.id(),
            PlatformView::Unimplemented(view) => view.id(),
        }
    }

    pub fn instance(&self) -> Option<&Arc<dyn AnyViewInstance>> {
        match self {
            PlatformView::Instance(instance) => Some(instance),
            PlatformView::Unimplemented(_) => None,
        }
    }

    /// Returns the typed instance if this view is of type `V`.
    pub fn downcast_ref<V: ViewType>(&self) -> Option<&ViewInstance<V>> {
        self.instance()?.as_any().downcast_ref::<ViewInstance<V>>()
    }

    /// The diagnostic message, if this is a placeholder.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            PlatformView::Instance(_) => None,
            PlatformView::Unimplemented(view) => Some(view.message()),
        }
    }

    /// A child slot for this view: hosted if it wraps a legacy adapter, native otherwise.
    pub fn to_child_ref(&self) -> ChildRef {
        match self {
            PlatformView::Instance(instance) => match instance.hosting_adapter() {
                Some(adapter) => ChildRef::Hosted(adapter),
                None => ChildRef::Native(Arc::clone(instance).into_view()),
            },
            PlatformView::Unimplemented(view) => ChildRef::Native(Arc::clone(view) as AnyView),
        }
    }
}

#[test]
fn test_short_type_name() {
    assert_eq!(short_type_name("roost::widgets::Slider"), "Slider");
    assert_eq!(short_type_name("Slider"), "Slider");
    assert_eq!(short_type_name("a::Wrapper<b::Inner>"), "Wrapper");
}
