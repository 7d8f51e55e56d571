//! View definitions.
//!
//! A definition is the immutable metadata for one view type: its name, declared props, declared
//! events, lifecycle hooks and exposed functions. It is built once, at registration time, from a
//! list of declaration [`Element`]s, and then serves as the factory for instances of that type.

use crate::error::{BridgeError, DefinitionError, FunctionError, HookError};
use crate::host::{ExposedFunction, RuntimeContext, ScriptObject};
use crate::inspector::Schema;
use crate::lifecycle::{self, LifecycleHook, LifecyclePhase};
use crate::view::{PlatformView, UnimplementedView, View, ViewInstance, ViewType};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// A declared prop.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewProp {
    pub name: String,
}

impl ViewProp {
    pub fn new(name: impl Into<String>) -> ViewProp {
        ViewProp { name: name.into() }
    }
}

/// One declaration in a view definition.
pub enum Element<V: ViewType> {
    /// Overrides the definition name. The last one wins.
    Name(String),
    /// Declares props.
    Props(Vec<ViewProp>),
    /// Declares event names.
    Events(Vec<String>),
    /// Registers a lifecycle hook.
    Lifecycle(LifecycleHook<V>),
    /// Exposes a function on the view’s script-host object.
    Function(String, ExposedFunction),
}

impl<V: ViewType> Element<V> {
    pub fn name(name: impl Into<String>) -> Element<V> {
        Element::Name(name.into())
    }

    pub fn props<I, S>(names: I) -> Element<V>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Element::Props(names.into_iter().map(ViewProp::new).collect())
    }

    pub fn events<I, S>(names: I) -> Element<V>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Element::Events(names.into_iter().map(Into::into).collect())
    }

    /// Registers a hook for one lifecycle phase.
    pub fn on<F>(phase: LifecyclePhase, callback: F) -> Element<V>
    where
        F: 'static + Fn(&ViewInstance<V>) -> Result<(), HookError> + Send + Sync,
    {
        Element::Lifecycle(LifecycleHook::new(phase, callback))
    }

    pub fn function<F>(name: impl Into<String>, function: F) -> Element<V>
    where
        F: 'static + Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync,
    {
        Element::Function(name.into(), ExposedFunction::new(function))
    }
}

/// Metadata for one view type.
pub struct ViewDefinition<V: ViewType> {
    name: String,
    props: Vec<ViewProp>,
    event_names: Vec<String>,
    hooks: Vec<LifecycleHook<V>>,
    functions: Vec<(String, ExposedFunction)>,
    /// Read off a probe instance at build time.
    schema: Schema,
}

impl<V: ViewType> ViewDefinition<V> {
    /// Builds a definition from its declarations.
    ///
    /// Duplicate prop, event or function names are rejected, and so are property bags whose
    /// fields resolve to the same name.
    pub fn build(elements: Vec<Element<V>>) -> Result<ViewDefinition<V>, DefinitionError> {
        let mut name = None;
        let mut props = Vec::new();
        let mut event_names = Vec::new();
        let mut hooks = Vec::new();
        let mut functions = Vec::new();

        for element in elements {
            match element {
                Element::Name(n) => name = Some(n),
                Element::Props(mut p) => props.append(&mut p),
                Element::Events(mut e) => event_names.append(&mut e),
                Element::Lifecycle(hook) => hooks.push(hook),
                Element::Function(n, f) => functions.push((n, f)),
            }
        }

        let name = name.unwrap_or_else(V::name);

        if let Some(dup) = first_duplicate(props.iter().map(|prop| prop.name.as_str())) {
            return Err(DefinitionError::DuplicateProp {
                definition: name,
                name: dup.to_string(),
            });
        }
        if let Some(dup) = first_duplicate(event_names.iter().map(String::as_str)) {
            return Err(DefinitionError::DuplicateEvent {
                definition: name,
                name: dup.to_string(),
            });
        }
        if let Some(dup) = first_duplicate(functions.iter().map(|(n, _)| n.as_str())) {
            return Err(DefinitionError::DuplicateFunction {
                definition: name,
                name: dup.to_string(),
            });
        }

        let schema = Schema::of::<V::Props>();
        if let Some(dup) = schema.duplicates().first() {
            return Err(DefinitionError::DuplicateBagField {
                definition: name,
                name: dup.to_string(),
            });
        }

        debug!(
            view = %name,
            props = props.len(),
            events = event_names.len(),
            hooks = hooks.len(),
            "built view definition"
        );

        Ok(ViewDefinition {
            name,
            props,
            event_names,
            hooks,
            functions,
            schema,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared props, in declaration order.
    pub fn props(&self) -> &[ViewProp] {
        &self.props
    }

    /// Declared event names, in declaration order.
    pub fn event_names(&self) -> &[String] {
        &self.event_names
    }

    pub fn hooks(&self) -> &[LifecycleHook<V>] {
        &self.hooks
    }

    /// Declared props by name.
    pub fn props_dict(&self) -> HashMap<String, ViewProp> {
        self.props.iter().fold(HashMap::new(), |mut dict, prop| {
            dict.insert(prop.name.clone(), prop.clone());
            dict
        })
    }

    /// Prop names discovered on the property bag, in field order.
    pub fn supported_prop_names(&self) -> &[String] {
        &self.schema.props
    }

    /// Event names discovered on the property bag, in field order.
    pub fn supported_event_names(&self) -> &[String] {
        &self.schema.events
    }

    /// Creates a view instance.
    ///
    /// Returns a placeholder if the runtime can’t compose views natively.
    pub fn create_view(&self, context: &Arc<RuntimeContext>) -> PlatformView {
        if !context.capabilities().native_composition {
            warn!(view = %self.name, "native composition is unavailable; using a placeholder");
            return PlatformView::Unimplemented(Arc::new(UnimplementedView::new(format!(
                "`{}` cannot be rendered: native view composition is not supported by this build",
                self.name
            ))));
        }

        let instance = ViewInstance::<V>::new(&self.name, V::legacy_adapter(context), context);
        instance.bind(context.event_sender());
        debug!(
            view = %self.name,
            id = ?instance.id(),
            strategy = ?instance.strategy(),
            "created view"
        );
        PlatformView::Instance(Arc::new(instance))
    }

    /// Invokes the hooks registered for `phase` on a view.
    pub fn dispatch(&self, phase: LifecyclePhase, view: &ViewInstance<V>) -> Result<(), HookError> {
        lifecycle::dispatch(&self.hooks, phase, view)
    }

    /// Creates a script-host object exposing this definition’s functions.
    pub fn create_bridge_object(
        &self,
        context: &RuntimeContext,
    ) -> Result<Box<dyn ScriptObject>, BridgeError> {
        let mut object = context.script_bridge()?.create_object()?;
        for (name, function) in &self.functions {
            object.set_function(name, function.clone());
        }
        Ok(object)
    }
}

fn first_duplicate<'a>(names: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Some(name);
        }
    }
    None
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::Capabilities;
    use crate::events::EventEmitter;
    use crate::hosting::tests::LegacyAdapter;
    use crate::hosting::HostingAdapter;
    use crate::impl_props;
    use crate::props::Field;
    use crate::view::{BindingState, Strategy};
    use crate::PropError;
    use crate::{ChildRef, PlainBridge, PlainObject};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) struct ToggleProps {
        pub is_on: Field<bool>,
        pub label: Field<String>,
        pub on_change: EventEmitter,
        pub children: Vec<Option<ChildRef>>,
    }

    impl Default for ToggleProps {
        fn default() -> Self {
            ToggleProps {
                is_on: Field::default(),
                label: Field::keyed("text", String::new()),
                on_change: EventEmitter::named("onToggle"),
                children: Vec::new(),
            }
        }
    }

    impl_props! {
        ToggleProps { is_on, label, on_change }
        children: children
    }

    pub(crate) struct Toggle;

    impl ViewType for Toggle {
        type Props = ToggleProps;
    }

    pub(crate) struct LegacyMap;

    impl ViewType for LegacyMap {
        type Props = ToggleProps;

        fn legacy_adapter(_: &RuntimeContext) -> Option<Arc<dyn HostingAdapter>> {
            Some(Arc::new(LegacyAdapter::new()))
        }
    }

    pub(crate) fn context() -> Arc<RuntimeContext> {
        Arc::new(RuntimeContext::new(
            Capabilities::default().with_native_composition(true),
        ))
    }

    #[test]
    fn test_default_name() {
        let def = ViewDefinition::<Toggle>::build(vec![]).expect("empty definitions are valid");
        assert_eq!(def.name(), "Toggle");
    }

    #[test]
    fn test_last_name_wins() {
        let def = ViewDefinition::<Toggle>::build(vec![
            Element::name("First"),
            Element::props(vec!["a"]),
            Element::name("Second"),
        ])
        .expect("should build");
        assert_eq!(def.name(), "Second");
    }

    #[test]
    fn test_events_concatenate() {
        let def = ViewDefinition::<Toggle>::build(vec![
            Element::events(vec!["a", "b"]),
            Element::props(vec!["x"]),
            Element::events(vec!["c"]),
        ])
        .expect("should build");
        assert_eq!(def.event_names(), ["a", "b", "c"]);
    }

    #[test]
    fn test_props_dict() {
        let def = ViewDefinition::<Toggle>::build(vec![
            Element::props(vec!["isOn", "text"]),
            Element::props(vec!["tint"]),
        ])
        .expect("should build");
        let dict = def.props_dict();
        assert_eq!(dict.len(), 3);
        assert_eq!(dict["tint"], ViewProp::new("tint"));
        let names: Vec<_> = def.props().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["isOn", "text", "tint"]);
    }

    #[test]
    fn test_duplicates_are_rejected() {
        let err = ViewDefinition::<Toggle>::build(vec![
            Element::props(vec!["a", "b"]),
            Element::props(vec!["b"]),
        ])
        .err()
        .expect("duplicate props should be rejected");
        assert_eq!(
            err,
            DefinitionError::DuplicateProp {
                definition: "Toggle".into(),
                name: "b".into()
            }
        );

        let err = ViewDefinition::<Toggle>::build(vec![
            Element::name("T"),
            Element::events(vec!["x"]),
            Element::events(vec!["x"]),
        ])
        .err()
        .expect("duplicate events should be rejected");
        assert_eq!(
            err,
            DefinitionError::DuplicateEvent {
                definition: "T".into(),
                name: "x".into()
            }
        );

        let ok = |_: &[Value]| Ok(json!(null));
        let err = ViewDefinition::<Toggle>::build(vec![
            Element::function("f", ok),
            Element::function("f", ok),
        ])
        .err()
        .expect("duplicate functions should be rejected");
        assert!(matches!(err, DefinitionError::DuplicateFunction { .. }));
    }

    struct CountedProps {
        size: Field<u32>,
        on_resize: EventEmitter,
    }

    static COUNTED_PROBES: AtomicUsize = AtomicUsize::new(0);

    impl Default for CountedProps {
        fn default() -> Self {
            COUNTED_PROBES.fetch_add(1, Ordering::SeqCst);
            CountedProps {
                size: Field::default(),
                on_resize: EventEmitter::new(),
            }
        }
    }

    impl_props! {
        CountedProps { size, on_resize }
    }

    struct Counted;

    impl ViewType for Counted {
        type Props = CountedProps;
    }

    #[test]
    fn test_probe_is_created_once() {
        let def = ViewDefinition::<Counted>::build(vec![]).expect("should build");
        assert_eq!(COUNTED_PROBES.load(Ordering::SeqCst), 1, "building reads the schema");

        assert_eq!(def.supported_prop_names(), ["size"]);
        assert_eq!(def.supported_event_names(), ["onResize"]);
        assert_eq!(def.supported_prop_names(), ["size"]);
        assert_eq!(def.supported_event_names(), ["onResize"]);
        assert_eq!(
            COUNTED_PROBES.load(Ordering::SeqCst),
            1,
            "queries should reuse the schema read at build time"
        );
    }

    struct TapProps {
        tap: Field<bool>,
        other: Field<bool>,
    }

    impl Default for TapProps {
        fn default() -> Self {
            TapProps {
                tap: Field::default(),
                other: Field::keyed("tap", false),
            }
        }
    }

    impl_props! {
        TapProps { tap, other }
    }

    struct Tap;

    impl ViewType for Tap {
        type Props = TapProps;
    }

    struct EchoProps {
        on_a: EventEmitter,
        on_b: EventEmitter,
    }

    impl Default for EchoProps {
        fn default() -> Self {
            EchoProps {
                on_a: EventEmitter::named("onChange"),
                on_b: EventEmitter::named("onChange"),
            }
        }
    }

    impl_props! {
        EchoProps { on_a, on_b }
    }

    struct Echo;

    impl ViewType for Echo {
        type Props = EchoProps;
    }

    #[test]
    fn test_colliding_bag_fields_are_rejected() {
        let err = ViewDefinition::<Tap>::build(vec![])
            .err()
            .expect("a keyed field shadowing another field should be rejected");
        assert_eq!(
            err,
            DefinitionError::DuplicateBagField {
                definition: "Tap".into(),
                name: "tap".into()
            }
        );
    }

    #[test]
    fn test_colliding_event_names_are_rejected() {
        let err = ViewDefinition::<Echo>::build(vec![Element::name("Echoes")])
            .err()
            .expect("two emitters with one name should be rejected");
        assert_eq!(
            err,
            DefinitionError::DuplicateBagField {
                definition: "Echoes".into(),
                name: "onChange".into()
            }
        );
    }

    #[test]
    fn test_supported_names_are_memoized() {
        let def = ViewDefinition::<Toggle>::build(vec![]).expect("should build");
        let props = def.supported_prop_names().to_vec();
        let events = def.supported_event_names().to_vec();
        assert_eq!(props, ["isOn", "text"]);
        assert_eq!(events, ["onToggle"]);
        assert_eq!(def.supported_prop_names(), &props[..]);
        assert_eq!(def.supported_event_names(), &events[..]);
        assert_eq!(props, Schema::of::<ToggleProps>().props);
        assert_eq!(events, Schema::of::<ToggleProps>().events);
    }

    #[test]
    fn test_create_native_view() {
        let context = context();
        let def = ViewDefinition::<Toggle>::build(vec![]).expect("should build");
        let view = def.create_view(&context);
        assert!(view.diagnostic().is_none());

        let instance = view.downcast_ref::<Toggle>().expect("should be a Toggle");
        assert_eq!(instance.strategy(), Strategy::NativeComposition);
        assert_eq!(instance.binding_state(), BindingState::Active);
        assert!(instance.hosting_adapter().is_none());
        assert!(instance.context().is_some());
        assert!(!view.to_child_ref().is_hosted());

        assert!(instance.with_props(|props| props.on_change.emit(json!(true))));
        let events = context.poll_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].view, view.id());
        assert_eq!(events[0].name, "onToggle");
        assert_eq!(events[0].payload, json!(true));
    }

    #[test]
    fn test_instances_own_their_props() {
        let context = context();
        let def = ViewDefinition::<Toggle>::build(vec![]).expect("should build");
        let a = def.create_view(&context);
        let b = def.create_view(&context);
        assert_ne!(a.id(), b.id());

        let a = a.downcast_ref::<Toggle>().expect("should be a Toggle");
        let b = b.downcast_ref::<Toggle>().expect("should be a Toggle");
        a.with_props_mut(|props| props.is_on.set(true));
        assert!(*a.with_props(|props| props.is_on.clone()));
        assert!(!*b.with_props(|props| props.is_on.clone()));

        b.with_props(|props| props.on_change.emit(json!("b")));
        let events = context.poll_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].view, b.id());
    }

    #[test]
    fn test_create_hosting_view() {
        let context = context();
        let def = ViewDefinition::<LegacyMap>::build(vec![]).expect("should build");
        let view = def.create_view(&context);
        let instance = view.downcast_ref::<LegacyMap>().expect("should be a LegacyMap");
        assert_eq!(instance.strategy(), Strategy::HostingAdapter);
        assert_eq!(instance.binding_state(), BindingState::Active);
        assert!(view.to_child_ref().is_hosted());

        let body = instance.body(context.compatibility_context());
        assert_eq!(body.len(), 1);
        assert!(body[0].is_hosting_view);
    }

    #[test]
    fn test_placeholder_when_unsupported() {
        let context = Arc::new(RuntimeContext::new(
            Capabilities::default().with_native_composition(false),
        ));
        let def = ViewDefinition::<Toggle>::build(vec![]).expect("should build");
        let view = def.create_view(&context);
        let message = view.diagnostic().expect("should be a placeholder");
        assert!(!message.is_empty());
        assert!(message.contains("Toggle"));
        assert!(view.instance().is_none());
        assert!(!view.to_child_ref().is_hosted());
    }

    #[test]
    fn test_update_props() {
        let context = context();
        let def = ViewDefinition::<Toggle>::build(vec![]).expect("should build");
        let view = def.create_view(&context);
        let instance = view.downcast_ref::<Toggle>().expect("should be a Toggle");

        let update = json!({ "isOn": true, "text": "Wi-Fi" });
        instance
            .update_props(update.as_object().expect("is an object"))
            .expect("valid update");
        instance.with_props(|props| {
            assert!(*props.is_on);
            assert_eq!(props.label.get(), "Wi-Fi");
        });

        let update = json!({ "label": "nope" });
        match instance.update_props(update.as_object().expect("is an object")) {
            Err(PropError::UnknownProp { name }) => assert_eq!(name, "label"),
            other => panic!("expected UnknownProp, got {:?}", other),
        }
    }

    #[test]
    fn test_failed_update_writes_nothing() {
        let context = context();
        let def = ViewDefinition::<Toggle>::build(vec![]).expect("should build");
        let view = def.create_view(&context);
        let instance = view.downcast_ref::<Toggle>().expect("should be a Toggle");

        // `isOn` is valid and is visited before the invalid `text`
        let update = json!({ "isOn": true, "text": 5 });
        match instance.update_props(update.as_object().expect("is an object")) {
            Err(PropError::InvalidValue { name, .. }) => assert_eq!(name, "text"),
            other => panic!("expected InvalidValue, got {:?}", other),
        }

        // an unknown key after a valid one
        let update = json!({ "isOn": true, "zzz": 1 });
        assert!(instance
            .update_props(update.as_object().expect("is an object"))
            .is_err());

        instance.with_props(|props| {
            assert!(!*props.is_on, "no field should have been written");
            assert_eq!(props.label.get(), "");
        });
    }

    #[test]
    fn test_bridge_object() {
        let def = ViewDefinition::<Toggle>::build(vec![
            Element::function("reset", |_: &[Value]| Ok(json!("done"))),
        ])
        .expect("should build");

        let bare = RuntimeContext::new(Capabilities::default());
        assert_eq!(
            def.create_bridge_object(&bare).err(),
            Some(BridgeError::Unavailable)
        );

        let bridged = RuntimeContext::new(Capabilities::default()).with_bridge(PlainBridge);
        let object = def
            .create_bridge_object(&bridged)
            .expect("bridge is available");
        let object = object
            .as_any()
            .downcast_ref::<PlainObject>()
            .expect("should be a PlainObject");
        assert_eq!(object.call("reset", &[]), Ok(json!("done")));
    }
}
