//! The host runtime’s entry point: registered view definitions, by name.

use crate::definition::{Element, ViewDefinition};
use crate::error::{BridgeError, DefinitionError, HookError, PropError, UpdateError};
use crate::host::{RuntimeContext, ScriptObject};
use crate::lifecycle::LifecyclePhase;
use crate::view::{PlatformView, ViewInstance, ViewType};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// A view definition of any view type.
pub trait AnyDefinition: Send + Sync {
    fn name(&self) -> &str;

    /// Prop names discovered on the property bag.
    fn supported_prop_names(&self) -> Vec<String>;

    /// Event names discovered on the property bag.
    fn supported_event_names(&self) -> Vec<String>;

    fn create_view(&self, context: &Arc<RuntimeContext>) -> PlatformView;

    /// Invokes lifecycle hooks on a view created by this definition.
    ///
    /// Placeholder views have no hooks to run.
    fn dispatch(&self, phase: LifecyclePhase, view: &PlatformView) -> Result<(), HookError>;

    /// Applies raw prop values, then dispatches [`LifecyclePhase::DidUpdateProps`].
    ///
    /// If any value is rejected, nothing is written and no hooks run.
    fn update_props(
        &self,
        view: &PlatformView,
        props: &Map<String, Value>,
    ) -> Result<(), UpdateError>;

    fn create_bridge_object(
        &self,
        context: &RuntimeContext,
    ) -> Result<Box<dyn ScriptObject>, BridgeError>;
}

impl<V: ViewType> ViewDefinition<V> {
    /// Returns the typed instance behind a handle, None for placeholders, or the name of the
    /// definition the handle actually belongs to.
    fn typed_instance<'a>(
        &self,
        view: &'a PlatformView,
    ) -> Result<Option<&'a ViewInstance<V>>, String> {
        let instance = match view.instance() {
            Some(instance) => instance,
            None => return Ok(None),
        };
        match view.downcast_ref::<V>() {
            Some(typed) => Ok(Some(typed)),
            None => Err(instance.definition_name().to_string()),
        }
    }
}

impl<V: ViewType> AnyDefinition for ViewDefinition<V> {
    fn name(&self) -> &str {
        ViewDefinition::name(self)
    }

    fn supported_prop_names(&self) -> Vec<String> {
        ViewDefinition::supported_prop_names(self).to_vec()
    }

    fn supported_event_names(&self) -> Vec<String> {
        ViewDefinition::supported_event_names(self).to_vec()
    }

    fn create_view(&self, context: &Arc<RuntimeContext>) -> PlatformView {
        ViewDefinition::create_view(self, context)
    }

    fn dispatch(&self, phase: LifecyclePhase, view: &PlatformView) -> Result<(), HookError> {
        match self.typed_instance(view) {
            Ok(Some(instance)) => ViewDefinition::dispatch(self, phase, instance),
            Ok(None) => {
                trace!(view = %self.name(), ?phase, "not dispatching to a placeholder");
                Ok(())
            }
            Err(found) => Err(HookError::ViewTypeMismatch {
                expected: self.name().to_string(),
                found,
            }),
        }
    }

    fn update_props(
        &self,
        view: &PlatformView,
        props: &Map<String, Value>,
    ) -> Result<(), UpdateError> {
        let instance = match self.typed_instance(view) {
            Ok(Some(instance)) => instance,
            Ok(None) => return Ok(()),
            Err(found) => {
                return Err(PropError::ViewTypeMismatch {
                    expected: self.name().to_string(),
                    found,
                }
                .into())
            }
        };
        instance.update_props(props)?;
        ViewDefinition::dispatch(self, LifecyclePhase::DidUpdateProps, instance)?;
        Ok(())
    }

    fn create_bridge_object(
        &self,
        context: &RuntimeContext,
    ) -> Result<Box<dyn ScriptObject>, BridgeError> {
        ViewDefinition::create_bridge_object(self, context)
    }
}

/// Registered view definitions.
#[derive(Default)]
pub struct ViewRegistry {
    definitions: HashMap<String, Arc<dyn AnyDefinition>>,
}

impl ViewRegistry {
    pub fn new() -> ViewRegistry {
        ViewRegistry::default()
    }

    /// Builds and registers a view definition.
    ///
    /// A failed registration leaves all other definitions untouched.
    pub fn register<V: ViewType>(
        &mut self,
        elements: Vec<Element<V>>,
    ) -> Result<Arc<ViewDefinition<V>>, DefinitionError> {
        let definition = Arc::new(ViewDefinition::<V>::build(elements)?);
        let name = definition.name().to_string();
        if self.definitions.contains_key(&name) {
            return Err(DefinitionError::AlreadyRegistered { name });
        }

        debug!(view = %name, "registered view definition");
        self.definitions
            .insert(name, Arc::clone(&definition) as Arc<dyn AnyDefinition>);
        Ok(definition)
    }

    /// Looks up a definition by name.
    pub fn get(&self, name: &str) -> Result<&Arc<dyn AnyDefinition>, DefinitionError> {
        self.definitions
            .get(name)
            .ok_or_else(|| DefinitionError::NotRegistered {
                name: name.to_string(),
            })
    }

    /// Names of all registered definitions, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
