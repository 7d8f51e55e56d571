//! Property bags.
//!
//! Every view type has a property bag: a plain struct holding the view’s externally settable
//! configuration ([`Field`]s), its event emitters ([`EventEmitter`]s) and optionally its children.
//! Bags describe their own fields through [`PropertyBag::fields`], so the inspector can discover
//! prop and event names without a hand-maintained registry. Use [`impl_props`] to implement it.

use crate::children::ChildRef;
use crate::error::PropError;
use crate::events::EventEmitter;
use core::any::Any;
use core::ops::Deref;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Implements the `PropertyBag` trait for a given struct.
///
/// Fields are listed in declaration order. Each listed field must implement [`Reflect`]; fields
/// that are neither props nor events are accepted and ignored.
///
/// Syntax:
///
/// ```text
/// impl_props! {
///     StructName {
///         field_a,
///         field_b,
///         ...
///     }
///     children: children_field // optional; a `Vec<Option<ChildRef>>`
/// }
/// ```
#[macro_export]
macro_rules! impl_props {
    (
        $bag:ty {
            $($field:ident),* $(,)?
        }
        $(children: $children:ident)?
    ) => {
        impl $crate::PropertyBag for $bag {
            fn fields(&self) -> ::std::vec::Vec<$crate::props::FieldRef<'_>> {
                ::std::vec![
                    $($crate::props::FieldRef {
                        label: stringify!($field),
                        field: &self.$field,
                    }),*
                ]
            }

            fn fields_mut(&mut self) -> ::std::vec::Vec<$crate::props::FieldMut<'_>> {
                ::std::vec![
                    $($crate::props::FieldMut {
                        label: stringify!($field),
                        field: &mut self.$field,
                    }),*
                ]
            }

            $(
                fn children(&self) -> ::std::option::Option<&[::std::option::Option<$crate::ChildRef>]> {
                    ::std::option::Option::Some(&self.$children)
                }
            )?
        }
    };
}

/// The property bag contract.
///
/// Bags must be default-constructible independent of any instance data: the inspector builds
/// throwaway probe instances to read the schema, and the factory builds one fresh bag per view.
pub trait PropertyBag: Default + Send + 'static {
    /// All declared fields, in declaration order.
    fn fields(&self) -> Vec<FieldRef<'_>>;

    /// All declared fields, mutably, in declaration order.
    fn fields_mut(&mut self) -> Vec<FieldMut<'_>>;

    /// The ordered child list, if this bag holds one.
    ///
    /// Holes (`None`) are valid slots that render nothing.
    fn children(&self) -> Option<&[Option<ChildRef>]> {
        None
    }
}

/// What a field is, as far as the host runtime is concerned.
#[derive(Debug)]
pub enum Capability<'a> {
    /// An externally settable prop, with an optional key override.
    Prop { key: Option<&'static str> },
    /// An event emitter.
    Event(&'a EventEmitter),
}

/// A parsed prop value that has not been written to its field yet.
pub type Staged = Box<dyn Any + Send>;

/// Field introspection.
///
/// Prop updates are two-phase: every value is parsed with [`Reflect::parse`] before any of them
/// is written with [`Reflect::commit`].
pub trait Reflect {
    /// The field’s capability, or None if it should be ignored.
    fn capability(&self) -> Option<Capability<'_>>;

    /// Parses a raw value for this field without touching it.
    ///
    /// `name` is the resolved prop name, used for error reporting.
    fn parse(&self, name: &str, value: Value) -> Result<Staged, PropError> {
        let _ = (name, value);
        Err(PropError::NotAProp)
    }

    /// Writes a value previously returned by `parse` on this field.
    fn commit(&mut self, staged: Staged) {
        let _ = staged;
    }
}

/// A reference to a declared field.
pub struct FieldRef<'a> {
    /// The field’s declared label.
    pub label: &'static str,
    pub field: &'a dyn Reflect,
}

/// A mutable reference to a declared field.
pub struct FieldMut<'a> {
    /// The field’s declared label.
    pub label: &'static str,
    pub field: &'a mut dyn Reflect,
}

impl<'a> FieldRef<'a> {
    /// The resolved prop name, if this field is a prop.
    pub fn prop_name(&self) -> Option<String> {
        prop_name(self.label, self.field)
    }

    /// The resolved event name and the emitter, if this field is an event.
    pub fn event(&self) -> Option<(String, &'a EventEmitter)> {
        let field: &'a dyn Reflect = self.field;
        match field.capability() {
            Some(Capability::Event(emitter)) => {
                let name = match emitter.custom_name() {
                    Some(name) => name.to_string(),
                    None => schema_key(self.label),
                };
                Some((name, emitter))
            }
            _ => None,
        }
    }
}

impl<'a> FieldMut<'a> {
    /// The resolved prop name, if this field is a prop.
    pub fn prop_name(&self) -> Option<String> {
        prop_name(self.label, &*self.field)
    }
}

fn prop_name(label: &str, field: &dyn Reflect) -> Option<String> {
    match field.capability() {
        Some(Capability::Prop { key: Some(key) }) => Some(key.to_string()),
        Some(Capability::Prop { key: None }) => Some(schema_key(label)),
        _ => None,
    }
}

/// Converts a declared field label to the host runtime’s naming convention (lower camel case).
///
/// `on_press` becomes `onPress`; raw identifiers lose their `r#` prefix.
pub fn schema_key(label: &str) -> String {
    let label = label.trim_start_matches("r#");
    let mut key = String::with_capacity(label.len());
    let mut upper_next = false;
    for c in label.chars() {
        if c == '_' {
            // leading underscores are dropped, like any other separator
            upper_next = !key.is_empty();
        } else if upper_next {
            key.extend(c.to_uppercase());
            upper_next = false;
        } else {
            key.push(c);
        }
    }
    key
}

/// A prop field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Field<T> {
    value: T,
    key: Option<&'static str>,
}

impl<T> Field<T> {
    /// Creates a prop whose name is derived from its field label.
    pub fn new(value: T) -> Field<T> {
        Field { value, key: None }
    }

    /// Creates a prop with an explicit key.
    pub fn keyed(key: &'static str, value: T) -> Field<T> {
        Field {
            value,
            key: Some(key),
        }
    }

    /// The explicit key, if any.
    pub fn key(&self) -> Option<&'static str> {
        self.key
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
    }
}

impl<T> Deref for Field<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: DeserializeOwned + Send + 'static> Reflect for Field<T> {
    fn capability(&self) -> Option<Capability<'_>> {
        Some(Capability::Prop { key: self.key })
    }

    fn parse(&self, name: &str, value: Value) -> Result<Staged, PropError> {
        let value: T = serde_json::from_value(value).map_err(|source| PropError::InvalidValue {
            name: name.to_string(),
            source,
        })?;
        Ok(Box::new(value))
    }

    fn commit(&mut self, staged: Staged) {
        if let Ok(value) = staged.downcast::<T>() {
            self.value = *value;
        }
    }
}

impl Reflect for EventEmitter {
    fn capability(&self) -> Option<Capability<'_>> {
        Some(Capability::Event(self))
    }
}

/// Child lists are neither props nor events.
impl Reflect for Vec<Option<ChildRef>> {
    fn capability(&self) -> Option<Capability<'_>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_key() {
        assert_eq!(schema_key("title"), "title");
        assert_eq!(schema_key("on_press"), "onPress");
        assert_eq!(schema_key("is_on_off_switch"), "isOnOffSwitch");
        assert_eq!(schema_key("_private_thing"), "privateThing");
        assert_eq!(schema_key("r#type"), "type");
    }

    #[test]
    fn test_field_parse_and_commit() {
        let mut field = Field::new(0_u32);
        let staged = field.parse("count", json!(5)).expect("parsing a number should work");
        assert_eq!(*field, 0, "parsing should not write the field");
        field.commit(staged);
        assert_eq!(*field, 5);

        match field.parse("count", json!("five")) {
            Err(PropError::InvalidValue { name, .. }) => assert_eq!(name, "count"),
            other => panic!("expected InvalidValue, got {:?}", other.map(|_| ())),
        }
        assert_eq!(*field.get(), 5);

        // values staged for another field type are ignored
        field.commit(Box::new(String::from("five")));
        assert_eq!(*field.get(), 5);
    }

    #[test]
    fn test_emitter_is_not_assignable() {
        let emitter = EventEmitter::new();
        assert!(matches!(
            emitter.parse("onTap", Value::Null),
            Err(PropError::NotAProp)
        ));
    }
}
