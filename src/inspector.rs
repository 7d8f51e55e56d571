//! Schema discovery.
//!
//! The host runtime needs prop and event names before any view exists, so they are read off a
//! throwaway default instance of the property bag (a “probe”). The probe never holds real data.

use crate::props::PropertyBag;
use std::collections::HashSet;

/// Prop and event names of a property bag, in field declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub props: Vec<String>,
    pub events: Vec<String>,
}

impl Schema {
    /// Reads the schema of a property bag type off a fresh probe instance.
    pub fn of<P: PropertyBag>() -> Schema {
        let probe = P::default();
        Schema::of_bag(&probe)
    }

    /// Reads the schema of an existing bag.
    pub fn of_bag<P: PropertyBag>(bag: &P) -> Schema {
        let mut schema = Schema::default();
        for field in bag.fields() {
            if let Some(name) = field.prop_name() {
                schema.props.push(name);
            } else if let Some((name, _)) = field.event() {
                schema.events.push(name);
            }
        }
        schema
    }

    /// Names that occur more than once, across props and events.
    ///
    /// Each duplicate is reported once, in order of its second occurrence.
    pub fn duplicates(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut duplicates = Vec::new();
        for name in self.props.iter().chain(self.events.iter()) {
            if !seen.insert(name.as_str()) && reported.insert(name.as_str()) {
                duplicates.push(name.as_str());
            }
        }
        duplicates
    }
}

/// Prop names of a property bag type, in declaration order.
pub fn supported_prop_names<P: PropertyBag>() -> Vec<String> {
    Schema::of::<P>().props
}

/// Event names of a property bag type, in declaration order.
pub fn supported_event_names<P: PropertyBag>() -> Vec<String> {
    Schema::of::<P>().events
}
