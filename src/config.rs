//! Runtime capabilities.

/// Capabilities of the surrounding runtime build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Whether views can be composed natively, one per tree node.
    ///
    /// If false, the factory hands out placeholder views instead.
    pub native_composition: bool,
}

impl Capabilities {
    /// Returns a copy with the native composition flag overridden.
    pub fn with_native_composition(self, native_composition: bool) -> Capabilities {
        Capabilities {
            native_composition,
            ..self
        }
    }
}

/// Resolves capabilities from the crate features this build was compiled with.
impl Default for Capabilities {
    fn default() -> Self {
        Capabilities {
            native_composition: cfg!(feature = "native-composition"),
        }
    }
}

#[test]
fn test_capability_override() {
    let caps = Capabilities::default().with_native_composition(false);
    assert!(!caps.native_composition);
    let caps = caps.with_native_composition(true);
    assert!(caps.native_composition);
}
