//! registry::overrides
//!
//! Reversible temporary overrides.
//!
//! # Semantics
//!
//! [`Registry::scoped`] captures the current value of every addressed
//! option before the first write, applies all pairs, and hands back a
//! guard. Dropping the guard restores the captured values in capture
//! order - on every exit path, including unwinding. Nested scopes
//! compose naturally: an inner guard restores to whatever the outer
//! scope had set.
//!
//! All reads and writes performed by the override machinery are silent;
//! deprecation notices are not emitted for keys that merely pass through
//! an override scope.

use std::ops::{Deref, DerefMut};

use serde_json::Value;

use super::{OptionError, Registry};

/// Guard for a set of temporary overrides; restores on drop.
///
/// Dereferences to the underlying [`Registry`], so the scoped block can
/// keep using the full access surface.
///
/// # Example
///
/// ```
/// use knobwork::core::metadata::OptionSpec;
/// use knobwork::registry::Registry;
/// use serde_json::Value;
///
/// let mut registry = Registry::new();
/// registry.register(OptionSpec::new("display.width", 80)).unwrap();
///
/// {
///     let scope = registry.scoped(&[("display.width", Value::from(20))]).unwrap();
///     assert_eq!(scope.get("display.width", false).unwrap(), &Value::from(20));
/// }
///
/// assert_eq!(registry.get("display.width", false).unwrap(), &Value::from(80));
/// ```
#[derive(Debug)]
pub struct ScopedOverrides<'a> {
    registry: &'a mut Registry,
    undo: Vec<(String, Value)>,
}

impl Registry {
    /// Apply temporary overrides, reverted when the returned guard
    /// drops.
    ///
    /// Current values are captured for every pair, in input order,
    /// before anything is written. If applying a pair fails, the pairs
    /// already applied are rolled back before the error is returned.
    ///
    /// # Errors
    ///
    /// - [`OptionError::EmptyPairs`] if `pairs` is empty
    /// - The resolution and validation errors of [`Registry::set`]
    pub fn scoped(&mut self, pairs: &[(&str, Value)]) -> Result<ScopedOverrides<'_>, OptionError> {
        if pairs.is_empty() {
            return Err(OptionError::EmptyPairs);
        }

        let mut undo = Vec::with_capacity(pairs.len());
        for (pattern, _) in pairs {
            undo.push(((*pattern).to_string(), self.get(pattern, true)?.clone()));
        }

        let mut applied = 0;
        for (pattern, value) in pairs {
            if let Err(err) = self.set_one(pattern, value.clone(), true) {
                for (pattern, old) in undo.iter().take(applied) {
                    let _ = self.set_one(pattern, old.clone(), true);
                }
                return Err(err);
            }
            applied += 1;
        }

        Ok(ScopedOverrides {
            registry: self,
            undo,
        })
    }
}

impl Deref for ScopedOverrides<'_> {
    type Target = Registry;

    fn deref(&self) -> &Registry {
        self.registry
    }
}

impl DerefMut for ScopedOverrides<'_> {
    fn deref_mut(&mut self) -> &mut Registry {
        self.registry
    }
}

impl Drop for ScopedOverrides<'_> {
    fn drop(&mut self) {
        // Drop cannot propagate errors; restoration is best-effort.
        for (pattern, value) in std::mem::take(&mut self.undo) {
            let _ = self.registry.set_one(&pattern, value, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::core::metadata::{Deprecation, OptionSpec};

    fn registry_with(key: &str, default: i64) -> Registry {
        let mut registry = Registry::new();
        registry.register(OptionSpec::new(key, default)).unwrap();
        registry
    }

    #[test]
    fn override_applies_and_restores() {
        let mut registry = registry_with("a", 1);

        {
            let scope = registry.scoped(&[("a", Value::from(2))]).unwrap();
            assert_eq!(scope.get("a", false).unwrap(), &Value::from(2));
        }

        assert_eq!(registry.get("a", false).unwrap(), &Value::from(1));
    }

    #[test]
    fn override_restores_after_inner_mutation() {
        let mut registry = registry_with("a", 1);

        {
            let mut scope = registry.scoped(&[("a", Value::from(2))]).unwrap();
            scope.set_one("a", 99, false).unwrap();
        }

        // restoration rewinds to the captured value, not the last write
        assert_eq!(registry.get("a", false).unwrap(), &Value::from(1));
    }

    #[test]
    fn nested_overrides_unwind_layer_by_layer() {
        let mut registry = registry_with("k", 0);
        registry.set_one("k", 1, false).unwrap();

        {
            let mut outer = registry.scoped(&[("k", Value::from(2))]).unwrap();
            assert_eq!(outer.get("k", false).unwrap(), &Value::from(2));

            {
                let inner = outer.scoped(&[("k", Value::from(3))]).unwrap();
                assert_eq!(inner.get("k", false).unwrap(), &Value::from(3));
            }

            assert_eq!(outer.get("k", false).unwrap(), &Value::from(2));
        }

        assert_eq!(registry.get("k", false).unwrap(), &Value::from(1));
    }

    #[test]
    fn overrides_restore_when_scope_panics() {
        let mut registry = registry_with("a", 1);

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let scope = registry.scoped(&[("a", Value::from(2))]).unwrap();
            assert_eq!(scope.get("a", false).unwrap(), &Value::from(2));
            panic!("scope body failed");
        }));

        assert!(outcome.is_err());
        assert_eq!(registry.get("a", false).unwrap(), &Value::from(1));
    }

    #[test]
    fn multiple_pairs_capture_before_any_write() {
        let mut registry = registry_with("a", 1);
        registry.register(OptionSpec::new("b", 10)).unwrap();

        {
            let scope = registry
                .scoped(&[("a", Value::from(2)), ("b", Value::from(20))])
                .unwrap();
            assert_eq!(scope.get("a", false).unwrap(), &Value::from(2));
            assert_eq!(scope.get("b", false).unwrap(), &Value::from(20));
        }

        assert_eq!(registry.get("a", false).unwrap(), &Value::from(1));
        assert_eq!(registry.get("b", false).unwrap(), &Value::from(10));
    }

    #[test]
    fn failed_entry_rolls_back_applied_pairs() {
        let mut registry = registry_with("a", 1);
        registry
            .register(
                OptionSpec::new("b", 10)
                    .validator(|v| v.as_i64().map(|_| ()).ok_or_else(|| "integer only".into())),
            )
            .unwrap();

        let result = registry.scoped(&[("a", Value::from(2)), ("b", Value::from("bad"))]);
        assert!(matches!(result, Err(OptionError::Validation { .. })));
        drop(result);

        assert_eq!(registry.get("a", false).unwrap(), &Value::from(1));
        assert_eq!(registry.get("b", false).unwrap(), &Value::from(10));
    }

    #[test]
    fn empty_pairs_rejected() {
        let mut registry = registry_with("a", 1);
        assert!(matches!(
            registry.scoped(&[]),
            Err(OptionError::EmptyPairs)
        ));
    }

    #[test]
    fn scoped_access_is_silent() {
        let mut registry = registry_with("old", 1);
        registry.deprecate("old", Deprecation::new()).unwrap();

        let warnings = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&warnings);
        registry.set_warning_handler(move |message| {
            sink.lock().unwrap().push(message.to_string());
        });

        {
            let _scope = registry.scoped(&[("old", Value::from(2))]).unwrap();
        }

        assert!(warnings.lock().unwrap().is_empty());
    }
}
