//! registry::prefix
//!
//! Prefix-scoped access.
//!
//! A [`Prefixed`] facade rewrites every key it is given to
//! `prefix + "." + key` before forwarding to the registry. It saves
//! repeated typing when a package registers and accesses a family of
//! options under one namespace.

use serde_json::Value;

use super::{OptionError, Registry};
use crate::core::metadata::OptionSpec;

/// A borrowed facade that prepends a fixed prefix to every key.
///
/// # Example
///
/// ```
/// use knobwork::core::metadata::OptionSpec;
/// use knobwork::registry::Registry;
/// use serde_json::Value;
///
/// let mut registry = Registry::new();
/// {
///     let mut display = registry.prefixed("display.font");
///     display.register(OptionSpec::new("color", "red")).unwrap();
///     display.register(OptionSpec::new("size", 5)).unwrap();
///     display.set_one("size", 6).unwrap();
///     assert_eq!(display.get("size").unwrap(), &Value::from(6));
/// }
/// assert_eq!(registry.get("display.font.size", false).unwrap(), &Value::from(6));
/// ```
#[derive(Debug)]
pub struct Prefixed<'a> {
    registry: &'a mut Registry,
    prefix: String,
}

impl Registry {
    /// Scope `register`/`get`/`set` calls under a common key prefix.
    pub fn prefixed(&mut self, prefix: impl Into<String>) -> Prefixed<'_> {
        Prefixed {
            registry: self,
            prefix: prefix.into(),
        }
    }
}

impl Prefixed<'_> {
    /// The full key a short key forwards to.
    fn full_key(&self, key: &str) -> String {
        format!("{}.{}", self.prefix, key)
    }

    /// Register an option under the prefix.
    pub fn register(&mut self, spec: OptionSpec) -> Result<(), OptionError> {
        let spec = spec.prefixed(&self.prefix);
        self.registry.register(spec)
    }

    /// Read the option at `prefix + "." + key`.
    ///
    /// The forwarded name is a full key, not a pattern: partial matches
    /// do not apply through the facade.
    pub fn get(&self, key: &str) -> Result<&Value, OptionError> {
        self.registry.get(&self.full_key(key), false)
    }

    /// Set the option at `prefix + "." + key`.
    pub fn set_one(&mut self, key: &str, value: impl Into<Value>) -> Result<(), OptionError> {
        self.registry.set_one(&self.full_key(key), value, false)
    }

    /// The prefix carried by this facade.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_access_through_prefix() {
        let mut registry = Registry::new();
        {
            let mut scoped = registry.prefixed("net.http");
            scoped.register(OptionSpec::new("timeout", 30)).unwrap();
            scoped.register(OptionSpec::new("retries", 3)).unwrap();

            assert_eq!(scoped.get("timeout").unwrap(), &Value::from(30));
            scoped.set_one("retries", 5).unwrap();
        }

        assert_eq!(registry.keys(), ["net.http.retries", "net.http.timeout"]);
        assert_eq!(
            registry.get("net.http.retries", false).unwrap(),
            &Value::from(5)
        );
    }

    #[test]
    fn prefix_errors_carry_the_full_key() {
        let mut registry = Registry::new();
        let scoped = registry.prefixed("app");

        assert_eq!(
            scoped.get("missing"),
            Err(OptionError::NoSuchOption("app.missing".into()))
        );
    }

    #[test]
    fn nested_namespaces_compose() {
        let mut registry = Registry::new();
        {
            let mut scoped = registry.prefixed("a.b");
            scoped.register(OptionSpec::new("c.d", 1)).unwrap();
        }

        assert_eq!(registry.keys(), ["a.b.c.d"]);
    }
}
