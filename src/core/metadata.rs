//! core::metadata
//!
//! Option metadata records and their store.
//!
//! # Records
//!
//! - [`RegisteredOption`] - the immutable definition of one option:
//!   default value, doc text, optional validator, optional set-callback
//! - [`DeprecatedOption`] - the deprecation record for one key: message,
//!   redirect target, removal marker
//!
//! Registration records are keyed by validated [`OptionKey`]s.
//! Deprecation records are stored unconditionally: neither the deprecated
//! key nor its redirect target has to exist when the record is declared,
//! and both are only checked at access time.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;
use thiserror::Error;

use super::key::OptionKey;

/// A validation predicate supplied by the option owner.
///
/// Returns `Err` with a human-readable reason when the candidate value is
/// not legal for the option.
pub type Validator = Box<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// A callback invoked with the fully-qualified key immediately after an
/// option value is set or reset.
pub type SetCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Errors from the metadata store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("option '{0}' has already been registered")]
    AlreadyRegistered(String),

    #[error("option '{0}' has already been deprecated")]
    AlreadyDeprecated(String),
}

/// The immutable definition of a registered option.
pub struct RegisteredOption {
    /// The fully-qualified key.
    pub key: OptionKey,
    /// The value the option starts at and resets to.
    pub default_value: Value,
    /// Doc text shown by `describe`.
    pub doc: String,
    pub(crate) validator: Option<Validator>,
    pub(crate) callback: Option<SetCallback>,
}

impl RegisteredOption {
    /// Run the option's validator against a candidate value.
    ///
    /// Options without a validator accept everything.
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        match &self.validator {
            Some(validator) => validator(value),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for RegisteredOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredOption")
            .field("key", &self.key)
            .field("default_value", &self.default_value)
            .field("doc", &self.doc)
            .field("validator", &self.validator.is_some())
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// The deprecation record for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecatedOption {
    /// The deprecated key, lowercase-normalized but otherwise unchecked.
    pub key: String,
    /// Custom warning text; a default message is built when absent.
    pub message: Option<String>,
    /// Replacement key that accesses are rerouted to.
    pub redirect_key: Option<String>,
    /// Version in which the option will be removed.
    pub removal_version: Option<String>,
}

/// Builder for the optional parts of a deprecation declaration.
///
/// # Example
///
/// ```
/// use knobwork::core::metadata::Deprecation;
///
/// let note = Deprecation::new()
///     .redirect_to("display.width")
///     .removed_in("2.0");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Deprecation {
    pub(crate) message: Option<String>,
    pub(crate) redirect_key: Option<String>,
    pub(crate) removal_version: Option<String>,
}

impl Deprecation {
    /// Start an empty deprecation note.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom warning message instead of the generated one.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Reroute accesses of the deprecated key to a replacement key.
    pub fn redirect_to(mut self, key: impl Into<String>) -> Self {
        self.redirect_key = Some(key.into());
        self
    }

    /// Name the version in which the option will be removed.
    pub fn removed_in(mut self, version: impl Into<String>) -> Self {
        self.removal_version = Some(version.into());
        self
    }
}

/// Builder for a registration.
///
/// # Example
///
/// ```
/// use knobwork::core::metadata::OptionSpec;
///
/// let spec = OptionSpec::new("display.width", 80)
///     .doc("Width of the rendered frame in columns.")
///     .validator(|v| {
///         v.as_u64().map(|_| ()).ok_or_else(|| "must be a non-negative integer".to_string())
///     });
/// ```
pub struct OptionSpec {
    pub(crate) key: String,
    pub(crate) default_value: Value,
    pub(crate) doc: String,
    pub(crate) validator: Option<Validator>,
    pub(crate) callback: Option<SetCallback>,
}

impl OptionSpec {
    /// Start a spec for `key` with its default value.
    pub fn new(key: impl Into<String>, default_value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            default_value: default_value.into(),
            doc: String::new(),
            validator: None,
            callback: None,
        }
    }

    /// Attach doc text shown by `describe`.
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Attach a validation predicate.
    ///
    /// The default value is checked against it at registration time, and
    /// every subsequent write is checked before the value is stored.
    pub fn validator(
        mut self,
        validator: impl Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Attach a callback invoked with the key after every set or reset.
    pub fn on_set(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Prepend a prefix to the spec's key.
    pub(crate) fn prefixed(mut self, prefix: &str) -> Self {
        self.key = format!("{}.{}", prefix, self.key);
        self
    }
}

impl fmt::Debug for OptionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionSpec")
            .field("key", &self.key)
            .field("default_value", &self.default_value)
            .field("doc", &self.doc)
            .field("validator", &self.validator.is_some())
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// Store of registration and deprecation records, keyed by
/// fully-qualified key.
///
/// Sorted maps keep every listing operation in lexicographic key order.
#[derive(Debug, Default)]
pub struct MetadataStore {
    registered: BTreeMap<String, RegisteredOption>,
    deprecated: BTreeMap<String, DeprecatedOption>,
}

impl MetadataStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a registration record.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::AlreadyRegistered` if the key is taken.
    pub fn insert_registered(&mut self, record: RegisteredOption) -> Result<(), MetadataError> {
        let key = record.key.as_str().to_string();
        if self.registered.contains_key(&key) {
            return Err(MetadataError::AlreadyRegistered(key));
        }
        self.registered.insert(key, record);
        Ok(())
    }

    /// Store a deprecation record.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::AlreadyDeprecated` if the key already has
    /// one.
    pub fn insert_deprecated(&mut self, record: DeprecatedOption) -> Result<(), MetadataError> {
        if self.deprecated.contains_key(&record.key) {
            return Err(MetadataError::AlreadyDeprecated(record.key));
        }
        self.deprecated.insert(record.key.clone(), record);
        Ok(())
    }

    /// Look up the registration record for a key.
    pub fn registered(&self, key: &str) -> Option<&RegisteredOption> {
        self.registered.get(key)
    }

    /// Whether a key is registered.
    pub fn is_registered(&self, key: &str) -> bool {
        self.registered.contains_key(key)
    }

    /// Look up the deprecation record for a key.
    pub fn deprecated(&self, key: &str) -> Option<&DeprecatedOption> {
        self.deprecated.get(key)
    }

    /// Whether a key has been deprecated.
    pub fn is_deprecated(&self, key: &str) -> bool {
        self.deprecated.contains_key(key)
    }

    /// All registered keys, in lexicographic order.
    pub fn registered_keys(&self) -> impl Iterator<Item = &str> {
        self.registered.keys().map(String::as_str)
    }

    /// Number of registered options.
    pub fn len(&self) -> usize {
        self.registered.len()
    }

    /// Whether no options are registered.
    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str, default: impl Into<Value>) -> RegisteredOption {
        RegisteredOption {
            key: OptionKey::parse(key).unwrap(),
            default_value: default.into(),
            doc: String::new(),
            validator: None,
            callback: None,
        }
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut store = MetadataStore::new();
        store.insert_registered(record("a.b", 1)).unwrap();

        assert_eq!(
            store.insert_registered(record("a.b", 2)),
            Err(MetadataError::AlreadyRegistered("a.b".into()))
        );
        assert_eq!(store.registered("a.b").map(|r| &r.default_value), Some(&Value::from(1)));
    }

    #[test]
    fn duplicate_deprecation_rejected() {
        let mut store = MetadataStore::new();
        let note = DeprecatedOption {
            key: "a.b".into(),
            message: None,
            redirect_key: None,
            removal_version: None,
        };
        store.insert_deprecated(note.clone()).unwrap();

        assert_eq!(
            store.insert_deprecated(note),
            Err(MetadataError::AlreadyDeprecated("a.b".into()))
        );
    }

    #[test]
    fn deprecation_does_not_require_registration() {
        let mut store = MetadataStore::new();
        store
            .insert_deprecated(DeprecatedOption {
                key: "gone".into(),
                message: None,
                redirect_key: Some("elsewhere".into()),
                removal_version: None,
            })
            .unwrap();

        assert!(store.is_deprecated("gone"));
        assert!(!store.is_registered("gone"));
    }

    #[test]
    fn keys_iterate_sorted() {
        let mut store = MetadataStore::new();
        store.insert_registered(record("b", 1)).unwrap();
        store.insert_registered(record("a.z", 2)).unwrap();
        store.insert_registered(record("a.c", 3)).unwrap();

        assert_eq!(store.registered_keys().collect::<Vec<_>>(), ["a.c", "a.z", "b"]);
    }

    #[test]
    fn validate_without_validator_accepts_all() {
        let rec = record("a", 1);
        assert!(rec.validate(&Value::from("anything")).is_ok());
    }
}
