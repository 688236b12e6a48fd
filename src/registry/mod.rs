//! registry
//!
//! The mutation/access engine for options.
//!
//! # Overview
//!
//! A [`Registry`] owns the option metadata store and the namespace tree,
//! and orchestrates every operation through pattern resolution:
//!
//! - [`Registry::register`] / [`Registry::deprecate`] declare options
//! - [`Registry::get`] / [`Registry::set`] / [`Registry::reset`] read and
//!   write through patterns (exact key, partial/regex match, `"all"`)
//! - [`Registry::describe`] formats human-readable listings
//! - [`Registry::scoped`] applies reversible temporary overrides
//! - [`Registry::prefixed`] scopes register/get/set under a key prefix
//! - [`Registry::view`] navigates the namespace tree explicitly
//!
//! # Warnings
//!
//! Deprecation notices are a warning channel, not errors: accessing a
//! deprecated key succeeds but surfaces a notice through the registry's
//! warning handler, which defaults to `log::warn!`. Operations invoked
//! with `silent = true` skip the handler.
//!
//! # Ownership
//!
//! A `Registry` is an ordinary owned value; construct one where the
//! application wires its state and share it as needed. Nothing in this
//! module is process-global.

mod describe;
mod resolve;

pub mod overrides;
pub mod prefix;
pub mod view;

pub use overrides::ScopedOverrides;
pub use prefix::Prefixed;
pub use view::{OptionsView, OptionsViewMut};

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::core::key::{KeyError, OptionKey};
use crate::core::metadata::{
    Deprecation, DeprecatedOption, MetadataError, MetadataStore, OptionSpec, RegisteredOption,
};
use crate::core::tree::{NamespaceTree, TreeError};

/// Patterns with a special meaning that can never be registered keys.
pub const RESERVED_KEYS: &[&str] = &["all"];

/// Errors from registry operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionError {
    /// The pattern matched zero registered keys.
    #[error("no such option: '{0}'")]
    NoSuchOption(String),

    /// The pattern matched more than one key where one was required.
    #[error("pattern '{0}' matched multiple options")]
    AmbiguousPattern(String),

    /// A short pattern matched multiple keys during reset.
    #[error(
        "pattern '{0}' matched multiple options; use at least 4 characters, \
         or the keyword \"all\" to reset every option"
    )]
    ResetPatternTooShort(String),

    /// The key was registered before.
    #[error("option '{0}' has already been registered")]
    AlreadyRegistered(String),

    /// The key is a reserved pattern.
    #[error("option '{0}' is a reserved key")]
    ReservedKey(String),

    /// The key violates the identifier grammar.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// The key collides with an existing leaf or namespace.
    #[error(transparent)]
    PathCollision(#[from] TreeError),

    /// The registered validator rejected the default value.
    #[error("invalid default for option '{key}': {message}")]
    InvalidDefault { key: String, message: String },

    /// The key was deprecated before.
    #[error("option '{0}' has already been marked deprecated")]
    AlreadyDeprecated(String),

    /// The registered validator rejected a candidate value.
    #[error("invalid value for option '{key}': {message}")]
    Validation { key: String, message: String },

    /// The pattern is not a valid regular expression.
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// `set` was called with no pairs.
    #[error("set requires at least one (pattern, value) pair")]
    EmptyPairs,

    /// A view addressed a namespace where a single option was required.
    #[error("'{0}' is a namespace, not an option")]
    NotAnOption(String),

    /// A view assignment addressed something other than an existing leaf.
    #[error("'{0}' is not an assignable option value")]
    NotAssignable(String),
}

impl From<MetadataError> for OptionError {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::AlreadyRegistered(key) => OptionError::AlreadyRegistered(key),
            MetadataError::AlreadyDeprecated(key) => OptionError::AlreadyDeprecated(key),
        }
    }
}

/// The option registry.
///
/// Holds the metadata store and the namespace tree, and exposes the full
/// access surface. See the [module docs](self) for an overview.
///
/// # Example
///
/// ```
/// use knobwork::core::metadata::OptionSpec;
/// use knobwork::registry::Registry;
/// use serde_json::Value;
///
/// let mut registry = Registry::new();
/// registry
///     .register(OptionSpec::new("display.width", 80).doc("Frame width in columns."))
///     .unwrap();
///
/// assert_eq!(registry.get("display.width", false).unwrap(), &Value::from(80));
/// registry.set_one("display.width", 120, false).unwrap();
/// assert_eq!(registry.get("display.width", false).unwrap(), &Value::from(120));
/// registry.reset("display.width", false).unwrap();
/// assert_eq!(registry.get("display.width", false).unwrap(), &Value::from(80));
/// ```
pub struct Registry {
    pub(crate) meta: MetadataStore,
    pub(crate) tree: NamespaceTree,
    warn_handler: Box<dyn Fn(&str) + Send + Sync>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("meta", &self.meta)
            .field("tree", &self.tree)
            .finish()
    }
}

impl Registry {
    /// Create an empty registry.
    ///
    /// Deprecation notices go to `log::warn!` until
    /// [`Registry::set_warning_handler`] installs something else.
    pub fn new() -> Self {
        Self {
            meta: MetadataStore::new(),
            tree: NamespaceTree::new(),
            warn_handler: Box::new(|message| log::warn!("{}", message)),
        }
    }

    /// Register a new option.
    ///
    /// The key is lowercase-normalized first; the checks then run in a
    /// fixed order so the caller always sees the most fundamental
    /// violation.
    ///
    /// # Errors
    ///
    /// - [`OptionError::AlreadyRegistered`] if the key is taken
    /// - [`OptionError::ReservedKey`] if the key is a reserved pattern
    /// - [`OptionError::InvalidDefault`] if the spec's validator rejects
    ///   the default value
    /// - [`OptionError::Key`] if a segment violates the identifier
    ///   grammar
    /// - [`OptionError::PathCollision`] if the key collides with an
    ///   existing leaf or namespace
    pub fn register(&mut self, spec: OptionSpec) -> Result<(), OptionError> {
        let normalized = spec.key.to_ascii_lowercase();

        if self.meta.is_registered(&normalized) {
            return Err(OptionError::AlreadyRegistered(normalized));
        }
        if RESERVED_KEYS.contains(&normalized.as_str()) {
            return Err(OptionError::ReservedKey(normalized));
        }

        // the default value must itself be legal
        if let Some(validator) = &spec.validator {
            validator(&spec.default_value).map_err(|message| OptionError::InvalidDefault {
                key: normalized.clone(),
                message,
            })?;
        }

        let key = OptionKey::parse(&normalized)?;
        self.tree.insert(&key, spec.default_value.clone())?;

        self.meta.insert_registered(RegisteredOption {
            key,
            default_value: spec.default_value,
            doc: spec.doc,
            validator: spec.validator,
            callback: spec.callback,
        })?;

        Ok(())
    }

    /// Mark a key as deprecated.
    ///
    /// Neither the key nor the redirect target has to be registered;
    /// missing targets surface as [`OptionError::NoSuchOption`] at access
    /// time, after the deprecation notice. Keys and redirect targets are
    /// lowercase-normalized here so translation always lands in the
    /// normalized key space.
    ///
    /// # Errors
    ///
    /// Returns [`OptionError::AlreadyDeprecated`] if the key already has
    /// a deprecation record.
    pub fn deprecate(&mut self, key: &str, note: Deprecation) -> Result<(), OptionError> {
        self.meta.insert_deprecated(DeprecatedOption {
            key: key.to_ascii_lowercase(),
            message: note.message,
            redirect_key: note.redirect_key.map(|k| k.to_ascii_lowercase()),
            removal_version: note.removal_version,
        })?;
        Ok(())
    }

    /// Read the current value of the option matching `pattern`.
    ///
    /// Unless `silent`, a deprecation notice is emitted when the pattern
    /// or the resolved key is deprecated, including on the zero-match
    /// failure path.
    ///
    /// # Errors
    ///
    /// - [`OptionError::NoSuchOption`] if nothing matches
    /// - [`OptionError::AmbiguousPattern`] if more than one key matches
    /// - [`OptionError::InvalidPattern`] if the pattern is not a valid
    ///   regex
    pub fn get(&self, pattern: &str, silent: bool) -> Result<&Value, OptionError> {
        let key = self.resolve_single(pattern, silent)?;
        self.tree
            .value(&key)
            .ok_or(OptionError::NoSuchOption(key))
    }

    /// Set one or more options.
    ///
    /// Each pair is resolved, validated, and written independently, in
    /// order. The batch is not atomic: when pair *i* fails, pairs
    /// `0..i-1` remain applied.
    ///
    /// # Errors
    ///
    /// - [`OptionError::EmptyPairs`] if `pairs` is empty
    /// - [`OptionError::Validation`] if a registered validator rejects a
    ///   value; that option's previous value is left untouched
    /// - The resolution errors of [`Registry::get`], per pair
    pub fn set(&mut self, pairs: &[(&str, Value)], silent: bool) -> Result<(), OptionError> {
        if pairs.is_empty() {
            return Err(OptionError::EmptyPairs);
        }
        for (pattern, value) in pairs {
            self.apply_one(pattern, value.clone(), silent)?;
        }
        Ok(())
    }

    /// Set a single option. Convenience form of [`Registry::set`].
    pub fn set_one(
        &mut self,
        pattern: &str,
        value: impl Into<Value>,
        silent: bool,
    ) -> Result<(), OptionError> {
        self.apply_one(pattern, value.into(), silent)
    }

    /// Resolve, validate, write, then fire the callback for one pair.
    fn apply_one(&mut self, pattern: &str, value: Value, silent: bool) -> Result<(), OptionError> {
        let key = self.resolve_single(pattern, silent)?;

        let record = self
            .meta
            .registered(&key)
            .ok_or_else(|| OptionError::NoSuchOption(key.clone()))?;
        record
            .validate(&value)
            .map_err(|message| OptionError::Validation {
                key: key.clone(),
                message,
            })?;

        if !self.tree.set_value(&key, value) {
            return Err(OptionError::NoSuchOption(key));
        }

        if let Some(record) = self.meta.registered(&key) {
            if let Some(callback) = &record.callback {
                callback(&key);
            }
        }

        Ok(())
    }

    /// Reset every option matching `pattern` to its registered default.
    ///
    /// Multi-key resets are guarded: a pattern shorter than 4 characters
    /// that matches more than one key fails unless it is the literal
    /// `"all"`.
    ///
    /// # Errors
    ///
    /// - [`OptionError::NoSuchOption`] if nothing matches
    /// - [`OptionError::ResetPatternTooShort`] per the guard above
    pub fn reset(&mut self, pattern: &str, silent: bool) -> Result<(), OptionError> {
        let keys = self.select_keys(pattern)?;

        if keys.is_empty() {
            return Err(OptionError::NoSuchOption(pattern.to_string()));
        }
        if keys.len() > 1 && pattern != "all" && pattern.chars().count() < 4 {
            return Err(OptionError::ResetPatternTooShort(pattern.to_string()));
        }

        for key in keys {
            // A redirected key resets its target, to the target's default.
            let target = self.translate_key(key.clone());
            let default = self
                .meta
                .registered(&target)
                .ok_or(OptionError::NoSuchOption(target))?
                .default_value
                .clone();
            self.apply_one(&key, default, silent)?;
        }

        Ok(())
    }

    /// Read the registered default of the option matching `pattern`.
    ///
    /// Resolution is silent; no deprecation notice is emitted.
    pub fn default_value(&self, pattern: &str) -> Result<&Value, OptionError> {
        let key = self.resolve_single(pattern, true)?;
        self.meta
            .registered(&key)
            .map(|record| &record.default_value)
            .ok_or(OptionError::NoSuchOption(key))
    }

    /// All registered keys, in lexicographic order.
    pub fn keys(&self) -> Vec<&str> {
        self.meta.registered_keys().collect()
    }

    /// Number of registered options.
    pub fn len(&self) -> usize {
        self.meta.len()
    }

    /// Whether no options are registered.
    pub fn is_empty(&self) -> bool {
        self.meta.is_empty()
    }

    /// Replace the warning handler that receives deprecation notices.
    pub fn set_warning_handler(&mut self, handler: impl Fn(&str) + Send + Sync + 'static) {
        self.warn_handler = Box::new(handler);
    }

    /// Emit a notice through the warning handler.
    pub(crate) fn emit_warning(&self, message: &str) {
        (self.warn_handler)(message);
    }
}
