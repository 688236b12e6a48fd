//! registry::view
//!
//! Explicit navigation over the namespace tree.
//!
//! # Design
//!
//! Views replace attribute-style access with two explicit operations:
//! [`OptionsView::child`] walks one segment down the tree, and
//! [`OptionsView::value`] reads the leaf at the current position.
//! Assignment goes through [`OptionsViewMut::assign`] and only succeeds
//! for names that already exist as leaves; a view can never create
//! options or overwrite namespaces.

use std::fmt;

use serde_json::Value;

use super::{OptionError, Registry};
use crate::core::tree::Node;

fn join_path(path: &str, name: &str) -> String {
    let name = name.to_ascii_lowercase();
    if path.is_empty() {
        name
    } else {
        format!("{}.{}", path, name)
    }
}

/// Read-only position in the namespace tree.
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
/// let width = registry.view().child("display").unwrap().child("width").unwrap();
/// assert_eq!(width.value().unwrap(), &Value::from(80));
/// ```
#[derive(Debug, Clone)]
pub struct OptionsView<'a> {
    registry: &'a Registry,
    path: String,
}

/// Mutable position in the namespace tree.
#[derive(Debug)]
pub struct OptionsViewMut<'a> {
    registry: &'a mut Registry,
    path: String,
}

impl Registry {
    /// A read-only view rooted at the top of the namespace tree.
    pub fn view(&self) -> OptionsView<'_> {
        OptionsView {
            registry: self,
            path: String::new(),
        }
    }

    /// A mutable view rooted at the top of the namespace tree.
    pub fn view_mut(&mut self) -> OptionsViewMut<'_> {
        OptionsViewMut {
            registry: self,
            path: String::new(),
        }
    }
}

impl<'a> OptionsView<'a> {
    /// Walk one segment down the tree.
    ///
    /// # Errors
    ///
    /// Returns [`OptionError::NoSuchOption`] if no node exists under
    /// that name.
    pub fn child(&self, name: &str) -> Result<OptionsView<'a>, OptionError> {
        let full = join_path(&self.path, name);
        match self.registry.tree.node(&full) {
            Some(_) => Ok(OptionsView {
                registry: self.registry,
                path: full,
            }),
            None => Err(OptionError::NoSuchOption(full)),
        }
    }

    /// Read the option value at the current position.
    ///
    /// Emits a deprecation notice like any other non-silent read.
    ///
    /// # Errors
    ///
    /// Returns [`OptionError::NotAnOption`] when the position is a
    /// namespace rather than a single option.
    pub fn value(&self) -> Result<&'a Value, OptionError> {
        match self.registry.tree.node(&self.path) {
            Some(Node::Leaf(_)) => self.registry.get(&self.path, false),
            Some(Node::Branch(_)) => Err(OptionError::NotAnOption(self.path.clone())),
            None => Err(OptionError::NoSuchOption(self.path.clone())),
        }
    }

    /// Names of the children at the current position, sorted.
    pub fn keys(&self) -> Vec<&str> {
        if self.path.is_empty() {
            return self.registry.tree.root_names();
        }
        match self.registry.tree.node(&self.path) {
            Some(node) => node.child_names(),
            None => Vec::new(),
        }
    }

    /// Whether the current position is a single option.
    pub fn is_leaf(&self) -> bool {
        self.registry
            .tree
            .node(&self.path)
            .map(Node::is_leaf)
            .unwrap_or(false)
    }

    /// The dotted path of the current position; empty at the root.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for OptionsView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.registry.describe(&self.path) {
            Ok(description) => {
                writeln!(f, "OptionsView(")?;
                for line in description.lines() {
                    writeln!(f, "  {}", line)?;
                }
                write!(f, ")")
            }
            Err(_) => write!(f, "OptionsView()"),
        }
    }
}

impl<'a> OptionsViewMut<'a> {
    /// Walk one segment down the tree, consuming the view.
    pub fn child(self, name: &str) -> Result<OptionsViewMut<'a>, OptionError> {
        let full = join_path(&self.path, name);
        match self.registry.tree.node(&full) {
            Some(_) => Ok(OptionsViewMut {
                registry: self.registry,
                path: full,
            }),
            None => Err(OptionError::NoSuchOption(full)),
        }
    }

    /// Assign a new value to the child option `name`.
    ///
    /// Only names that already exist as leaves are assignable; unknown
    /// names and namespaces are rejected, so views can never register
    /// options as a side effect.
    ///
    /// # Errors
    ///
    /// - [`OptionError::NotAssignable`] if `name` is not an existing
    ///   leaf
    /// - [`OptionError::Validation`] if the option's validator rejects
    ///   the value
    pub fn assign(&mut self, name: &str, value: impl Into<Value>) -> Result<(), OptionError> {
        let full = join_path(&self.path, name);
        match self.registry.tree.node(&full) {
            Some(Node::Leaf(_)) => self.registry.set_one(&full, value, false),
            _ => Err(OptionError::NotAssignable(full)),
        }
    }

    /// A read-only view of the same position.
    pub fn as_view(&self) -> OptionsView<'_> {
        OptionsView {
            registry: self.registry,
            path: self.path.clone(),
        }
    }
}
