//! core::tree
//!
//! The namespace tree: hierarchical storage for current option values.
//!
//! # Architecture
//!
//! The tree mirrors the dotted-key hierarchy. A [`Node`] is either a
//! `Leaf` holding one current value or a `Branch` holding a sorted map of
//! child nodes. The set of leaves is exactly the set of registered keys;
//! registration is the only operation that creates leaves.
//!
//! # Collisions
//!
//! A key can never be both a leaf and a namespace. Inserting `a.b.c` when
//! `a.b` is a leaf fails, and so does inserting `a.b` when `a.b.c`
//! already exists.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use super::key::OptionKey;

/// Errors from namespace tree operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// A prefix of the inserted key is already a leaf.
    #[error("path prefix to option '{0}' is already an option")]
    PrefixIsLeaf(String),

    /// The inserted key's own position already holds a namespace.
    #[error("option '{0}' would overwrite an existing namespace")]
    OccupiedByNamespace(String),
}

/// One node of the namespace tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A current option value.
    Leaf(Value),
    /// A sub-namespace of child nodes, keyed by segment.
    Branch(BTreeMap<String, Node>),
}

impl Node {
    /// Look up a direct child by segment name.
    ///
    /// Returns `None` for leaves and for unknown names.
    pub fn child(&self, name: &str) -> Option<&Node> {
        match self {
            Node::Branch(children) => children.get(name),
            Node::Leaf(_) => None,
        }
    }

    /// Whether this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// The value held by a leaf, or `None` for branches.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Node::Leaf(value) => Some(value),
            Node::Branch(_) => None,
        }
    }

    /// Names of direct children, in sorted order. Empty for leaves.
    pub fn child_names(&self) -> Vec<&str> {
        match self {
            Node::Branch(children) => children.keys().map(String::as_str).collect(),
            Node::Leaf(_) => Vec::new(),
        }
    }
}

/// Hierarchical value store mirroring dotted key structure.
///
/// # Example
///
/// ```
/// use knobwork::core::key::OptionKey;
/// use knobwork::core::tree::NamespaceTree;
/// use serde_json::Value;
///
/// let mut tree = NamespaceTree::new();
/// let key = OptionKey::parse("display.width").unwrap();
/// tree.insert(&key, Value::from(80)).unwrap();
///
/// assert_eq!(tree.value("display.width"), Some(&Value::from(80)));
/// assert!(tree.value("display").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct NamespaceTree {
    root: BTreeMap<String, Node>,
}

impl NamespaceTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new leaf, creating intermediate branches as needed.
    ///
    /// # Errors
    ///
    /// - [`TreeError::PrefixIsLeaf`] if an intermediate segment is
    ///   already a leaf
    /// - [`TreeError::OccupiedByNamespace`] if the final segment already
    ///   holds a branch
    pub fn insert(&mut self, key: &OptionKey, value: Value) -> Result<(), TreeError> {
        let segments: Vec<&str> = key.segments().collect();
        let (last, parents) = match segments.split_last() {
            Some(split) => split,
            None => return Err(TreeError::PrefixIsLeaf(key.to_string())),
        };

        let mut cursor = &mut self.root;
        for (i, segment) in parents.iter().enumerate() {
            let node = cursor
                .entry((*segment).to_string())
                .or_insert_with(|| Node::Branch(BTreeMap::new()));
            cursor = match node {
                Node::Branch(children) => children,
                Node::Leaf(_) => {
                    return Err(TreeError::PrefixIsLeaf(segments[..=i].join(".")));
                }
            };
        }

        match cursor.get(*last) {
            Some(Node::Branch(_)) => Err(TreeError::OccupiedByNamespace(key.to_string())),
            // Duplicate leaves are rejected upstream by registration, so
            // an occupied leaf slot is treated the same way.
            Some(Node::Leaf(_)) => Err(TreeError::OccupiedByNamespace(key.to_string())),
            None => {
                cursor.insert((*last).to_string(), Node::Leaf(value));
                Ok(())
            }
        }
    }

    /// Read the value at a fully-qualified key.
    ///
    /// Returns `None` if the path does not lead to a leaf.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.node(key).and_then(Node::value)
    }

    /// Overwrite the value at an existing leaf.
    ///
    /// Returns `false` if the path does not lead to a leaf; the tree is
    /// left unchanged in that case.
    pub fn set_value(&mut self, key: &str, value: Value) -> bool {
        let mut segments = key.split('.');
        let mut cursor = &mut self.root;
        let mut current = match segments.next() {
            Some(first) => first,
            None => return false,
        };

        for next in segments {
            cursor = match cursor.get_mut(current) {
                Some(Node::Branch(children)) => children,
                _ => return false,
            };
            current = next;
        }

        match cursor.get_mut(current) {
            Some(Node::Leaf(slot)) => {
                *slot = value;
                true
            }
            _ => false,
        }
    }

    /// Navigate to the node at a dotted path.
    ///
    /// The empty path addresses the (virtual) root branch, which is
    /// returned as `None`; use [`NamespaceTree::root_names`] to list
    /// top-level entries.
    pub fn node(&self, path: &str) -> Option<&Node> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut node = self.root.get(first)?;
        for segment in segments {
            node = node.child(segment)?;
        }
        Some(node)
    }

    /// Names of top-level namespace entries, in sorted order.
    pub fn root_names(&self) -> Vec<&str> {
        self.root.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> OptionKey {
        OptionKey::parse(s).unwrap()
    }

    #[test]
    fn insert_and_read_nested() {
        let mut tree = NamespaceTree::new();
        tree.insert(&key("display.width"), Value::from(80)).unwrap();
        tree.insert(&key("display.height"), Value::from(25)).unwrap();
        tree.insert(&key("verbose"), Value::from(false)).unwrap();

        assert_eq!(tree.value("display.width"), Some(&Value::from(80)));
        assert_eq!(tree.value("display.height"), Some(&Value::from(25)));
        assert_eq!(tree.value("verbose"), Some(&Value::from(false)));
        assert_eq!(tree.root_names(), ["display", "verbose"]);
    }

    #[test]
    fn value_is_none_for_branches_and_unknowns() {
        let mut tree = NamespaceTree::new();
        tree.insert(&key("display.width"), Value::from(80)).unwrap();

        assert!(tree.value("display").is_none());
        assert!(tree.value("display.depth").is_none());
        assert!(tree.value("sound.volume").is_none());
    }

    #[test]
    fn set_value_overwrites_leaves_only() {
        let mut tree = NamespaceTree::new();
        tree.insert(&key("display.width"), Value::from(80)).unwrap();

        assert!(tree.set_value("display.width", Value::from(120)));
        assert_eq!(tree.value("display.width"), Some(&Value::from(120)));

        assert!(!tree.set_value("display", Value::from(0)));
        assert!(!tree.set_value("display.depth", Value::from(0)));
        assert!(!tree.set_value("display.width.extra", Value::from(0)));
    }

    #[test]
    fn leaf_prefix_collides() {
        let mut tree = NamespaceTree::new();
        tree.insert(&key("x.y"), Value::from(1)).unwrap();

        assert_eq!(
            tree.insert(&key("x.y.z"), Value::from(2)),
            Err(TreeError::PrefixIsLeaf("x.y".into()))
        );
        assert_eq!(
            tree.insert(&key("x.y.z.w"), Value::from(3)),
            Err(TreeError::PrefixIsLeaf("x.y".into()))
        );
    }

    #[test]
    fn namespace_cannot_be_overwritten() {
        let mut tree = NamespaceTree::new();
        tree.insert(&key("x.y.z"), Value::from(1)).unwrap();

        assert_eq!(
            tree.insert(&key("x.y"), Value::from(2)),
            Err(TreeError::OccupiedByNamespace("x.y".into()))
        );
        // The subtree is untouched after the failed insert
        assert_eq!(tree.value("x.y.z"), Some(&Value::from(1)));
    }

    #[test]
    fn node_navigation() {
        let mut tree = NamespaceTree::new();
        tree.insert(&key("display.width"), Value::from(80)).unwrap();

        let display = tree.node("display").unwrap();
        assert!(!display.is_leaf());
        assert_eq!(display.child_names(), ["width"]);

        let width = display.child("width").unwrap();
        assert!(width.is_leaf());
        assert_eq!(width.value(), Some(&Value::from(80)));
        assert!(width.child("anything").is_none());
    }
}
