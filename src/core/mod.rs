//! core
//!
//! Core domain types for Knobwork.
//!
//! # Modules
//!
//! - [`key`] - Validated, lowercase-normalized option keys
//! - [`tree`] - The namespace tree holding current values
//! - [`metadata`] - Registration and deprecation records and their store
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid keys from reaching the tree
//! - The tree's leaf set always equals the registered key set
//! - Sorted maps make every listing deterministic

pub mod key;
pub mod metadata;
pub mod tree;
