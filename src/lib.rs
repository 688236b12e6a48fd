//! Knobwork - an in-process registry of hierarchical runtime options
//!
//! Knobwork lets an application declare named, typed, documented,
//! optionally-validated configuration values addressable by dotted path
//! (e.g. `display.width`), and lets consumers read and write those values
//! by full or partial (regex) key, with deprecation and redirection
//! support.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`core`] - Domain types: validated keys, the namespace tree, and
//!   option metadata records
//! - [`registry`] - The mutation/access engine: registration, pattern
//!   resolution, get/set/reset, scoped overrides, and views
//! - [`validators`] - Convenience validator factories for common value
//!   shapes
//!
//! # Correctness Invariants
//!
//! Knobwork maintains the following invariants:
//!
//! 1. Every registered key has exactly one leaf in the namespace tree,
//!    and vice versa
//! 2. Keys are lowercase-normalized at registration and at every lookup
//! 3. An exact key match always wins over regex search, so a key can
//!    never shadow itself into ambiguity
//! 4. Redirects from deprecated keys are followed at most one hop per
//!    access
//! 5. Scoped overrides restore the captured values on every exit path,
//!    including unwinding
//!
//! # Concurrency
//!
//! A [`registry::Registry`] is single-threaded by design: operations are
//! synchronous and the registry holds no internal locks. Callers that
//! share one across threads must provide their own synchronization.

pub mod core;
pub mod registry;
pub mod validators;
