//! Bound-tree intermediate representation for the Veld compiler.
//!
//! This crate holds the data model shared by the symbol table and the
//! lowering pass:
//!
//! - [`Span`] — compact source locations
//! - [`Name`] / [`StringInterner`] — thread-safe interned identifiers
//! - [`TypeId`] / [`TypePool`] — O(1) type handles with the integral kinds
//!   pre-interned, plus the null/default guard classification
//! - [`ConstValue`] — compile-time constants
//! - [`bound`] — the immutable bound tree: struct-of-arrays arena, tagged
//!   node kinds, locals, switch arms, and jump-target handles
//!
//! # Pipeline Position
//!
//! ```text
//! Source → (external binder) → **bound tree** → veld_lower → (code generator)
//! ```
//!
//! The bound tree is immutable after construction and freely shared across
//! compilation threads without locking.

mod const_value;
mod interner;
mod name;
mod span;
mod types;

pub mod bound;

pub use bound::{
    ArmRange, BoundArena, BoundId, BoundKind, BoundNode, BoundRange, LabelId, LocalDecl, LocalId,
    LocalRange, SwitchArm,
};
pub use const_value::ConstValue;
pub use interner::StringInterner;
pub use name::Name;
pub use span::Span;
pub use types::{TypeId, TypePool, TypeShape};
