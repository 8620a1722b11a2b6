//! Bound-tree lowering for the Veld compiler.
//!
//! Transforms a fully type-checked bound tree into a simplified,
//! execution-ready tree that the code generator can walk directly:
//!
//! - labeled and unlabeled `break`/`continue` become jumps to synthesized
//!   label symbols, loops become label/jump form, and switches get their
//!   break target resolved;
//! - conditional yields (`yield` only when the value is non-null/
//!   non-default) become blocks of primitive assignments, guards, and
//!   unconditional yields, evaluating the source expression exactly once.
//!
//! # Pipeline Position
//!
//! ```text
//! (external binder) → bound tree → **veld_lower** → (code generator)
//! ```
//!
//! # Output Contract
//!
//! The lowered tree contains only unconditional yields and only resolved
//! label symbols. Every synthesized local is scoped to an explicit block so
//! the generator can determine exact lifetimes. Debug builds verify the
//! contract after every lowering (see [`validate`]).

mod lower;
mod validate;

pub use lower::{lower_body, LowerResult, Lowerer};
pub use validate::validate;
