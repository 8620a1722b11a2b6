//! Symbol table for the Veld lowering core.
//!
//! Symbols here carry *derived attributes* that are computed lazily, on
//! first demand, under concurrent access:
//!
//! - [`MemoCell`] — the lock-free compute-once slot every derived attribute
//!   funnels through. Readers see the unstarted sentinel or the single
//!   winning value, never anything in between; only the winning
//!   computation's diagnostics reach the sink.
//! - [`LabelTable`] — source and generated jump-target label symbols, with
//!   debug-only sequence-numbered display names and write-once links from
//!   generated labels back to the source labels they represent.
//! - [`EnumSymbol`] — enum type symbols whose underlying integral type and
//!   synthesized backing-value field are memoized per symbol.
//!
//! The bound tree itself is immutable; these cells (plus the field arena
//! and the label sequence counter) are the only mutable shared state in
//! the core, and every cell mutation goes through one compare-and-swap.

mod enums;
mod label;
mod memo;

pub use enums::{
    EnumDeclaration, EnumSymbol, FieldId, FieldSymbol, FieldTable, SymbolId, TypeKind,
};
pub use label::{GeneratedLabelKind, LabelTable};
pub use memo::{MemoCell, MemoValue};
