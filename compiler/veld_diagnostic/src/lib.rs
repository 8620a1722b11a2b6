//! Diagnostic collection for the Veld lowering and symbol-resolution core.
//!
//! Diagnostics flow in two stages:
//!
//! 1. Each computation appends into its own thread-confined
//!    [`DiagnosticBag`] — cheap, unsynchronized, append-only.
//! 2. The computation that wins publication commits its bag to the shared
//!    [`DiagnosticSink`] in one bulk merge. Computations that lose a
//!    memoization race drop their bag whole, so concurrent first access to
//!    a symbol attribute never duplicates diagnostics.
//!
//! Rendering (terminal/JSON emitters) lives outside this core; the sink
//! exposes structured [`Diagnostic`] records only.

mod bag;
mod diagnostic;
mod error_code;
pub mod fatal;

pub use bag::{DiagnosticBag, DiagnosticSink};
pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use fatal::{crash_if_fail_fast_enabled, fail_fast_enabled, FatalKind};
