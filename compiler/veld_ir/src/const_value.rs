//! Compile-time constant values.

use crate::Name;

/// A compile-time constant carried by a bound node.
///
/// Nodes that are not compile-time constant carry no `ConstValue` at all;
/// there is no "non-constant" variant here.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ConstValue {
    /// The null reference constant.
    Null,
    /// A boolean constant.
    Bool(bool),
    /// An integral constant (all integral kinds share this carrier).
    Int(i64),
    /// An interned string constant.
    Str(Name),
    /// The unit constant.
    Unit,
}

impl ConstValue {
    /// Whether this is the null constant.
    #[inline]
    pub const fn is_null(self) -> bool {
        matches!(self, ConstValue::Null)
    }

    /// Whether this is the type's default value: null, zero, false, the
    /// empty string, or unit.
    pub fn is_default(self) -> bool {
        match self {
            ConstValue::Null | ConstValue::Unit => true,
            ConstValue::Bool(value) => !value,
            ConstValue::Int(value) => value == 0,
            ConstValue::Str(name) => name.is_empty(),
        }
    }
}
