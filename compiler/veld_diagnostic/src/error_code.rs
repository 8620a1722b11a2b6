use std::fmt;

/// Error codes for all diagnostics emitted by this core.
///
/// Format: E#### where the first digit indicates the phase:
/// - E2xxx: Symbol/type resolution errors
/// - E4xxx: Lowering errors
/// - E9xxx: Internal compiler errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Symbol/Type Resolution (E2xxx)
    /// Enum base type is not one of the built-in integral kinds.
    E2101,
    /// Partial enum declarations disagree on the underlying type.
    E2102,
    /// Use-site diagnostic attached to an implicitly chosen type.
    E2103,

    // Lowering Errors (E4xxx)
    /// Break or continue has no matching enclosing loop/switch target.
    E4001,

    // Internal Errors (E9xxx)
    /// Lowering invariant violated (unreachable from valid input).
    E9001,
}

impl ErrorCode {
    /// The code string, e.g. `"E2101"`.
    pub fn code(self) -> &'static str {
        match self {
            ErrorCode::E2101 => "E2101",
            ErrorCode::E2102 => "E2102",
            ErrorCode::E2103 => "E2103",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// Short description of the error class.
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::E2101 => "integral type expected",
            ErrorCode::E2102 => "conflicting enum underlying types",
            ErrorCode::E2103 => "use-site restriction on implicit type",
            ErrorCode::E4001 => "no enclosing target for jump",
            ErrorCode::E9001 => "internal lowering invariant violated",
        }
    }

    /// Whether this is an internal-compiler-error code.
    pub fn is_internal(self) -> bool {
        matches!(self, ErrorCode::E9001)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.code())
    }
}
