//! ID and range newtypes for the bound tree.
//!
//! Type-safe indices into [`BoundArena`](super::BoundArena) storage. Each ID
//! is a `#[repr(transparent)]` u32 with `u32::MAX` reserved as the INVALID
//! sentinel for optional references.

use std::fmt;

/// Index of a node in a [`BoundArena`](super::BoundArena).
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct BoundId(u32);

impl BoundId {
    /// Sentinel meaning "no node" (e.g. a default switch arm's value).
    pub const INVALID: BoundId = BoundId(u32::MAX);

    /// Create from a raw index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Raw index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Whether this is a valid (non-sentinel) ID.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl fmt::Debug for BoundId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(formatter, "BoundId({})", self.0)
        } else {
            write!(formatter, "BoundId::INVALID")
        }
    }
}

/// Contiguous run of statement/expression IDs in the arena's flat lists.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct BoundRange {
    pub start: u32,
    pub len: u32,
}

impl BoundRange {
    /// The empty range.
    pub const EMPTY: BoundRange = BoundRange { start: 0, len: 0 };

    /// Whether the range covers no IDs.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }
}

impl fmt::Debug for BoundRange {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "BoundRange({}..+{})", self.start, self.len)
    }
}

/// Index of a local variable declaration in the arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct LocalId(u32);

impl LocalId {
    /// Create from a raw index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Raw index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for LocalId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "LocalId({})", self.0)
    }
}

/// Contiguous run of local IDs declared by one block.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct LocalRange {
    pub start: u32,
    pub len: u32,
}

impl LocalRange {
    /// The empty range (block declares no locals).
    pub const EMPTY: LocalRange = LocalRange { start: 0, len: 0 };

    /// Whether the range declares no locals.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }
}

impl fmt::Debug for LocalRange {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "LocalRange({}..+{})", self.start, self.len)
    }
}

/// Contiguous run of switch arms.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct ArmRange {
    pub start: u32,
    pub len: u32,
}

impl ArmRange {
    /// The empty range.
    pub const EMPTY: ArmRange = ArmRange { start: 0, len: 0 };

    /// Whether the range covers no arms.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }
}

impl fmt::Debug for ArmRange {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "ArmRange({}..+{})", self.start, self.len)
    }
}

/// Identity of a jump-target label.
///
/// Labels live in the symbol table's label arena; the bound tree only
/// references them. Identity is the ID itself, never a display name.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct LabelId(u32);

impl LabelId {
    /// Sentinel meaning "no label" (e.g. an unresolved switch break target).
    pub const INVALID: LabelId = LabelId(u32::MAX);

    /// Create from a raw index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Raw index into the label table.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Whether this is a valid (non-sentinel) ID.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl fmt::Debug for LabelId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(formatter, "LabelId({})", self.0)
        } else {
            write!(formatter, "LabelId::INVALID")
        }
    }
}
