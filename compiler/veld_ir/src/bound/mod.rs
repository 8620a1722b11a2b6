//! The bound tree: type-checked program representation before and after
//! lowering.
//!
//! [`BoundArena`] uses a struct-of-arrays layout (parallel `kinds`, `spans`,
//! `types`, `constants` arrays indexed by [`BoundId`]) with flat side tables
//! for statement lists, locals, and switch arms. Nodes are immutable once
//! pushed; transformation always produces new nodes in a new arena.
//!
//! The same node space serves both phases. High-level forms
//! (`ConditionalYield`, `Break`/`Continue` by name, `Loop`, a `Switch`
//! without a resolved break label) exist only before lowering; resolved jump
//! forms (`LabelMark`, `Jump`, `JumpIfNot`) only after.

mod ids;

pub use ids::{ArmRange, BoundId, BoundRange, LabelId, LocalId, LocalRange};

use crate::{ConstValue, Name, Span, TypeId};

/// A local variable declaration, owned by exactly one `Block`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LocalDecl {
    /// Source name, or `Name::EMPTY` for compiler-introduced temporaries.
    pub name: Name,
    /// Static type of the storage slot.
    pub ty: TypeId,
    /// Whether the local was synthesized during lowering.
    pub synthesized: bool,
}

impl LocalDecl {
    /// A compiler-introduced temporary of the given type.
    pub const fn synthesized(ty: TypeId) -> Self {
        LocalDecl {
            name: Name::EMPTY,
            ty,
            synthesized: true,
        }
    }
}

/// One arm of a switch statement.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SwitchArm {
    /// Constant match value; `BoundId::INVALID` marks the default arm.
    pub value: BoundId,
    /// Arm body statement.
    pub body: BoundId,
}

/// Tagged variant of a bound node.
///
/// Expression variants carry child expression IDs; statement variants carry
/// child statement IDs or ranges. The node's span, static type, and
/// constant-value slot live in the arena's parallel arrays.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BoundKind {
    // Expressions
    /// Read of a local variable.
    Local(LocalId),
    /// Literal; its value sits in the node's constant slot.
    Literal,
    /// Opaque, potentially side-effecting call.
    Call { args: BoundRange },
    /// Payload projection of a nullable value wrapper. Faults at runtime
    /// when the receiver is absent.
    OptionalValue { receiver: BoundId },
    /// Presence predicate of a nullable value wrapper.
    HasValue { operand: BoundId },
    /// Null test for reference-typed operands.
    IsNotNull { operand: BoundId },
    /// Default-value test for value-typed operands.
    IsNotDefault { operand: BoundId },
    /// Assignment expression; `target` must be a `Local`.
    Assign { target: BoundId, value: BoundId },

    // Statements
    /// Expression evaluated for its side effects.
    ExprStmt { expr: BoundId },
    /// Statement block declaring `locals` scoped to it.
    Block { locals: LocalRange, stmts: BoundRange },
    /// Structured conditional with no else branch.
    If { cond: BoundId, then_branch: BoundId },
    /// Unconditional yield of a value to the enclosing consumer.
    Yield { expr: BoundId },
    /// Yield only if the operand is non-null/non-default at runtime.
    /// High-level form; must not survive lowering.
    ConditionalYield { expr: BoundId },
    /// Infinite loop, exited via break. `label` is the user's source label
    /// name or `Name::EMPTY`. High-level form; must not survive lowering.
    Loop { label: Name, body: BoundId },
    /// Unresolved break to the innermost (or named) enclosing target.
    /// High-level form; must not survive lowering.
    Break { label: Name },
    /// Unresolved continue to the innermost (or named) enclosing loop.
    /// High-level form; must not survive lowering.
    Continue { label: Name },
    /// Constant-dispatch switch. Before lowering `break_label` is
    /// `LabelId::INVALID` and `label` may name a source label; lowering
    /// resolves the break target and clears the name.
    Switch {
        scrutinee: BoundId,
        arms: ArmRange,
        label: Name,
        break_label: LabelId,
    },
    /// Jump-target marker. Post-lowering form.
    LabelMark { label: LabelId },
    /// Unconditional jump. Post-lowering form.
    Jump { target: LabelId },
    /// Jump taken when `cond` is false. Post-lowering form.
    JumpIfNot { cond: BoundId, target: LabelId },
}

/// A complete bound node, as passed to [`BoundArena::push`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BoundNode {
    pub kind: BoundKind,
    pub span: Span,
    /// Static type for expression nodes; `TypeId::UNIT` for statements.
    pub ty: TypeId,
    /// Compile-time constant value, if the node is one.
    pub constant: Option<ConstValue>,
}

impl BoundNode {
    /// An expression node with no constant value.
    pub const fn expr(kind: BoundKind, span: Span, ty: TypeId) -> Self {
        BoundNode {
            kind,
            span,
            ty,
            constant: None,
        }
    }

    /// A statement node (unit-typed, no constant value).
    pub const fn stmt(kind: BoundKind, span: Span) -> Self {
        BoundNode {
            kind,
            span,
            ty: TypeId::UNIT,
            constant: None,
        }
    }

    /// Attach a compile-time constant value.
    pub const fn with_constant(mut self, constant: ConstValue) -> Self {
        self.constant = Some(constant);
        self
    }
}

/// Arena for bound nodes.
///
/// Struct-of-arrays: `kinds`, `spans`, `types`, `constants` are parallel
/// arrays indexed by [`BoundId`]; statement lists, locals, local lists, and
/// switch arms live in flat side tables referenced by ranges.
#[derive(Clone, Debug, Default)]
pub struct BoundArena {
    kinds: Vec<BoundKind>,
    spans: Vec<Span>,
    types: Vec<TypeId>,
    constants: Vec<Option<ConstValue>>,
    stmt_lists: Vec<BoundId>,
    locals: Vec<LocalDecl>,
    local_lists: Vec<LocalId>,
    arms: Vec<SwitchArm>,
}

fn to_u32(value: usize, what: &str) -> u32 {
    u32::try_from(value).unwrap_or_else(|_| panic!("too many {what}: {value}"))
}

impl BoundArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node, returning its ID.
    pub fn push(&mut self, node: BoundNode) -> BoundId {
        let id = BoundId::new(to_u32(self.kinds.len(), "bound nodes"));
        self.kinds.push(node.kind);
        self.spans.push(node.span);
        self.types.push(node.ty);
        self.constants.push(node.constant);
        id
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether the arena holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Kind of a node.
    pub fn kind(&self, id: BoundId) -> &BoundKind {
        &self.kinds[id.index()]
    }

    /// Span of a node.
    pub fn span(&self, id: BoundId) -> Span {
        self.spans[id.index()]
    }

    /// Static type of a node.
    pub fn ty(&self, id: BoundId) -> TypeId {
        self.types[id.index()]
    }

    /// Compile-time constant value of a node, if any.
    pub fn constant(&self, id: BoundId) -> Option<ConstValue> {
        self.constants[id.index()]
    }

    /// Allocate a statement/argument list.
    pub fn alloc_list(&mut self, ids: &[BoundId]) -> BoundRange {
        let start = to_u32(self.stmt_lists.len(), "bound list entries");
        self.stmt_lists.extend_from_slice(ids);
        BoundRange {
            start,
            len: to_u32(ids.len(), "bound list entries"),
        }
    }

    /// Resolve a statement/argument list.
    pub fn list(&self, range: BoundRange) -> &[BoundId] {
        &self.stmt_lists[range.start as usize..(range.start + range.len) as usize]
    }

    /// Declare a local variable.
    pub fn alloc_local(&mut self, decl: LocalDecl) -> LocalId {
        let id = LocalId::new(to_u32(self.locals.len(), "locals"));
        self.locals.push(decl);
        id
    }

    /// Look up a local declaration.
    pub fn local(&self, id: LocalId) -> &LocalDecl {
        &self.locals[id.index()]
    }

    /// Number of declared locals.
    pub fn local_count(&self) -> usize {
        self.locals.len()
    }

    /// Allocate the local list of a block.
    pub fn alloc_local_list(&mut self, ids: &[LocalId]) -> LocalRange {
        let start = to_u32(self.local_lists.len(), "local list entries");
        self.local_lists.extend_from_slice(ids);
        LocalRange {
            start,
            len: to_u32(ids.len(), "local list entries"),
        }
    }

    /// Resolve a block's local list.
    pub fn local_list(&self, range: LocalRange) -> &[LocalId] {
        &self.local_lists[range.start as usize..(range.start + range.len) as usize]
    }

    /// Allocate a run of switch arms.
    pub fn alloc_arms(&mut self, arms: &[SwitchArm]) -> ArmRange {
        let start = to_u32(self.arms.len(), "switch arms");
        self.arms.extend_from_slice(arms);
        ArmRange {
            start,
            len: to_u32(arms.len(), "switch arms"),
        }
    }

    /// Resolve a run of switch arms.
    pub fn arms(&self, range: ArmRange) -> &[SwitchArm] {
        &self.arms[range.start as usize..(range.start + range.len) as usize]
    }

    /// Total entries in the flat statement-list table (for validation).
    pub fn list_table_len(&self) -> usize {
        self.stmt_lists.len()
    }

    /// Total entries in the flat local-list table (for validation).
    pub fn local_list_table_len(&self) -> usize {
        self.local_lists.len()
    }

    /// Total entries in the switch-arm table (for validation).
    pub fn arm_table_len(&self) -> usize {
        self.arms.len()
    }
}
