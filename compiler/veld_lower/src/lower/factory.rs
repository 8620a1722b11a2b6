//! Synthesized-node helpers.
//!
//! Small constructors for the primitive shapes lowering emits: temporaries,
//! assignments, guards, conditionals, blocks, yields. All of them push into
//! the output arena with `Span`s taken from the construct being rewritten.

use veld_ir::{BoundId, BoundKind, BoundNode, LocalDecl, LocalId, Span, TypeId, TypeShape};

use super::Lowerer;

impl Lowerer<'_> {
    /// Push a statement node.
    pub(crate) fn push_stmt(&mut self, kind: BoundKind, span: Span) -> BoundId {
        self.out.push(BoundNode::stmt(kind, span))
    }

    /// Introduce a fresh compiler temporary of the given type.
    pub(crate) fn fresh_local(&mut self, ty: TypeId) -> LocalId {
        self.out.alloc_local(LocalDecl::synthesized(ty))
    }

    /// Read of a local.
    pub(crate) fn local_ref(&mut self, local: LocalId, span: Span) -> BoundId {
        let ty = self.out.local(local).ty;
        self.out
            .push(BoundNode::expr(BoundKind::Local(local), span, ty))
    }

    /// `local = value;` as a statement.
    pub(crate) fn assign_stmt(&mut self, local: LocalId, value: BoundId, span: Span) -> BoundId {
        let target = self.local_ref(local, span);
        let ty = self.out.ty(value);
        let assign = self
            .out
            .push(BoundNode::expr(BoundKind::Assign { target, value }, span, ty));
        self.push_stmt(BoundKind::ExprStmt { expr: assign }, span)
    }

    /// Structured `if cond { then }`.
    pub(crate) fn if_then(&mut self, cond: BoundId, then_branch: BoundId, span: Span) -> BoundId {
        self.push_stmt(BoundKind::If { cond, then_branch }, span)
    }

    /// Unconditional yield.
    pub(crate) fn yield_stmt(&mut self, expr: BoundId, span: Span) -> BoundId {
        self.push_stmt(BoundKind::Yield { expr }, span)
    }

    /// Block declaring `locals` and running `stmts`.
    pub(crate) fn block_stmt(
        &mut self,
        locals: &[LocalId],
        stmts: &[BoundId],
        span: Span,
    ) -> BoundId {
        let locals = self.out.alloc_local_list(locals);
        let stmts = self.out.alloc_list(stmts);
        self.push_stmt(BoundKind::Block { locals, stmts }, span)
    }

    /// The "has a value" guard for an operand of type `ty`.
    ///
    /// Type-driven, matching the source language's equality semantics:
    /// reference types compare against null, optionals test their presence
    /// flag, plain value types compare against their zero value.
    pub(crate) fn presence_guard(&mut self, operand: BoundId, ty: TypeId, span: Span) -> BoundId {
        let kind = match self.pool.shape(ty) {
            TypeShape::Reference => BoundKind::IsNotNull { operand },
            TypeShape::Optional => BoundKind::HasValue { operand },
            TypeShape::Value => BoundKind::IsNotDefault { operand },
        };
        self.out.push(BoundNode::expr(kind, span, TypeId::BOOL))
    }
}
