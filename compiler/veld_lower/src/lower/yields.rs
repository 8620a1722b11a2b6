//! Conditional-yield lowering.
//!
//! Rewrites "yield this value only if it is non-null/non-default" into
//! primitive control flow, because the downstream state-machine builder
//! understands only unconditional yields:
//!
//! ```text
//! cond-yield e        {  tmp = e;  if has-value(tmp) { yield tmp }  }
//! ```
//!
//! The operand is evaluated exactly once — it may have side effects — and
//! statically known outcomes fold away entirely.

use veld_ir::{BoundId, BoundKind, BoundNode, Span};

use super::Lowerer;

impl Lowerer<'_> {
    /// Lower a conditional-yield statement. `None` erases it.
    pub(super) fn lower_conditional_yield(&mut self, span: Span, expr: BoundId) -> Option<BoundId> {
        let expr = self.lower_expr(expr);
        self.rewrite_conditional_yield(span, expr)
    }

    /// Rewrite over the already-lowered operand.
    fn rewrite_conditional_yield(&mut self, span: Span, expr: BoundId) -> Option<BoundId> {
        if let Some(constant) = self.out.constant(expr) {
            if constant.is_null() || constant.is_default() {
                // Guaranteed-skipped yield: emits no code at all.
                return None;
            }
            // Guaranteed-taken: a single unconditional yield.
            return Some(self.yield_stmt(expr, span));
        }

        if let BoundKind::OptionalValue { receiver } = *self.out.kind(expr) {
            return Some(self.rewrite_optional_payload_yield(span, expr, receiver));
        }

        let ty = self.out.ty(expr);
        let tmp = self.fresh_local(ty);
        let init = self.assign_stmt(tmp, expr, span);
        let guard_operand = self.local_ref(tmp, span);
        let guard = self.presence_guard(guard_operand, ty, span);
        let value = self.local_ref(tmp, span);
        let yield_stmt = self.yield_stmt(value, span);
        let guarded = self.if_then(guard, yield_stmt, span);
        Some(self.block_stmt(&[tmp], &[init, guarded], span))
    }

    /// The operand projects the payload out of a nullable value wrapper.
    ///
    /// Cache the *receiver* — never the payload: computing the payload
    /// outside the guard would fault on an absent wrapper. The projection
    /// is re-applied to the cached receiver only inside the guarded branch.
    fn rewrite_optional_payload_yield(
        &mut self,
        span: Span,
        projection: BoundId,
        receiver: BoundId,
    ) -> BoundId {
        let payload_ty = self.out.ty(projection);
        let receiver_ty = self.out.ty(receiver);

        let tmp = self.fresh_local(receiver_ty);
        let init = self.assign_stmt(tmp, receiver, span);

        let guard_operand = self.local_ref(tmp, span);
        let guard = self.out.push(BoundNode::expr(
            BoundKind::HasValue {
                operand: guard_operand,
            },
            span,
            veld_ir::TypeId::BOOL,
        ));

        // Original projection node stays orphaned in the arena; the yield
        // below re-projects through the cached receiver instead.
        let cached = self.local_ref(tmp, span);
        let payload = self.out.push(BoundNode::expr(
            BoundKind::OptionalValue { receiver: cached },
            span,
            payload_ty,
        ));
        let yield_stmt = self.yield_stmt(payload, span);
        let guarded = self.if_then(guard, yield_stmt, span);
        self.block_stmt(&[tmp], &[init, guarded], span)
    }
}
