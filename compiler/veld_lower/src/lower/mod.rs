//! Bound tree → lowered bound tree transformation.
//!
//! The [`Lowerer`] walks the source arena bottom-up and pushes rewritten
//! nodes into a fresh arena. Statement rewriting returns `Option<BoundId>`
//! with `None` meaning "this statement is erased" — erasure is a first-class
//! outcome, not an empty-block sentinel.

mod factory;
mod yields;

use rustc_hash::FxHashMap;

use veld_diagnostic::{Diagnostic, DiagnosticBag, DiagnosticSink, ErrorCode};
use veld_ir::{
    BoundArena, BoundId, BoundKind, BoundNode, LabelId, LocalId, Name, Span, SwitchArm, TypePool,
};
use veld_symbols::{GeneratedLabelKind, LabelTable};

/// Output of lowering one body.
#[derive(Debug)]
pub struct LowerResult {
    /// The lowered arena. Nodes orphaned by rewrites may remain; they are
    /// unreachable from `root`.
    pub arena: BoundArena,
    /// Root statement of the lowered body; `BoundId::INVALID` when the
    /// whole body lowered to nothing.
    pub root: BoundId,
}

/// Lower one body to execution-ready form.
///
/// Labels synthesized during lowering land in `labels`; diagnostics are
/// committed to `sink` in one batch when lowering completes.
pub fn lower_body(
    src: &BoundArena,
    pool: &TypePool,
    labels: &mut LabelTable,
    sink: &DiagnosticSink,
    root: BoundId,
) -> LowerResult {
    if !root.is_valid() {
        return LowerResult {
            arena: BoundArena::new(),
            root: BoundId::INVALID,
        };
    }

    tracing::debug!(root = root.raw(), nodes = src.len(), "lowering body");

    let mut lowerer = Lowerer::new(src, pool, labels);
    let lowered = lowerer.lower_stmt(root);
    let result = lowerer.finish(lowered, sink);

    tracing::debug!(
        root = result.root.raw(),
        nodes = result.arena.len(),
        "lowering complete"
    );

    #[cfg(debug_assertions)]
    crate::validate(&result, labels);

    result
}

/// An enclosing break/continue target while lowering.
struct JumpTarget {
    /// Source label name of the construct, or `Name::EMPTY`.
    name: Name,
    /// Resolved break target.
    break_label: LabelId,
    /// Resolved continue target; `LabelId::INVALID` for switches.
    continue_label: LabelId,
}

/// Tree-to-tree rewriter for one body.
pub struct Lowerer<'a> {
    pub(crate) src: &'a BoundArena,
    pub(crate) pool: &'a TypePool,
    labels: &'a mut LabelTable,
    pub(crate) out: BoundArena,
    bag: DiagnosticBag,
    /// Stack of enclosing jump targets, innermost last.
    targets: Vec<JumpTarget>,
    /// Source local → lowered local.
    local_map: FxHashMap<LocalId, LocalId>,
}

impl<'a> Lowerer<'a> {
    /// Create a lowerer over one source body.
    pub fn new(src: &'a BoundArena, pool: &'a TypePool, labels: &'a mut LabelTable) -> Self {
        Lowerer {
            src,
            pool,
            labels,
            out: BoundArena::new(),
            bag: DiagnosticBag::new(),
            targets: Vec::new(),
            local_map: FxHashMap::default(),
        }
    }

    /// Finish lowering: commit collected diagnostics and yield the result.
    pub fn finish(self, root: Option<BoundId>, sink: &DiagnosticSink) -> LowerResult {
        sink.commit(self.bag);
        LowerResult {
            arena: self.out,
            root: root.unwrap_or(BoundId::INVALID),
        }
    }

    /// Copy a source node's span/type/constant while replacing its kind.
    pub(crate) fn copy_expr(&mut self, id: BoundId, kind: BoundKind) -> BoundId {
        let mut node = BoundNode::expr(kind, self.src.span(id), self.src.ty(id));
        if let Some(constant) = self.src.constant(id) {
            node = node.with_constant(constant);
        }
        self.out.push(node)
    }

    /// Lower an expression, returning its ID in the output arena.
    pub fn lower_expr(&mut self, id: BoundId) -> BoundId {
        match *self.src.kind(id) {
            BoundKind::Local(local) => {
                let mapped = self.map_local(local);
                self.copy_expr(id, BoundKind::Local(mapped))
            }
            BoundKind::Literal => self.copy_expr(id, BoundKind::Literal),
            BoundKind::Call { args } => {
                let lowered: Vec<BoundId> = self
                    .src
                    .list(args)
                    .to_vec()
                    .into_iter()
                    .map(|arg| self.lower_expr(arg))
                    .collect();
                let args = self.out.alloc_list(&lowered);
                self.copy_expr(id, BoundKind::Call { args })
            }
            BoundKind::OptionalValue { receiver } => {
                let receiver = self.lower_expr(receiver);
                self.copy_expr(id, BoundKind::OptionalValue { receiver })
            }
            BoundKind::HasValue { operand } => {
                let operand = self.lower_expr(operand);
                self.copy_expr(id, BoundKind::HasValue { operand })
            }
            BoundKind::IsNotNull { operand } => {
                let operand = self.lower_expr(operand);
                self.copy_expr(id, BoundKind::IsNotNull { operand })
            }
            BoundKind::IsNotDefault { operand } => {
                let operand = self.lower_expr(operand);
                self.copy_expr(id, BoundKind::IsNotDefault { operand })
            }
            BoundKind::Assign { target, value } => {
                let target = self.lower_expr(target);
                let value = self.lower_expr(value);
                self.copy_expr(id, BoundKind::Assign { target, value })
            }
            ref kind => panic!("statement kind in expression position: {kind:?}"),
        }
    }

    /// Lower a statement. `None` means the statement is erased.
    pub fn lower_stmt(&mut self, id: BoundId) -> Option<BoundId> {
        let span = self.src.span(id);
        match *self.src.kind(id) {
            BoundKind::ExprStmt { expr } => {
                let expr = self.lower_expr(expr);
                Some(self.push_stmt(BoundKind::ExprStmt { expr }, span))
            }
            BoundKind::Block { locals, stmts } => {
                let mapped: Vec<LocalId> = self
                    .src
                    .local_list(locals)
                    .to_vec()
                    .into_iter()
                    .map(|local| self.map_local(local))
                    .collect();
                let lowered: Vec<BoundId> = self
                    .src
                    .list(stmts)
                    .to_vec()
                    .into_iter()
                    .filter_map(|stmt| self.lower_stmt(stmt))
                    .collect();
                Some(self.block_stmt(&mapped, &lowered, span))
            }
            BoundKind::If { cond, then_branch } => {
                let cond = self.lower_expr(cond);
                // An erased body still needs the guard evaluated: conditions
                // may have side effects.
                let then_branch = self
                    .lower_stmt(then_branch)
                    .unwrap_or_else(|| self.block_stmt(&[], &[], span));
                Some(self.push_stmt(BoundKind::If { cond, then_branch }, span))
            }
            BoundKind::Yield { expr } => {
                let expr = self.lower_expr(expr);
                Some(self.push_stmt(BoundKind::Yield { expr }, span))
            }
            BoundKind::ConditionalYield { expr } => self.lower_conditional_yield(span, expr),
            BoundKind::Loop { label, body } => Some(self.lower_loop(span, label, body)),
            BoundKind::Break { label } => self.lower_break(span, label),
            BoundKind::Continue { label } => self.lower_continue(span, label),
            BoundKind::Switch {
                scrutinee,
                arms,
                label,
                break_label,
            } => {
                debug_assert!(!break_label.is_valid(), "switch break target already resolved");
                Some(self.lower_switch(span, scrutinee, arms, label))
            }
            // Already-lowered forms pass through unchanged (re-lowering a
            // partially lowered tree is legal and idempotent).
            BoundKind::LabelMark { label } => {
                Some(self.push_stmt(BoundKind::LabelMark { label }, span))
            }
            BoundKind::Jump { target } => Some(self.push_stmt(BoundKind::Jump { target }, span)),
            BoundKind::JumpIfNot { cond, target } => {
                let cond = self.lower_expr(cond);
                Some(self.push_stmt(BoundKind::JumpIfNot { cond, target }, span))
            }
            ref kind => panic!("expression kind in statement position: {kind:?}"),
        }
    }

    /// Lower a loop into label/jump form:
    ///
    /// ```text
    /// continue:
    ///   <body>
    ///   jump continue
    /// break:
    /// ```
    fn lower_loop(&mut self, span: Span, label: Name, body: BoundId) -> BoundId {
        let break_label = self.labels.new_generated("break", GeneratedLabelKind::Break);
        let continue_label = self
            .labels
            .new_generated("continue", GeneratedLabelKind::Continue);
        if !label.is_empty() {
            let source = self.labels.new_source(label, span);
            self.labels.associate_source_label(break_label, source);
        }

        self.targets.push(JumpTarget {
            name: label,
            break_label,
            continue_label,
        });
        let body = self.lower_stmt(body);
        self.targets.pop();

        let mut stmts = Vec::with_capacity(4);
        stmts.push(self.push_stmt(BoundKind::LabelMark { label: continue_label }, span));
        if let Some(body) = body {
            stmts.push(body);
        }
        stmts.push(self.push_stmt(BoundKind::Jump { target: continue_label }, span));
        stmts.push(self.push_stmt(BoundKind::LabelMark { label: break_label }, span));
        self.block_stmt(&[], &stmts, span)
    }

    /// Resolve a switch's break target and lower its arms. Value dispatch
    /// stays structural; the generator handles it.
    fn lower_switch(
        &mut self,
        span: Span,
        scrutinee: BoundId,
        arms: veld_ir::ArmRange,
        label: Name,
    ) -> BoundId {
        let break_label = self.labels.new_generated("break", GeneratedLabelKind::Break);
        if !label.is_empty() {
            let source = self.labels.new_source(label, span);
            self.labels.associate_source_label(break_label, source);
        }

        let scrutinee = self.lower_expr(scrutinee);

        self.targets.push(JumpTarget {
            name: label,
            break_label,
            continue_label: LabelId::INVALID,
        });
        let lowered: Vec<SwitchArm> = self
            .src
            .arms(arms)
            .to_vec()
            .into_iter()
            .map(|arm| {
                let value = if arm.value.is_valid() {
                    self.lower_expr(arm.value)
                } else {
                    BoundId::INVALID
                };
                let body = self
                    .lower_stmt(arm.body)
                    .unwrap_or_else(|| self.block_stmt(&[], &[], span));
                SwitchArm { value, body }
            })
            .collect();
        self.targets.pop();

        let arms = self.out.alloc_arms(&lowered);
        let switch = self.push_stmt(
            BoundKind::Switch {
                scrutinee,
                arms,
                label: Name::EMPTY,
                break_label,
            },
            span,
        );
        let mark = self.push_stmt(BoundKind::LabelMark { label: break_label }, span);
        self.block_stmt(&[], &[switch, mark], span)
    }

    fn lower_break(&mut self, span: Span, label: Name) -> Option<BoundId> {
        let target = self
            .targets
            .iter()
            .rev()
            .find(|target| label.is_empty() || target.name == label)
            .map(|target| target.break_label);
        match target {
            Some(target) => Some(self.push_stmt(BoundKind::Jump { target }, span)),
            None => {
                self.report_unmatched_jump("break", span);
                None
            }
        }
    }

    fn lower_continue(&mut self, span: Span, label: Name) -> Option<BoundId> {
        // Switches have no continue target; continue skips them outward.
        let target = self
            .targets
            .iter()
            .rev()
            .filter(|target| target.continue_label.is_valid())
            .find(|target| label.is_empty() || target.name == label)
            .map(|target| target.continue_label);
        match target {
            Some(target) => Some(self.push_stmt(BoundKind::Jump { target }, span)),
            None => {
                self.report_unmatched_jump("continue", span);
                None
            }
        }
    }

    fn report_unmatched_jump(&mut self, which: &str, span: Span) {
        self.bag.push(
            Diagnostic::error(ErrorCode::E4001)
                .with_message(format!("no enclosing target for `{which}`"))
                .with_label(span, "cannot resolve this jump"),
        );
    }

    fn map_local(&mut self, local: LocalId) -> LocalId {
        if let Some(&mapped) = self.local_map.get(&local) {
            return mapped;
        }
        let mapped = self.out.alloc_local(*self.src.local(local));
        self.local_map.insert(local, mapped);
        mapped
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
