use pretty_assertions::assert_eq;

use veld_diagnostic::{DiagnosticSink, ErrorCode};
use veld_ir::{
    BoundArena, BoundId, BoundKind, BoundNode, ConstValue, LabelId, LocalId, Name, Span, SwitchArm,
    TypeId, TypePool,
};
use veld_symbols::{GeneratedLabelKind, LabelTable};

use super::{lower_body, LowerResult};

fn span() -> Span {
    Span::new(0, 8)
}

fn lower(src: &BoundArena, pool: &TypePool, root: BoundId) -> (LowerResult, LabelTable, DiagnosticSink) {
    let mut labels = LabelTable::new();
    let sink = DiagnosticSink::new();
    let result = lower_body(src, pool, &mut labels, &sink, root);
    (result, labels, sink)
}

// Source-tree builders.

fn literal(src: &mut BoundArena, ty: TypeId, constant: ConstValue) -> BoundId {
    src.push(BoundNode::expr(BoundKind::Literal, span(), ty).with_constant(constant))
}

fn call(src: &mut BoundArena, ty: TypeId) -> BoundId {
    let args = src.alloc_list(&[]);
    src.push(BoundNode::expr(BoundKind::Call { args }, span(), ty))
}

fn projection(src: &mut BoundArena, receiver: BoundId, payload_ty: TypeId) -> BoundId {
    src.push(BoundNode::expr(
        BoundKind::OptionalValue { receiver },
        span(),
        payload_ty,
    ))
}

fn cond_yield(src: &mut BoundArena, expr: BoundId) -> BoundId {
    src.push(BoundNode::stmt(BoundKind::ConditionalYield { expr }, span()))
}

fn block(src: &mut BoundArena, stmts: &[BoundId]) -> BoundId {
    let locals = src.alloc_local_list(&[]);
    let stmts = src.alloc_list(stmts);
    src.push(BoundNode::stmt(BoundKind::Block { locals, stmts }, span()))
}

fn loop_stmt(src: &mut BoundArena, label: Name, body: BoundId) -> BoundId {
    src.push(BoundNode::stmt(BoundKind::Loop { label, body }, span()))
}

fn switch_stmt(src: &mut BoundArena, scrutinee: BoundId, label: Name, arms: &[SwitchArm]) -> BoundId {
    let arms = src.alloc_arms(arms);
    src.push(BoundNode::stmt(
        BoundKind::Switch {
            scrutinee,
            arms,
            label,
            break_label: LabelId::INVALID,
        },
        span(),
    ))
}

// Lowered-tree accessors.

fn stmts_of(arena: &BoundArena, id: BoundId) -> Vec<BoundId> {
    match *arena.kind(id) {
        BoundKind::Block { stmts, .. } => arena.list(stmts).to_vec(),
        ref other => panic!("expected block, got {other:?}"),
    }
}

fn locals_of(arena: &BoundArena, id: BoundId) -> Vec<LocalId> {
    match *arena.kind(id) {
        BoundKind::Block { locals, .. } => arena.local_list(locals).to_vec(),
        ref other => panic!("expected block, got {other:?}"),
    }
}

fn expect_label_mark(arena: &BoundArena, id: BoundId) -> LabelId {
    match *arena.kind(id) {
        BoundKind::LabelMark { label } => label,
        ref other => panic!("expected label mark, got {other:?}"),
    }
}

fn expect_jump(arena: &BoundArena, id: BoundId) -> LabelId {
    match *arena.kind(id) {
        BoundKind::Jump { target } => target,
        ref other => panic!("expected jump, got {other:?}"),
    }
}

fn expect_if(arena: &BoundArena, id: BoundId) -> (BoundId, BoundId) {
    match *arena.kind(id) {
        BoundKind::If { cond, then_branch } => (cond, then_branch),
        ref other => panic!("expected if, got {other:?}"),
    }
}

// Conditional-yield shape tests.

#[test]
fn constant_null_operand_erases_the_yield() {
    let mut src = BoundArena::new();
    let pool = TypePool::new();
    let operand = literal(&mut src, TypeId::STR, ConstValue::Null);
    let stmt = cond_yield(&mut src, operand);
    let root = block(&mut src, &[stmt]);

    let (result, _, sink) = lower(&src, &pool, root);

    assert!(sink.is_empty());
    assert_eq!(stmts_of(&result.arena, result.root).len(), 0);
}

#[test]
fn constant_default_operand_erases_the_yield() {
    let mut src = BoundArena::new();
    let pool = TypePool::new();
    let operand = literal(&mut src, TypeId::I32, ConstValue::Int(0));
    let stmt = cond_yield(&mut src, operand);
    let root = block(&mut src, &[stmt]);

    let (result, _, _) = lower(&src, &pool, root);

    assert_eq!(stmts_of(&result.arena, result.root).len(), 0);
}

#[test]
fn constant_value_operand_yields_unconditionally() {
    let mut src = BoundArena::new();
    let pool = TypePool::new();
    let operand = literal(&mut src, TypeId::I32, ConstValue::Int(42));
    let stmt = cond_yield(&mut src, operand);
    let root = block(&mut src, &[stmt]);

    let (result, _, _) = lower(&src, &pool, root);
    let arena = &result.arena;

    let stmts = stmts_of(arena, result.root);
    assert_eq!(stmts.len(), 1);
    match *arena.kind(stmts[0]) {
        BoundKind::Yield { expr } => {
            assert_eq!(arena.constant(expr), Some(ConstValue::Int(42)));
        }
        ref other => panic!("expected unconditional yield, got {other:?}"),
    }
}

#[test]
fn value_operand_lowers_to_cached_guarded_yield() {
    let mut src = BoundArena::new();
    let pool = TypePool::new();
    let operand = call(&mut src, TypeId::I32);
    let stmt = cond_yield(&mut src, operand);
    let root = block(&mut src, &[stmt]);

    let (result, _, _) = lower(&src, &pool, root);
    let arena = &result.arena;

    let outer = stmts_of(arena, result.root);
    assert_eq!(outer.len(), 1);

    // { tmp = call(); if tmp != default { yield tmp } }
    let rewritten = outer[0];
    let tmps = locals_of(arena, rewritten);
    assert_eq!(tmps.len(), 1);
    let decl = arena.local(tmps[0]);
    assert!(decl.synthesized);
    assert_eq!(decl.name, Name::EMPTY);
    assert_eq!(decl.ty, TypeId::I32);

    let parts = stmts_of(arena, rewritten);
    assert_eq!(parts.len(), 2);
    match *arena.kind(parts[0]) {
        BoundKind::ExprStmt { expr } => match *arena.kind(expr) {
            BoundKind::Assign { target, value } => {
                assert_eq!(*arena.kind(target), BoundKind::Local(tmps[0]));
                assert!(matches!(*arena.kind(value), BoundKind::Call { .. }));
            }
            ref other => panic!("expected assignment, got {other:?}"),
        },
        ref other => panic!("expected expression statement, got {other:?}"),
    }

    let (cond, then_branch) = expect_if(arena, parts[1]);
    match *arena.kind(cond) {
        BoundKind::IsNotDefault { operand } => {
            assert_eq!(*arena.kind(operand), BoundKind::Local(tmps[0]));
        }
        ref other => panic!("expected default-value guard, got {other:?}"),
    }
    match *arena.kind(then_branch) {
        BoundKind::Yield { expr } => {
            assert_eq!(*arena.kind(expr), BoundKind::Local(tmps[0]));
        }
        ref other => panic!("expected yield, got {other:?}"),
    }
}

#[test]
fn reference_operand_guards_with_null_check() {
    let mut src = BoundArena::new();
    let pool = TypePool::new();
    let operand = call(&mut src, TypeId::STR);
    let stmt = cond_yield(&mut src, operand);
    let root = block(&mut src, &[stmt]);

    let (result, _, _) = lower(&src, &pool, root);
    let arena = &result.arena;

    let parts = stmts_of(arena, stmts_of(arena, result.root)[0]);
    let (cond, _) = expect_if(arena, parts[1]);
    assert!(matches!(*arena.kind(cond), BoundKind::IsNotNull { .. }));
}

#[test]
fn optional_operand_guards_with_presence_test() {
    let mut src = BoundArena::new();
    let mut pool = TypePool::new();
    let optional = pool.optional(TypeId::I32);
    let operand = call(&mut src, optional);
    let stmt = cond_yield(&mut src, operand);
    let root = block(&mut src, &[stmt]);

    let (result, _, _) = lower(&src, &pool, root);
    let arena = &result.arena;

    let parts = stmts_of(arena, stmts_of(arena, result.root)[0]);
    let (cond, _) = expect_if(arena, parts[1]);
    assert!(matches!(*arena.kind(cond), BoundKind::HasValue { .. }));
}

#[test]
fn optional_projection_caches_receiver_not_payload() {
    let mut src = BoundArena::new();
    let mut pool = TypePool::new();
    let optional = pool.optional(TypeId::I32);
    let receiver = call(&mut src, optional);
    let payload = projection(&mut src, receiver, TypeId::I32);
    let stmt = cond_yield(&mut src, payload);
    let root = block(&mut src, &[stmt]);

    let (result, _, _) = lower(&src, &pool, root);
    let arena = &result.arena;

    // { tmp = call(); if has-value(tmp) { yield tmp.value } }
    let rewritten = stmts_of(arena, result.root)[0];
    let tmps = locals_of(arena, rewritten);
    assert_eq!(tmps.len(), 1);
    assert_eq!(arena.local(tmps[0]).ty, optional);

    let parts = stmts_of(arena, rewritten);
    assert_eq!(parts.len(), 2);
    let (cond, then_branch) = expect_if(arena, parts[1]);
    match *arena.kind(cond) {
        BoundKind::HasValue { operand } => {
            assert_eq!(*arena.kind(operand), BoundKind::Local(tmps[0]));
        }
        ref other => panic!("expected presence guard, got {other:?}"),
    }

    // The projection is re-applied to the cached receiver inside the guard.
    match *arena.kind(then_branch) {
        BoundKind::Yield { expr } => {
            assert_eq!(arena.ty(expr), TypeId::I32);
            match *arena.kind(expr) {
                BoundKind::OptionalValue { receiver } => {
                    assert_eq!(*arena.kind(receiver), BoundKind::Local(tmps[0]));
                }
                ref other => panic!("expected payload projection, got {other:?}"),
            }
        }
        ref other => panic!("expected yield, got {other:?}"),
    }
}

// Loop / break / continue lowering.

#[test]
fn loop_lowers_to_label_jump_form() {
    let mut src = BoundArena::new();
    let pool = TypePool::new();
    let brk = src.push(BoundNode::stmt(
        BoundKind::Break { label: Name::EMPTY },
        span(),
    ));
    let body = block(&mut src, &[brk]);
    let root = loop_stmt(&mut src, Name::EMPTY, body);

    let (result, labels, sink) = lower(&src, &pool, root);
    let arena = &result.arena;
    assert!(sink.is_empty());

    let parts = stmts_of(arena, result.root);
    assert_eq!(parts.len(), 4);
    let cont = expect_label_mark(arena, parts[0]);
    let brk = expect_label_mark(arena, parts[3]);
    assert_eq!(expect_jump(arena, parts[2]), cont);
    assert_eq!(labels.generated_kind(cont), Some(GeneratedLabelKind::Continue));
    assert_eq!(labels.generated_kind(brk), Some(GeneratedLabelKind::Break));

    let body = stmts_of(arena, parts[1]);
    assert_eq!(body.len(), 1);
    assert_eq!(expect_jump(arena, body[0]), brk);
}

#[test]
fn labeled_break_targets_the_outer_loop() {
    let mut src = BoundArena::new();
    let pool = TypePool::new();
    let outer_name = Name::from_raw(3);

    let brk = src.push(BoundNode::stmt(BoundKind::Break { label: outer_name }, span()));
    let inner_body = block(&mut src, &[brk]);
    let inner = loop_stmt(&mut src, Name::EMPTY, inner_body);
    let outer_body = block(&mut src, &[inner]);
    let root = loop_stmt(&mut src, outer_name, outer_body);

    let (result, labels, sink) = lower(&src, &pool, root);
    let arena = &result.arena;
    assert!(sink.is_empty());

    let outer_parts = stmts_of(arena, result.root);
    let outer_break = expect_label_mark(arena, outer_parts[3]);

    let inner_loop = stmts_of(arena, outer_parts[1])[0];
    let inner_parts = stmts_of(arena, inner_loop);
    let inner_break = expect_label_mark(arena, inner_parts[3]);
    let jump = expect_jump(arena, stmts_of(arena, inner_parts[1])[0]);
    assert_eq!(jump, outer_break);
    assert_ne!(jump, inner_break);

    // The break label inherits the source label's identity for debugging.
    let source = labels.associated_source(outer_break).unwrap();
    assert_eq!(labels.source_name(source), Some(outer_name));
    assert_eq!(labels.declaring_spans(outer_break), vec![span()]);
}

#[test]
fn continue_inside_switch_targets_the_enclosing_loop() {
    let mut src = BoundArena::new();
    let pool = TypePool::new();

    let scrutinee = call(&mut src, TypeId::I32);
    let cont = src.push(BoundNode::stmt(
        BoundKind::Continue { label: Name::EMPTY },
        span(),
    ));
    let switch = switch_stmt(
        &mut src,
        scrutinee,
        Name::EMPTY,
        &[SwitchArm {
            value: BoundId::INVALID,
            body: cont,
        }],
    );
    let body = block(&mut src, &[switch]);
    let root = loop_stmt(&mut src, Name::EMPTY, body);

    let (result, _, sink) = lower(&src, &pool, root);
    let arena = &result.arena;
    assert!(sink.is_empty());

    let loop_parts = stmts_of(arena, result.root);
    let loop_continue = expect_label_mark(arena, loop_parts[0]);

    let switch_wrapper = stmts_of(arena, loop_parts[1])[0];
    let wrapper_parts = stmts_of(arena, switch_wrapper);
    match *arena.kind(wrapper_parts[0]) {
        BoundKind::Switch { arms, .. } => {
            let arm = arena.arms(arms)[0];
            assert_eq!(expect_jump(arena, arm.body), loop_continue);
        }
        ref other => panic!("expected switch, got {other:?}"),
    }
}

#[test]
fn switch_break_resolves_to_the_switch_exit() {
    let mut src = BoundArena::new();
    let pool = TypePool::new();

    let scrutinee = call(&mut src, TypeId::I32);
    let brk = src.push(BoundNode::stmt(
        BoundKind::Break { label: Name::EMPTY },
        span(),
    ));
    let root = switch_stmt(
        &mut src,
        scrutinee,
        Name::EMPTY,
        &[SwitchArm {
            value: BoundId::INVALID,
            body: brk,
        }],
    );

    let (result, labels, sink) = lower(&src, &pool, root);
    let arena = &result.arena;
    assert!(sink.is_empty());

    let wrapper = stmts_of(arena, result.root);
    assert_eq!(wrapper.len(), 2);
    match *arena.kind(wrapper[0]) {
        BoundKind::Switch {
            label, break_label, arms, ..
        } => {
            assert!(label.is_empty());
            assert!(break_label.is_valid());
            assert_eq!(labels.generated_kind(break_label), Some(GeneratedLabelKind::Break));
            assert_eq!(expect_label_mark(arena, wrapper[1]), break_label);

            let arm = arena.arms(arms)[0];
            assert_eq!(expect_jump(arena, arm.body), break_label);
        }
        ref other => panic!("expected switch, got {other:?}"),
    }
}

#[test]
fn named_switch_associates_its_source_label() {
    let mut src = BoundArena::new();
    let pool = TypePool::new();
    let name = Name::from_raw(9);

    let scrutinee = call(&mut src, TypeId::I32);
    let brk = src.push(BoundNode::stmt(BoundKind::Break { label: name }, span()));
    let root = switch_stmt(
        &mut src,
        scrutinee,
        name,
        &[SwitchArm {
            value: BoundId::INVALID,
            body: brk,
        }],
    );

    let (result, labels, sink) = lower(&src, &pool, root);
    assert!(sink.is_empty());

    match *result.arena.kind(stmts_of(&result.arena, result.root)[0]) {
        BoundKind::Switch { break_label, .. } => {
            let source = labels.associated_source(break_label).unwrap();
            assert_eq!(labels.source_name(source), Some(name));
        }
        ref other => panic!("expected switch, got {other:?}"),
    }
}

#[test]
fn unmatched_break_is_reported_and_erased() {
    let mut src = BoundArena::new();
    let pool = TypePool::new();
    let brk = src.push(BoundNode::stmt(
        BoundKind::Break { label: Name::EMPTY },
        span(),
    ));
    let root = block(&mut src, &[brk]);

    let (result, _, sink) = lower(&src, &pool, root);

    assert_eq!(stmts_of(&result.arena, result.root).len(), 0);
    assert_eq!(sink.error_count(), 1);
    assert_eq!(sink.snapshot()[0].code, ErrorCode::E4001);
}

#[test]
fn continue_without_a_loop_is_reported() {
    let mut src = BoundArena::new();
    let pool = TypePool::new();

    // A switch is not a continue target; without a loop there is none.
    let scrutinee = call(&mut src, TypeId::I32);
    let cont = src.push(BoundNode::stmt(
        BoundKind::Continue { label: Name::EMPTY },
        span(),
    ));
    let root = switch_stmt(
        &mut src,
        scrutinee,
        Name::EMPTY,
        &[SwitchArm {
            value: BoundId::INVALID,
            body: cont,
        }],
    );

    let (result, _, sink) = lower(&src, &pool, root);
    let arena = &result.arena;

    assert_eq!(sink.error_count(), 1);
    assert_eq!(sink.snapshot()[0].code, ErrorCode::E4001);

    match *arena.kind(stmts_of(arena, result.root)[0]) {
        BoundKind::Switch { arms, .. } => {
            // Erased arm body is replaced by an empty block.
            let arm = arena.arms(arms)[0];
            assert_eq!(stmts_of(arena, arm.body).len(), 0);
        }
        ref other => panic!("expected switch, got {other:?}"),
    }
}

// Behavioral tests over a tiny interpreter for the lowered subset.

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Value {
    Uninit,
    Null,
    Bool(bool),
    Int(i64),
    Opt(Option<i64>),
}

/// Executes lowered trees without jumps, counting the observations that
/// matter: how often the opaque call ran, how often a payload projection
/// was evaluated, and what got yielded.
struct Interp<'a> {
    arena: &'a BoundArena,
    locals: Vec<Value>,
    call_result: Value,
    call_evals: usize,
    payload_evals: usize,
    yielded: Vec<i64>,
}

impl<'a> Interp<'a> {
    fn run(arena: &'a BoundArena, root: BoundId, call_result: Value) -> Self {
        let mut interp = Interp {
            arena,
            locals: vec![Value::Uninit; arena.local_count()],
            call_result,
            call_evals: 0,
            payload_evals: 0,
            yielded: Vec::new(),
        };
        if root.is_valid() {
            interp.exec(root);
        }
        interp
    }

    fn eval(&mut self, id: BoundId) -> Value {
        match *self.arena.kind(id) {
            BoundKind::Literal => match self.arena.constant(id) {
                Some(ConstValue::Int(value)) => Value::Int(value),
                Some(ConstValue::Null) => Value::Null,
                other => panic!("unsupported literal {other:?}"),
            },
            BoundKind::Local(local) => self.locals[local.index()],
            BoundKind::Call { .. } => {
                self.call_evals += 1;
                self.call_result
            }
            BoundKind::OptionalValue { receiver } => {
                let receiver = self.eval(receiver);
                self.payload_evals += 1;
                match receiver {
                    Value::Opt(Some(value)) => Value::Int(value),
                    Value::Opt(None) => panic!("payload projection on an absent optional"),
                    other => panic!("projection on non-optional {other:?}"),
                }
            }
            BoundKind::HasValue { operand } => match self.eval(operand) {
                Value::Opt(payload) => Value::Bool(payload.is_some()),
                other => panic!("presence test on non-optional {other:?}"),
            },
            BoundKind::IsNotNull { operand } => {
                let value = self.eval(operand);
                Value::Bool(value != Value::Null)
            }
            BoundKind::IsNotDefault { operand } => match self.eval(operand) {
                Value::Int(value) => Value::Bool(value != 0),
                other => panic!("default test on non-integer {other:?}"),
            },
            BoundKind::Assign { target, value } => {
                let value = self.eval(value);
                match *self.arena.kind(target) {
                    BoundKind::Local(local) => {
                        self.locals[local.index()] = value;
                        value
                    }
                    ref other => panic!("assignment to non-local {other:?}"),
                }
            }
            ref other => panic!("statement kind in expression position: {other:?}"),
        }
    }

    fn exec(&mut self, id: BoundId) {
        let arena = self.arena;
        match *arena.kind(id) {
            BoundKind::ExprStmt { expr } => {
                self.eval(expr);
            }
            BoundKind::Block { stmts, .. } => {
                for &stmt in arena.list(stmts) {
                    self.exec(stmt);
                }
            }
            BoundKind::If { cond, then_branch } => {
                if self.eval(cond) == Value::Bool(true) {
                    self.exec(then_branch);
                }
            }
            BoundKind::Yield { expr } => match self.eval(expr) {
                Value::Int(value) => self.yielded.push(value),
                other => panic!("yield of non-integer {other:?}"),
            },
            ref other => panic!("unsupported statement kind: {other:?}"),
        }
    }
}

fn lowered_yield_of_call(ty: TypeId, pool: &TypePool) -> LowerResult {
    let mut src = BoundArena::new();
    let operand = call(&mut src, ty);
    let stmt = cond_yield(&mut src, operand);
    let root = block(&mut src, &[stmt]);

    let mut labels = LabelTable::new();
    let sink = DiagnosticSink::new();
    lower_body(&src, pool, &mut labels, &sink, root)
}

#[test]
fn side_effecting_operand_runs_exactly_once() {
    let pool = TypePool::new();
    let result = lowered_yield_of_call(TypeId::I32, &pool);
    let interp = Interp::run(&result.arena, result.root, Value::Int(7));
    assert_eq!(interp.call_evals, 1);
    assert_eq!(interp.yielded, vec![7]);
}

#[test]
fn default_valued_operand_runs_once_but_never_yields() {
    let pool = TypePool::new();
    let result = lowered_yield_of_call(TypeId::I32, &pool);
    let interp = Interp::run(&result.arena, result.root, Value::Int(0));
    assert_eq!(interp.call_evals, 1);
    assert!(interp.yielded.is_empty());
}

#[test]
fn null_reference_operand_never_yields() {
    let pool = TypePool::new();
    let result = lowered_yield_of_call(TypeId::STR, &pool);
    let interp = Interp::run(&result.arena, result.root, Value::Null);
    assert_eq!(interp.call_evals, 1);
    assert!(interp.yielded.is_empty());
}

fn lowered_yield_of_projected_call(pool: &mut TypePool) -> LowerResult {
    let optional = pool.optional(TypeId::I32);
    let mut src = BoundArena::new();
    let receiver = call(&mut src, optional);
    let payload = projection(&mut src, receiver, TypeId::I32);
    let stmt = cond_yield(&mut src, payload);
    let root = block(&mut src, &[stmt]);

    let mut labels = LabelTable::new();
    let sink = DiagnosticSink::new();
    lower_body(&src, pool, &mut labels, &sink, root)
}

#[test]
fn absent_optional_never_evaluates_the_projection() {
    let mut pool = TypePool::new();
    let result = lowered_yield_of_projected_call(&mut pool);
    let interp = Interp::run(&result.arena, result.root, Value::Opt(None));
    assert_eq!(interp.call_evals, 1);
    assert_eq!(interp.payload_evals, 0);
    assert!(interp.yielded.is_empty());
}

#[test]
fn present_optional_yields_its_payload() {
    let mut pool = TypePool::new();
    let result = lowered_yield_of_projected_call(&mut pool);
    let interp = Interp::run(&result.arena, result.root, Value::Opt(Some(9)));
    assert_eq!(interp.call_evals, 1);
    assert_eq!(interp.payload_evals, 1);
    assert_eq!(interp.yielded, vec![9]);
}
