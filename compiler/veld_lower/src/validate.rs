//! Debug-mode validation of the lowered tree's structural contract.
//!
//! Walks the output arena and asserts what the code generator relies on:
//! - no high-level forms survive (`ConditionalYield`, `Break`, `Continue`,
//!   `Loop`, unresolved `Switch`)
//! - every `BoundId`/range reference is within bounds
//! - every referenced label exists in the label table
//! - every node carries a resolved type
//!
//! Checks use `debug_assert!`; release builds skip them.

use veld_ir::{BoundArena, BoundId, BoundKind, BoundRange, LabelId, TypeId};
use veld_symbols::LabelTable;

use crate::lower::LowerResult;

/// Validate a lowering result against the generator-facing contract.
///
/// Panics (in debug builds) with a descriptive message on any violation.
pub fn validate(result: &LowerResult, labels: &LabelTable) {
    if !result.root.is_valid() {
        // Fully erased body: nothing to check.
        return;
    }

    let arena = &result.arena;
    debug_assert!(
        result.root.index() < arena.len(),
        "root {:?} out of bounds (arena has {} nodes)",
        result.root,
        arena.len(),
    );

    for index in 0..arena.len() {
        let id = BoundId::new(index as u32);
        validate_node(arena, labels, id);
    }
}

fn check_id(arena: &BoundArena, owner: BoundId, child: BoundId) {
    debug_assert!(
        child.is_valid() && child.index() < arena.len(),
        "{owner:?} references out-of-bounds child {child:?}",
    );
}

fn check_range(arena: &BoundArena, owner: BoundId, range: BoundRange) {
    debug_assert!(
        (range.start + range.len) as usize <= arena.list_table_len(),
        "{owner:?} references out-of-bounds list {range:?}",
    );
    for &child in arena.list(range) {
        check_id(arena, owner, child);
    }
}

fn check_label(labels: &LabelTable, owner: BoundId, label: LabelId) {
    debug_assert!(
        labels.contains(label),
        "{owner:?} references unknown label {label:?}",
    );
}

fn validate_node(arena: &BoundArena, labels: &LabelTable, id: BoundId) {
    debug_assert!(
        arena.ty(id) != TypeId::NONE,
        "{id:?} has no resolved type",
    );

    match *arena.kind(id) {
        // High-level forms must not survive lowering.
        BoundKind::ConditionalYield { .. }
        | BoundKind::Break { .. }
        | BoundKind::Continue { .. }
        | BoundKind::Loop { .. } => {
            debug_assert!(false, "{id:?}: high-level form survived lowering");
        }

        BoundKind::Literal => {}
        BoundKind::Local(local) => {
            debug_assert!(
                local.index() < arena.local_count(),
                "{id:?} references out-of-bounds local {local:?}",
            );
        }
        BoundKind::Call { args } => check_range(arena, id, args),
        BoundKind::OptionalValue { receiver } => check_id(arena, id, receiver),
        BoundKind::HasValue { operand }
        | BoundKind::IsNotNull { operand }
        | BoundKind::IsNotDefault { operand } => check_id(arena, id, operand),
        BoundKind::Assign { target, value } => {
            check_id(arena, id, target);
            check_id(arena, id, value);
            debug_assert!(
                matches!(arena.kind(target), BoundKind::Local(_)),
                "{id:?} assigns to a non-local target",
            );
        }
        BoundKind::ExprStmt { expr } => check_id(arena, id, expr),
        BoundKind::Block { locals, stmts } => {
            debug_assert!(
                (locals.start + locals.len) as usize <= arena.local_list_table_len(),
                "{id:?} references out-of-bounds local list {locals:?}",
            );
            check_range(arena, id, stmts);
        }
        BoundKind::If { cond, then_branch } => {
            check_id(arena, id, cond);
            check_id(arena, id, then_branch);
        }
        BoundKind::Yield { expr } => check_id(arena, id, expr),
        BoundKind::Switch {
            scrutinee,
            arms,
            label,
            break_label,
        } => {
            check_id(arena, id, scrutinee);
            debug_assert!(
                (arms.start + arms.len) as usize <= arena.arm_table_len(),
                "{id:?} references out-of-bounds arms {arms:?}",
            );
            for arm in arena.arms(arms) {
                if arm.value.is_valid() {
                    check_id(arena, id, arm.value);
                }
                check_id(arena, id, arm.body);
            }
            debug_assert!(
                label.is_empty(),
                "{id:?}: switch still carries an unresolved label name",
            );
            check_label(labels, id, break_label);
        }
        BoundKind::LabelMark { label } => check_label(labels, id, label),
        BoundKind::Jump { target } => check_label(labels, id, target),
        BoundKind::JumpIfNot { cond, target } => {
            check_id(arena, id, cond);
            check_label(labels, id, target);
        }
    }
}
