//! Jump-target label symbols.
//!
//! Two flavors share one table: *source* labels correspond to labels the
//! user wrote; *generated* labels are synthesized by lowering for implicit
//! jump targets (loop exits, continue points). Identity is always the
//! [`LabelId`] handle — display names exist purely for diagnostics and are
//! allowed to collide.

#[cfg(debug_assertions)]
use std::sync::atomic::{AtomicU32, Ordering};

use veld_ir::{LabelId, Name, Span};

/// What a generated label targets, for downstream consumers.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum GeneratedLabelKind {
    /// Implicit exit target of a loop or switch.
    Break,
    /// Implicit back-edge target of a loop.
    Continue,
    /// Any other synthesized jump target.
    Other,
}

/// Process-wide sequence for debug display names. Advisory only: truncated
/// to 16 bits in the rendered name, never part of label identity.
#[cfg(debug_assertions)]
static SEQUENCE: AtomicU32 = AtomicU32::new(0);

#[cfg(debug_assertions)]
fn generated_display(base: &str) -> String {
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
    format!("<{base}-{}>", seq & 0xffff)
}

#[cfg(not(debug_assertions))]
fn generated_display(base: &str) -> String {
    format!("<{base}>")
}

#[derive(Debug)]
enum LabelSymbol {
    /// User-written label.
    Source { name: Name, declared: Span },
    /// Compiler-synthesized jump target.
    Generated {
        display: String,
        kind: GeneratedLabelKind,
        /// Back-reference to the source label this target represents.
        /// Write-once: set at most one time, to one source label.
        associated: Option<LabelId>,
    },
}

/// Arena of label symbols for one lowering pass.
#[derive(Debug, Default)]
pub struct LabelTable {
    labels: Vec<LabelSymbol>,
}

impl LabelTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, symbol: LabelSymbol) -> LabelId {
        let id = LabelId::new(
            u32::try_from(self.labels.len())
                .unwrap_or_else(|_| panic!("too many labels: {}", self.labels.len())),
        );
        self.labels.push(symbol);
        id
    }

    /// Record a user-written label declared at `declared`.
    pub fn new_source(&mut self, name: Name, declared: Span) -> LabelId {
        self.alloc(LabelSymbol::Source { name, declared })
    }

    /// Synthesize a jump-target label.
    ///
    /// The display name embeds `base` and, in debug builds, a truncated
    /// sequence number. Display names may collide; identity is the returned
    /// handle.
    pub fn new_generated(&mut self, base: &str, kind: GeneratedLabelKind) -> LabelId {
        self.alloc(LabelSymbol::Generated {
            display: generated_display(base),
            kind,
            associated: None,
        })
    }

    /// Link a generated label to the source label it represents.
    ///
    /// Idempotent for the same source label. Linking to a *different*
    /// source label, or calling this on anything but a generated/source
    /// pair, is a logic error and panics.
    pub fn associate_source_label(&mut self, generated: LabelId, source: LabelId) {
        assert!(
            matches!(self.labels[source.index()], LabelSymbol::Source { .. }),
            "associated label {source:?} is not a source label"
        );
        match &mut self.labels[generated.index()] {
            LabelSymbol::Generated { associated, .. } => match *associated {
                None => *associated = Some(source),
                Some(existing) if existing == source => {}
                Some(existing) => panic!(
                    "generated label {generated:?} already associated with {existing:?}, \
                     refusing to re-associate with {source:?}"
                ),
            },
            LabelSymbol::Source { .. } => {
                panic!("cannot associate source label {generated:?} with another label")
            }
        }
    }

    /// The source label a generated label represents, if any.
    pub fn associated_source(&self, label: LabelId) -> Option<LabelId> {
        match &self.labels[label.index()] {
            LabelSymbol::Generated { associated, .. } => *associated,
            LabelSymbol::Source { .. } => None,
        }
    }

    /// Source name of a label: the user's name for source labels, `None`
    /// for generated ones.
    pub fn source_name(&self, label: LabelId) -> Option<Name> {
        match &self.labels[label.index()] {
            LabelSymbol::Source { name, .. } => Some(*name),
            LabelSymbol::Generated { .. } => None,
        }
    }

    /// Diagnostic display name of a generated label.
    pub fn debug_display(&self, label: LabelId) -> Option<&str> {
        match &self.labels[label.index()] {
            LabelSymbol::Generated { display, .. } => Some(display),
            LabelSymbol::Source { .. } => None,
        }
    }

    /// What a generated label targets; `None` for source labels.
    pub fn generated_kind(&self, label: LabelId) -> Option<GeneratedLabelKind> {
        match &self.labels[label.index()] {
            LabelSymbol::Generated { kind, .. } => Some(*kind),
            LabelSymbol::Source { .. } => None,
        }
    }

    /// Declaration locations of a label.
    ///
    /// Source labels report where they were written. Generated labels
    /// delegate to their associated source label; unassociated ones report
    /// an empty set — they are implicit, synthesized purely for control
    /// flow restructuring.
    pub fn declaring_spans(&self, label: LabelId) -> Vec<Span> {
        match &self.labels[label.index()] {
            LabelSymbol::Source { declared, .. } => vec![*declared],
            LabelSymbol::Generated { associated, .. } => associated
                .map(|source| self.declaring_spans(source))
                .unwrap_or_default(),
        }
    }

    /// Whether the label was synthesized rather than written by the user.
    pub fn is_implicitly_declared(&self, label: LabelId) -> bool {
        matches!(self.labels[label.index()], LabelSymbol::Generated { .. })
    }

    /// Whether the ID refers to a label in this table.
    pub fn contains(&self, label: LabelId) -> bool {
        label.is_valid() && label.index() < self.labels.len()
    }

    /// Number of labels in the table.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
