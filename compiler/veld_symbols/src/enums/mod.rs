//! Enum symbols and their lazily computed facts.
//!
//! An enum's underlying integral type and its synthesized backing-value
//! field are derived attributes: computed on first demand, cached in
//! [`MemoCell`]s for the symbol's lifetime, safe to request from any thread.
//!
//! Partial declarations of the same enum may each carry a base-type clause;
//! resolution reconciles them into one consistent underlying type, reporting
//! conflicts without aborting compilation.

use parking_lot::RwLock;
use smallvec::SmallVec;

use veld_diagnostic::{Diagnostic, DiagnosticBag, DiagnosticSink, ErrorCode};
use veld_ir::{Name, Span, StringInterner, TypeId, TypePool};

use crate::memo::{MemoCell, MemoValue};

/// Identity of a type symbol.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct SymbolId(pub u32);

/// What kind of type a symbol declares.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TypeKind {
    Enum,
    Struct,
}

/// Identity of a field symbol in a [`FieldTable`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct FieldId(u32);

impl FieldId {
    /// Raw index into the field table.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl MemoValue for FieldId {
    fn to_raw(self) -> u32 {
        self.0
    }

    fn from_raw(raw: u32) -> Self {
        FieldId(raw)
    }
}

/// A field symbol, possibly synthesized.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FieldSymbol {
    /// The type symbol that owns the field.
    pub owner: SymbolId,
    /// Field name.
    pub name: Name,
    /// Declared type of the field.
    pub ty: TypeId,
    /// Whether the field was synthesized by the compiler.
    pub synthesized: bool,
}

/// Append-only arena of field symbols, shared across threads.
///
/// A computation that loses the `value_field` memoization race may leave an
/// orphaned entry here; the entry is unreachable (only the winning ID is
/// ever published) and harmless.
#[derive(Debug, Default)]
pub struct FieldTable {
    fields: RwLock<Vec<FieldSymbol>>,
}

impl FieldTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field symbol, returning its handle.
    pub fn alloc(&self, field: FieldSymbol) -> FieldId {
        let mut fields = self.fields.write();
        let id = FieldId(
            u32::try_from(fields.len())
                .unwrap_or_else(|_| panic!("too many fields: {}", fields.len())),
        );
        fields.push(field);
        id
    }

    /// Look up a field symbol.
    pub fn get(&self, id: FieldId) -> FieldSymbol {
        self.fields.read()[id.index()]
    }

    /// Number of allocated fields (including orphans from lost races).
    pub fn len(&self) -> usize {
        self.fields.read().len()
    }

    /// Whether no fields have been allocated.
    pub fn is_empty(&self) -> bool {
        self.fields.read().is_empty()
    }
}

/// One partial declaration of an enum type.
#[derive(Clone, Debug)]
pub struct EnumDeclaration {
    /// Span of the declaration itself (for use-site reporting).
    pub span: Span,
    /// Base-type clause entries, already bound by the external binder.
    /// Empty when the declaration has no base list.
    pub base_list: SmallVec<[(TypeId, Span); 1]>,
}

impl EnumDeclaration {
    /// A declaration without a base-type clause.
    pub fn plain(span: Span) -> Self {
        EnumDeclaration {
            span,
            base_list: SmallVec::new(),
        }
    }

    /// A declaration whose base list starts with `base`, written at
    /// `base_span`.
    pub fn with_base(span: Span, base: TypeId, base_span: Span) -> Self {
        EnumDeclaration {
            span,
            base_list: SmallVec::from_buf([(base, base_span)]),
        }
    }
}

/// A named type symbol with lazily derived enum facts.
#[derive(Debug)]
pub struct EnumSymbol {
    id: SymbolId,
    name: Name,
    kind: TypeKind,
    declarations: SmallVec<[EnumDeclaration; 1]>,
    underlying: MemoCell<TypeId>,
    value_field: MemoCell<FieldId>,
}

impl EnumSymbol {
    /// Create a type symbol from its partial declarations.
    pub fn new(
        id: SymbolId,
        name: Name,
        kind: TypeKind,
        declarations: impl IntoIterator<Item = EnumDeclaration>,
    ) -> Self {
        EnumSymbol {
            id,
            name,
            kind,
            declarations: declarations.into_iter().collect(),
            underlying: MemoCell::new(),
            value_field: MemoCell::new(),
        }
    }

    /// Symbol identity.
    pub fn id(&self) -> SymbolId {
        self.id
    }

    /// Symbol name.
    pub fn name(&self) -> Name {
        self.name
    }

    /// What kind of type this symbol declares.
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// The partial declarations of this symbol.
    pub fn declarations(&self) -> &[EnumDeclaration] {
        &self.declarations
    }

    /// For enum symbols, the underlying integral type. `None` for all
    /// other kinds of types.
    ///
    /// Memoized: the first demand computes and publishes diagnostics;
    /// every caller — concurrent or later — observes the same type, and
    /// the diagnostics are committed exactly once.
    pub fn underlying_type(&self, pool: &TypePool, sink: &DiagnosticSink) -> Option<TypeId> {
        if self.kind != TypeKind::Enum {
            return None;
        }
        Some(
            self.underlying
                .get_or_compute(sink, |bag| self.compute_underlying_type(pool, bag)),
        )
    }

    fn compute_underlying_type(&self, pool: &TypePool, bag: &mut DiagnosticBag) -> TypeId {
        let mut common: Option<TypeId> = None;

        for decl in &self.declarations {
            let Some(&(bound, base_span)) = decl.base_list.first() else {
                continue;
            };

            // A non-integral base is reported and replaced with the type
            // accepted so far, so it cannot also trigger a conflict below.
            let current = if pool.is_valid_enum_underlying(bound) {
                Some(bound)
            } else {
                bag.push(
                    Diagnostic::error(ErrorCode::E2101)
                        .with_message("enum underlying type must be a built-in integral type")
                        .with_label(base_span, "invalid base type"),
                );
                common
            };

            match (common, current) {
                (None, Some(ty)) => common = Some(ty),
                (Some(first), Some(ty)) if !pool.same_type(ty, first) => {
                    bag.push(
                        Diagnostic::error(ErrorCode::E2102)
                            .with_message(
                                "partial declarations disagree on the enum underlying type",
                            )
                            .with_label(base_span, "conflicts with the first declared base type"),
                    );
                }
                _ => {}
            }
        }

        if let Some(resolved) = common {
            return resolved;
        }

        // No declaration produced a base type: default to i32 and give the
        // use-site hook a chance to warn at every declared location.
        for decl in &self.declarations {
            pool.report_use_site(TypeId::INT, decl.span, |message, span| {
                bag.push(
                    Diagnostic::warning(ErrorCode::E2103)
                        .with_message(message)
                        .with_label(span, "underlying type defaulted to i32 here"),
                );
            });
        }
        TypeId::INT
    }

    /// For enum symbols, the synthesized instance field that carries the
    /// numeric value in emitted form. `None` for all other kinds of types.
    ///
    /// Memoized per symbol; requires the underlying type, computing it
    /// first if needed.
    pub fn value_field(
        &self,
        interner: &StringInterner,
        fields: &FieldTable,
        pool: &TypePool,
        sink: &DiagnosticSink,
    ) -> Option<FieldId> {
        let underlying = self.underlying_type(pool, sink)?;
        Some(self.value_field.get_or_compute(sink, |_bag| {
            fields.alloc(FieldSymbol {
                owner: self.id,
                name: interner.intern("value__"),
                ty: underlying,
                synthesized: true,
            })
        }))
    }
}
