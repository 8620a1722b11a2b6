//! Type handles and the type pool.
//!
//! `TypeId` is the canonical type representation for this core: a 32-bit
//! index into a [`TypePool`]. Primitive types have fixed indices so type
//! equality and integral-kind checks are O(1) index operations.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::{Name, Span};

/// A 32-bit index into the type pool.
///
/// Types are compared by index; the pool interns composites so structural
/// equality coincides with index equality (after peeling annotations, see
/// [`TypePool::same_type`]).
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    // Integral primitives occupy indices 0-7 so that the valid
    // enum-underlying check is a single range test.

    /// The `i8` type.
    pub const I8: Self = Self(0);
    /// The `u8` type.
    pub const U8: Self = Self(1);
    /// The `i16` type.
    pub const I16: Self = Self(2);
    /// The `u16` type.
    pub const U16: Self = Self(3);
    /// The `i32` type.
    pub const I32: Self = Self(4);
    /// The `u32` type.
    pub const U32: Self = Self(5);
    /// The `i64` type.
    pub const I64: Self = Self(6);
    /// The `u64` type.
    pub const U64: Self = Self(7);
    /// The `bool` type.
    pub const BOOL: Self = Self(8);
    /// The `str` type (reference type).
    pub const STR: Self = Self(9);
    /// The unit type.
    pub const UNIT: Self = Self(10);
    /// The error type (placeholder after reported errors).
    pub const ERROR: Self = Self(11);

    /// Default underlying type for enums: 32-bit signed integer.
    pub const INT: Self = Self::I32;

    /// Number of pre-interned primitives.
    pub const PRIMITIVE_COUNT: u32 = 12;

    /// First index available for pool-allocated composites.
    pub const FIRST_DYNAMIC: u32 = 32;

    /// Sentinel value meaning "no type".
    pub const NONE: Self = Self(u32::MAX);

    /// Create from a raw index.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw index.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Whether this is the NONE sentinel.
    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    /// Whether this is one of the eight built-in integral kinds.
    #[inline]
    pub const fn is_integral(self) -> bool {
        self.0 < 8
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::I8 => write!(formatter, "TypeId::I8"),
            Self::U8 => write!(formatter, "TypeId::U8"),
            Self::I16 => write!(formatter, "TypeId::I16"),
            Self::U16 => write!(formatter, "TypeId::U16"),
            Self::I32 => write!(formatter, "TypeId::I32"),
            Self::U32 => write!(formatter, "TypeId::U32"),
            Self::I64 => write!(formatter, "TypeId::I64"),
            Self::U64 => write!(formatter, "TypeId::U64"),
            Self::BOOL => write!(formatter, "TypeId::BOOL"),
            Self::STR => write!(formatter, "TypeId::STR"),
            Self::UNIT => write!(formatter, "TypeId::UNIT"),
            Self::ERROR => write!(formatter, "TypeId::ERROR"),
            Self::NONE => write!(formatter, "TypeId::NONE"),
            Self(raw) => write!(formatter, "TypeId({raw})"),
        }
    }
}

/// How a type behaves under a "has a value" test.
///
/// Drives construction of the guard when lowering a conditional yield:
/// reference types compare against null, optionals test their presence
/// flag, plain value types compare against their zero value.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TypeShape {
    /// Reference type: guard is a null check.
    Reference,
    /// Nullable value wrapper: guard is the presence predicate.
    Optional,
    /// Plain value type: guard compares against the default value.
    Value,
}

/// Pool-stored type data for composites.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
enum TypeData {
    /// Nullable value wrapper around an inner type.
    Optional(TypeId),
    /// Named reference type.
    Ref(Name),
    /// Annotation wrapper, irrelevant for type identity.
    Annotated(TypeId),
}

/// Interning pool for the composite types this core works with.
///
/// Construction happens single-threaded (the external binder builds the
/// pool before lowering starts); queries take `&self` and the pool is then
/// shared freely across worker threads.
pub struct TypePool {
    composites: Vec<TypeData>,
    dedup: FxHashMap<TypeData, TypeId>,
    /// Diagnostics attached to a type, reported wherever the type is used
    /// implicitly (e.g. the default enum underlying type when the host
    /// marks it unavailable). Keyed by raw `TypeId`.
    use_site: FxHashMap<u32, String>,
}

impl TypePool {
    /// Create an empty pool (primitives need no storage).
    pub fn new() -> Self {
        TypePool {
            composites: Vec::new(),
            dedup: FxHashMap::default(),
            use_site: FxHashMap::default(),
        }
    }

    fn intern(&mut self, data: TypeData) -> TypeId {
        if let Some(&existing) = self.dedup.get(&data) {
            return existing;
        }
        let raw = TypeId::FIRST_DYNAMIC + u32::try_from(self.composites.len()).unwrap_or_else(|_| {
            panic!("type pool exceeded capacity: {} composites", self.composites.len())
        });
        let id = TypeId::from_raw(raw);
        self.dedup.insert(data.clone(), id);
        self.composites.push(data);
        id
    }

    fn data(&self, id: TypeId) -> Option<&TypeData> {
        let raw = id.raw();
        if raw < TypeId::FIRST_DYNAMIC || id.is_none() {
            return None;
        }
        self.composites.get((raw - TypeId::FIRST_DYNAMIC) as usize)
    }

    /// Intern the nullable wrapper of `inner`.
    pub fn optional(&mut self, inner: TypeId) -> TypeId {
        self.intern(TypeData::Optional(inner))
    }

    /// Intern a named reference type.
    pub fn reference(&mut self, name: Name) -> TypeId {
        self.intern(TypeData::Ref(name))
    }

    /// Intern an annotation wrapper around `inner`.
    ///
    /// Annotations carry no identity: `same_type` peels them.
    pub fn annotated(&mut self, inner: TypeId) -> TypeId {
        self.intern(TypeData::Annotated(inner))
    }

    /// Peel annotation wrappers down to the underlying type.
    pub fn peel_annotations(&self, mut id: TypeId) -> TypeId {
        while let Some(TypeData::Annotated(inner)) = self.data(id) {
            id = *inner;
        }
        id
    }

    /// Full type-identity comparison, ignoring annotation wrappers.
    pub fn same_type(&self, left: TypeId, right: TypeId) -> bool {
        self.peel_annotations(left) == self.peel_annotations(right)
    }

    /// Whether `id` is a valid enum underlying type (a built-in integral).
    pub fn is_valid_enum_underlying(&self, id: TypeId) -> bool {
        self.peel_annotations(id).is_integral()
    }

    /// For an optional type, the payload type.
    pub fn optional_payload(&self, id: TypeId) -> Option<TypeId> {
        match self.data(self.peel_annotations(id)) {
            Some(TypeData::Optional(inner)) => Some(*inner),
            _ => None,
        }
    }

    /// Classify how a type behaves under a presence test.
    pub fn shape(&self, id: TypeId) -> TypeShape {
        let peeled = self.peel_annotations(id);
        if peeled == TypeId::STR {
            return TypeShape::Reference;
        }
        match self.data(peeled) {
            Some(TypeData::Optional(_)) => TypeShape::Optional,
            Some(TypeData::Ref(_)) => TypeShape::Reference,
            Some(TypeData::Annotated(_)) | None => TypeShape::Value,
        }
    }

    /// Attach a use-site diagnostic message to a type.
    ///
    /// Hosts use this to flag types (e.g. the default enum underlying type)
    /// as obsolete or unavailable; the message surfaces at every location
    /// that picks the type up implicitly.
    pub fn set_use_site(&mut self, id: TypeId, message: impl Into<String>) {
        self.use_site.insert(id.raw(), message.into());
    }

    /// The use-site diagnostic message attached to a type, if any.
    pub fn use_site_message(&self, id: TypeId) -> Option<&str> {
        self.use_site.get(&id.raw()).map(String::as_str)
    }

    /// Locations of use-site reporting call back through this hook; the
    /// caller turns the message into a diagnostic so this crate stays free
    /// of diagnostic types.
    pub fn report_use_site(&self, id: TypeId, span: Span, mut report: impl FnMut(&str, Span)) {
        if let Some(message) = self.use_site_message(id) {
            report(message, span);
        }
    }
}

impl Default for TypePool {
    fn default() -> Self {
        Self::new()
    }
}
