//! Thread-safe string interner.
//!
//! Provides O(1) interning and lookup with concurrent access through a
//! single reader-writer lock. The lowering core interns far fewer strings
//! than a full front end, so one lock is enough; readers never block each
//! other.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Name;

struct InternerInner {
    /// Map from string content to index.
    map: FxHashMap<&'static str, u32>,
    /// Storage for string contents, indexed by `Name`.
    strings: Vec<&'static str>,
}

/// Thread-safe string interner.
///
/// Index 0 is the pre-interned empty string ([`Name::EMPTY`]). Interned
/// strings live for the lifetime of the process; a compilation owns exactly
/// one interner shared across its worker threads.
pub struct StringInterner {
    inner: RwLock<InternerInner>,
}

impl StringInterner {
    /// Create a new interner with the empty string pre-interned.
    pub fn new() -> Self {
        let empty: &'static str = "";
        let mut map = FxHashMap::default();
        map.insert(empty, 0);
        StringInterner {
            inner: RwLock::new(InternerInner {
                map,
                strings: vec![empty],
            }),
        }
    }

    /// Intern a string, returning its `Name`.
    ///
    /// Interning the same content twice returns the same `Name`.
    pub fn intern(&self, text: &str) -> Name {
        if let Some(&index) = self.inner.read().map.get(text) {
            return Name::from_raw(index);
        }

        let mut inner = self.inner.write();
        // Re-check under the write lock: another thread may have interned
        // the same string between our read and write acquisitions.
        if let Some(&index) = inner.map.get(text) {
            return Name::from_raw(index);
        }

        let index = u32::try_from(inner.strings.len()).unwrap_or_else(|_| {
            panic!("interner exceeded capacity: {} strings", inner.strings.len())
        });
        let stored: &'static str = Box::leak(text.to_owned().into_boxed_str());
        inner.map.insert(stored, index);
        inner.strings.push(stored);
        Name::from_raw(index)
    }

    /// Resolve a `Name` back to its string content.
    ///
    /// Returns `None` for names not produced by this interner.
    pub fn resolve(&self, name: Name) -> Option<&'static str> {
        self.inner.read().strings.get(name.index()).copied()
    }

    /// Number of interned strings (including the pre-interned empty string).
    pub fn len(&self) -> usize {
        self.inner.read().strings.len()
    }

    /// Whether only the pre-interned empty string is present.
    pub fn is_empty(&self) -> bool {
        self.len() == 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}
