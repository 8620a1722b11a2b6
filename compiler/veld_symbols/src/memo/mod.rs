//! Compute-once memoization cell for derived symbol attributes.
//!
//! Many worker threads may demand the same symbol attribute concurrently.
//! [`MemoCell`] resolves the race without locks: callers that find the cell
//! unstarted compute redundantly, then race a single compare-and-swap.
//! Exactly one caller wins; its value becomes the only value any reader
//! ever observes, and only its diagnostics are committed to the sink.
//! Losing computations are discarded whole — value and diagnostics both.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU32, Ordering};

use veld_diagnostic::{DiagnosticBag, DiagnosticSink};

/// Raw sentinel marking a cell that has not been populated.
const UNSTARTED: u32 = u32::MAX;

/// A value storable in a [`MemoCell`].
///
/// Values round-trip through a raw `u32`; the all-ones pattern is reserved
/// as the unstarted sentinel and must never be a valid encoding.
pub trait MemoValue: Copy + Eq {
    /// Encode to the raw representation.
    fn to_raw(self) -> u32;
    /// Decode from the raw representation.
    fn from_raw(raw: u32) -> Self;
}

impl MemoValue for veld_ir::TypeId {
    fn to_raw(self) -> u32 {
        self.raw()
    }

    fn from_raw(raw: u32) -> Self {
        veld_ir::TypeId::from_raw(raw)
    }
}

/// Thread-safe compute-once slot for a lazily derived symbol attribute.
///
/// The cell is a single atomic word. Readers observe either "unstarted" or
/// the winning, fully computed value — never a partial value, never two
/// different values. Progress is lock-free: no caller ever blocks on
/// another's computation.
pub struct MemoCell<T> {
    slot: AtomicU32,
    _marker: PhantomData<fn() -> T>,
}

impl<T: MemoValue> MemoCell<T> {
    /// Create an unstarted cell.
    pub const fn new() -> Self {
        MemoCell {
            slot: AtomicU32::new(UNSTARTED),
            _marker: PhantomData,
        }
    }

    /// The installed value, or `None` while unstarted.
    pub fn get(&self) -> Option<T> {
        match self.slot.load(Ordering::Acquire) {
            UNSTARTED => None,
            raw => Some(T::from_raw(raw)),
        }
    }

    /// Get the memoized value, computing it if absent.
    ///
    /// `compute` receives a fresh [`DiagnosticBag`]; it must be free of
    /// side effects other than through that bag, because it may run more
    /// than once under contention. If this caller wins the installation
    /// race its bag is committed to `sink`; otherwise bag and value are
    /// discarded and the winner's value is returned.
    ///
    /// A panic inside `compute` propagates to this caller and leaves the
    /// cell unstarted, so a later caller retries.
    pub fn get_or_compute(
        &self,
        sink: &DiagnosticSink,
        compute: impl FnOnce(&mut DiagnosticBag) -> T,
    ) -> T {
        if let Some(value) = self.get() {
            return value;
        }

        let mut bag = DiagnosticBag::new();
        let value = compute(&mut bag);
        let raw = value.to_raw();
        debug_assert!(raw != UNSTARTED, "computed value encodes to the sentinel");

        match self
            .slot
            .compare_exchange(UNSTARTED, raw, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                sink.commit(bag);
                value
            }
            Err(winner) => T::from_raw(winner),
        }
    }
}

impl<T: MemoValue> Default for MemoCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: MemoValue + std::fmt::Debug> std::fmt::Debug for MemoCell<T> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.get() {
            Some(value) => write!(formatter, "MemoCell({value:?})"),
            None => write!(formatter, "MemoCell(<unstarted>)"),
        }
    }
}
