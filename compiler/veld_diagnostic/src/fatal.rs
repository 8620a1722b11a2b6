//! Host fail-fast opt-in for catastrophic lowering failures.
//!
//! A host process may set the `VELD_LOWER_FAIL_FAST` environment variable to
//! request that catastrophic internal failures crash instead of being
//! contained to the symbol being lowered. The probe runs at most once; any
//! failure while probing is swallowed and treated as "feature disabled".

use std::sync::atomic::{AtomicU8, Ordering};

/// Environment variable that enables fail-fast behavior.
pub const FAIL_FAST_ENV: &str = "VELD_LOWER_FAIL_FAST";

const PROBE_PENDING: u8 = 0;
const PROBE_DISABLED: u8 = 1;
const PROBE_ENABLED: u8 = 2;

static FAIL_FAST: AtomicU8 = AtomicU8::new(PROBE_PENDING);

/// Category of a fatal condition reaching the fail-fast gate.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FatalKind {
    /// Explicit not-yet-implemented signal; another component handles the
    /// call, so crashing would be wrong even under fail-fast.
    NotImplemented,
    /// Expected transient host/environment race; handled elsewhere.
    TransientHost,
    /// Genuine invariant breach with no handler.
    Catastrophic,
}

fn parse_toggle(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

fn probe() -> u8 {
    match std::env::var(FAIL_FAST_ENV) {
        Ok(value) if parse_toggle(&value) => PROBE_ENABLED,
        Ok(_) | Err(std::env::VarError::NotPresent) => PROBE_DISABLED,
        Err(error) => {
            if cfg!(debug_assertions) {
                tracing::debug!(%error, "fail-fast probe failed; treating as disabled");
            }
            PROBE_DISABLED
        }
    }
}

/// Whether the host opted into fail-fast crash behavior.
///
/// The environment is probed on first call and the answer cached for the
/// process lifetime.
pub fn fail_fast_enabled() -> bool {
    let state = FAIL_FAST.load(Ordering::Relaxed);
    if state != PROBE_PENDING {
        return state == PROBE_ENABLED;
    }
    let probed = probe();
    // A racing probe reads the same environment; either store wins.
    FAIL_FAST.store(probed, Ordering::Relaxed);
    probed == PROBE_ENABLED
}

/// Whether a fatal condition of the given kind should crash the process.
///
/// Returns `false` when fail-fast is disabled, and always for the excluded
/// categories that indicate "handled elsewhere". The caller performs the
/// actual abort; this function only decides.
pub fn crash_if_fail_fast_enabled(kind: FatalKind) -> bool {
    if !fail_fast_enabled() {
        return false;
    }
    match kind {
        FatalKind::NotImplemented | FatalKind::TransientHost => false,
        FatalKind::Catastrophic => true,
    }
}
