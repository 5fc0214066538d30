//! Debug-only guard against reentry from user key code.
//!
//! Probing the index runs user `Eq` implementations while an operation is in
//! flight. A key type that calls back into the same map (for example through
//! a stashed raw pointer) would observe a structure that is mid-update. In
//! debug builds the guard panics on such reentry; in release builds it is a
//! zero-sized no-op.

use core::cell::Cell;

#[derive(Debug, Default)]
pub(crate) struct ProbeGuard {
    #[cfg(debug_assertions)]
    in_probe: Cell<bool>,
}

impl ProbeGuard {
    pub(crate) const fn new() -> Self {
        ProbeGuard {
            #[cfg(debug_assertions)]
            in_probe: Cell::new(false),
        }
    }

    /// Marks a probe section. Hold the returned scope for as long as user
    /// `Eq` code may run; drop it before invoking the eviction policy, which
    /// runs against a fully consistent map.
    #[inline]
    pub(crate) fn scope(&self) -> ProbeScope<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.in_probe.get(),
                "map re-entered from user key code during a probe"
            );
            self.in_probe.set(true);
        }
        ProbeScope { guard: self }
    }
}

pub(crate) struct ProbeScope<'a> {
    guard: &'a ProbeGuard,
}

impl Drop for ProbeScope<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.guard.in_probe.set(false);
        #[cfg(not(debug_assertions))]
        let _ = self.guard;
    }
}
