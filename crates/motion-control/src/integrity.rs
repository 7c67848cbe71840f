//! Sentinel-based memory-integrity checks.
//!
//! Every long-lived state block carries a [`Sentinel`] pair (start and
//! end) initialized to [`crate::INTEGRITY_MAGIC`] at startup. The
//! integrity monitor, invoked once per HSM cycle, verifies every
//! registered sentinel and every registered per-subsystem assertion
//! ([`SystemAssertion`]). This is orthogonal to Rust's own memory-safety
//! guarantees: it catches hardware bit-flips and stray writes through
//! `unsafe` FFI boundaries, not logic errors the compiler would reject.

use crate::error::ControlError;
use crate::status::Status;
use crate::INTEGRITY_MAGIC;

/// A magic-number guard placed around a long-lived state block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentinel(u32);

impl Sentinel {
    /// A fresh sentinel set to the process-wide magic value.
    pub const fn new() -> Self {
        Self(INTEGRITY_MAGIC)
    }

    /// `true` if this sentinel still holds the magic value.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.0 == INTEGRITY_MAGIC
    }
}

impl Default for Sentinel {
    fn default() -> Self {
        Self::new()
    }
}

/// A pair of sentinels bracketing a state block, as the spec requires
/// ("integrity sentinels must equal the chosen magic value at every
/// dispatcher cycle").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentinelPair {
    pub magic_start: Sentinel,
    pub magic_end: Sentinel,
}

impl SentinelPair {
    pub const fn new() -> Self {
        Self {
            magic_start: Sentinel::new(),
            magic_end: Sentinel::new(),
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.magic_start.is_valid() && self.magic_end.is_valid()
    }
}

impl Default for SentinelPair {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl SentinelPair {
    /// Test-only: simulate the memory corruption this module exists to
    /// catch.
    pub(crate) fn corrupt(&mut self) {
        self.magic_start = Sentinel(0);
    }
}

/// A per-subsystem assertion the integrity monitor also runs each cycle.
///
/// Subsystems out of scope for this crate (planner, stepper, encoder,
/// command parsers, the I/O layer) register their own invariant checks
/// through this trait rather than exposing their internals here.
pub trait SystemAssertion {
    /// Name used in the resulting [`ControlError::Assertion`] on failure.
    fn name(&self) -> &'static str;
    /// Run the assertion. `Ok(())` if the subsystem's invariants hold.
    fn assert(&self) -> Result<(), ()>;
}

/// Aggregates sentinel checks and registered per-subsystem assertions.
pub struct IntegrityMonitor<'a> {
    sentinels: &'a [&'a SentinelPair],
    assertions: &'a [&'a dyn SystemAssertion],
}

impl<'a> IntegrityMonitor<'a> {
    pub const fn new(
        sentinels: &'a [&'a SentinelPair],
        assertions: &'a [&'a dyn SystemAssertion],
    ) -> Self {
        Self {
            sentinels,
            assertions,
        }
    }

    /// Runs every sentinel check, then every registered subsystem
    /// assertion, in order, stopping at the first failure.
    pub fn check(&self) -> Status {
        for pair in self.sentinels {
            if !pair.is_valid() {
                return Status::Err(ControlError::Assertion("sentinel"));
            }
        }
        for assertion in self.assertions {
            if assertion.assert().is_err() {
                return Status::Err(ControlError::Assertion(assertion.name()));
            }
        }
        Status::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysOk;
    impl SystemAssertion for AlwaysOk {
        fn name(&self) -> &'static str {
            "always-ok"
        }
        fn assert(&self) -> Result<(), ()> {
            Ok(())
        }
    }

    struct AlwaysFails;
    impl SystemAssertion for AlwaysFails {
        fn name(&self) -> &'static str {
            "planner"
        }
        fn assert(&self) -> Result<(), ()> {
            Err(())
        }
    }

    #[test]
    fn fresh_sentinel_is_valid() {
        let pair = SentinelPair::new();
        assert!(pair.is_valid());
    }

    #[test]
    fn corrupted_sentinel_is_invalid() {
        let mut pair = SentinelPair::new();
        pair.magic_start = Sentinel(0x1234);
        assert!(!pair.is_valid());
    }

    #[test]
    fn monitor_passes_when_everything_is_valid() {
        let pair = SentinelPair::new();
        let pairs = [&pair];
        let ok = AlwaysOk;
        let assertions: [&dyn SystemAssertion; 1] = [&ok];
        let monitor = IntegrityMonitor::new(&pairs, &assertions);
        assert_eq!(monitor.check(), Status::Ok);
    }

    #[test]
    fn monitor_reports_sentinel_corruption() {
        let mut corrupted = SentinelPair::new();
        corrupted.magic_end = Sentinel(0);
        let pairs = [&corrupted];
        let monitor = IntegrityMonitor::new(&pairs, &[]);
        assert_eq!(
            monitor.check(),
            Status::Err(ControlError::Assertion("sentinel"))
        );
    }

    #[test]
    fn monitor_reports_subsystem_assertion_failure() {
        let pair = SentinelPair::new();
        let pairs = [&pair];
        let failing = AlwaysFails;
        let assertions: [&dyn SystemAssertion; 1] = [&failing];
        let monitor = IntegrityMonitor::new(&pairs, &assertions);
        assert_eq!(
            monitor.check(),
            Status::Err(ControlError::Assertion("planner"))
        );
    }
}
