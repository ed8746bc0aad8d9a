//! Sticky fault bitset (§3, §9 "re-architecture cue: bitset of faults").
//!
//! A small value type rather than a shared mutable global. Faults are sticky:
//! once set during a run they remain set until the run is torn down (i.e.
//! until a fresh `FaultSet` replaces this one).

use bitflags::bitflags;

bitflags! {
    /// Hard faults invalidate a result for certification use; `THERMAL_DRIFT`
    /// is a warning only.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
    pub struct FaultSet: u8 {
        const OVERFLOW      = 0b0000_0001;
        const UNDERFLOW     = 0b0000_0010;
        const DIV_ZERO      = 0b0000_0100;
        const TIMER_ERROR   = 0b0000_1000;
        const VERIFY_FAIL   = 0b0001_0000;
        const THERMAL_DRIFT = 0b0010_0000;
    }
}

/// All hard (certification-invalidating) faults.
const HARD_FAULTS: FaultSet = FaultSet::OVERFLOW
    .union(FaultSet::UNDERFLOW)
    .union(FaultSet::DIV_ZERO)
    .union(FaultSet::TIMER_ERROR)
    .union(FaultSet::VERIFY_FAIL);

impl FaultSet {
    /// True iff any hard fault is set. `THERMAL_DRIFT` alone does not count.
    pub fn has_hard_fault(&self) -> bool {
        self.intersects(HARD_FAULTS)
    }

    /// True iff the thermal-drift warning is set.
    pub fn has_warning(&self) -> bool {
        self.contains(FaultSet::THERMAL_DRIFT)
    }

    /// Merge another fault set's flags into this one (faults are sticky: OR,
    /// never clear).
    pub fn merge(&mut self, other: FaultSet) {
        *self |= other;
    }

    /// Reset to no faults — used only at run teardown / re-init, never mid-run.
    pub fn clear_all(&mut self) {
        *self = FaultSet::empty();
    }
}
