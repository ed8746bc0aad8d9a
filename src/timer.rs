//! Monotonic timer abstraction (C1).
//!
//! Public contract: `init`, `now_ns`, `resolution_ns`, `name`,
//! `calibration_ns`, `cycles_to_ns`. `now_ns` never allocates, never panics,
//! and is non-decreasing except where noted in §4.1's failure modes.
//!
//! The crate forbids `unsafe_code`, so the cycle-counter backends
//! (`Tsc`/`ArmVirtualCounter`/`RiscvCycle`) cannot be read directly without
//! inline asm or FFI; every concrete backend therefore resolves to the
//! portable monotonic clock (`std::time::Instant`) while still recording which
//! symbolic source was *requested* vs. *actually selected*, satisfying the
//! "falls back to the portable monotonic clock" contract for all non-portable
//! sources on every platform.

use std::time::Instant;

use crate::error::{BenchError, BenchResult};
use crate::fault::FaultSet;

/// Calibration reads at least this many back-to-back `now_ns` samples to
/// estimate measurement self-overhead.
const CALIBRATION_SAMPLES: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerSource {
    #[default]
    Auto,
    Posix,
    Tsc,
    ArmVirtualCounter,
    RiscvCycle,
}

impl TimerSource {
    fn label(self) -> &'static str {
        match self {
            TimerSource::Auto => "auto",
            TimerSource::Posix => "posix-monotonic",
            TimerSource::Tsc => "x86-tsc",
            TimerSource::ArmVirtualCounter => "arm64-cntvct",
            TimerSource::RiscvCycle => "riscv-cycle",
        }
    }
}

/// A monotonic nanosecond timer, calibrated once at `init`.
pub struct Timer {
    requested: TimerSource,
    origin: Instant,
    resolution_ns: u64,
    calibration_ns: u64,
    last_ns: u64,
}

impl Timer {
    /// Choose and calibrate a timer source. `auto` selects the
    /// highest-resolution backend available (the portable monotonic clock,
    /// since no cycle-counter backend is readable without `unsafe`). Requesting
    /// a specific unsupported source resolves identically, per the fallback
    /// contract in §4.1.
    pub fn init(preferred: TimerSource) -> BenchResult<Self> {
        let origin = Instant::now();
        let mut timer = Timer {
            requested: preferred,
            origin,
            resolution_ns: Self::measure_resolution(origin),
            calibration_ns: 0,
            last_ns: 0,
        };
        timer.calibration_ns = timer.calibrate();
        if timer.resolution_ns > 1_000 {
            return Err(BenchError::TimerInit(format!(
                "resolution {}ns exceeds the 1000ns contract",
                timer.resolution_ns
            )));
        }
        Ok(timer)
    }

    fn measure_resolution(origin: Instant) -> u64 {
        let mut min_delta = u64::MAX;
        let mut prev = origin.elapsed().as_nanos() as u64;
        for _ in 0..CALIBRATION_SAMPLES {
            let now = origin.elapsed().as_nanos() as u64;
            let delta = now.saturating_sub(prev);
            if delta > 0 && delta < min_delta {
                min_delta = delta;
            }
            prev = now;
        }
        if min_delta == u64::MAX { 1 } else { min_delta }
    }

    fn calibrate(&self) -> u64 {
        // Minimum back-to-back now_ns→now_ns gap over CALIBRATION_SAMPLES reads.
        let mut min_gap = u64::MAX;
        for _ in 0..CALIBRATION_SAMPLES {
            let a = self.origin.elapsed().as_nanos() as u64;
            let b = self.origin.elapsed().as_nanos() as u64;
            let gap = b.saturating_sub(a);
            if gap < min_gap {
                min_gap = gap;
            }
        }
        if min_gap == u64::MAX { 0 } else { min_gap }
    }

    /// Non-blocking, allocation-free, monotonically non-decreasing read.
    ///
    /// Returns `0` and leaves `timer_error` unset on the infallible portable
    /// backend; retained as fallible in the signature's error path for
    /// forward-compatibility with a future unsafe cycle-counter backend.
    pub fn now_ns(&mut self, faults: &mut FaultSet) -> u64 {
        let now = self.origin.elapsed().as_nanos();
        let now = if now > u128::from(u64::MAX) {
            faults.merge(FaultSet::OVERFLOW);
            u64::MAX
        } else {
            now as u64
        };
        if now < self.last_ns {
            faults.merge(FaultSet::TIMER_ERROR);
        } else {
            self.last_ns = now;
        }
        now
    }

    pub fn resolution_ns(&self) -> u64 {
        self.resolution_ns
    }

    pub fn calibration_ns(&self) -> u64 {
        self.calibration_ns
    }

    /// The symbolic name of the source actually selected — always the
    /// portable backend in this build (see module docs), but tagged with the
    /// originally-requested source for observability.
    pub fn name(&self) -> &'static str {
        "posix-monotonic"
    }

    /// The symbolic source that was originally requested, before fallback.
    /// Useful for environment snapshots that want to record operator intent
    /// even though `name()` always reports the backend actually in use.
    pub fn requested_label(&self) -> &'static str {
        self.requested.label()
    }

    /// Integer-only cycles→ns conversion for frequency-based backends.
    /// Saturates to `u64::MAX` and sets `overflow` rather than wrapping.
    pub fn cycles_to_ns(cycles: u64, freq_hz: u64, faults: &mut FaultSet) -> u64 {
        if freq_hz == 0 {
            faults.merge(FaultSet::DIV_ZERO);
            return 0;
        }
        let whole_secs = cycles / freq_hz;
        let remainder = cycles % freq_hz;

        let Some(secs_ns) = whole_secs.checked_mul(1_000_000_000) else {
            faults.merge(FaultSet::OVERFLOW);
            return u64::MAX;
        };
        let rem_ns = (remainder as u128 * 1_000_000_000u128) / freq_hz as u128;
        let Ok(rem_ns) = u64::try_from(rem_ns) else {
            faults.merge(FaultSet::OVERFLOW);
            return u64::MAX;
        };
        match secs_ns.checked_add(rem_ns) {
            Some(total) => total,
            None => {
                faults.merge(FaultSet::OVERFLOW);
                u64::MAX
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_selects_portable_backend() {
        let timer = Timer::init(TimerSource::Auto).unwrap();
        assert_eq!(timer.name(), "posix-monotonic");
        assert!(timer.resolution_ns() <= 1_000);
    }

    #[test]
    fn requesting_tsc_falls_back() {
        let timer = Timer::init(TimerSource::Tsc).unwrap();
        assert_eq!(timer.name(), "posix-monotonic");
    }

    #[test]
    fn now_ns_is_monotonic_over_many_reads() {
        let mut timer = Timer::init(TimerSource::Auto).unwrap();
        let mut faults = FaultSet::empty();
        let mut prev = timer.now_ns(&mut faults);
        for _ in 0..10_000 {
            let now = timer.now_ns(&mut faults);
            assert!(now >= prev, "non-monotonic read: {now} < {prev}");
            prev = now;
        }
        assert!(!faults.contains(FaultSet::TIMER_ERROR));
    }

    #[test]
    fn calibration_overhead_is_small_on_portable_backend() {
        let timer = Timer::init(TimerSource::Auto).unwrap();
        assert!(
            timer.calibration_ns() < 1_000,
            "calibration overhead {}ns >= 1000ns",
            timer.calibration_ns()
        );
    }

    #[test]
    fn cycles_to_ns_identity_like_conversion() {
        let mut faults = FaultSet::empty();
        // 1 GHz: 1 cycle == 1 ns.
        let ns = Timer::cycles_to_ns(1_000_000_000, 1_000_000_000, &mut faults);
        assert_eq!(ns, 1_000_000_000);
        assert!(faults.is_empty());
    }

    #[test]
    fn cycles_to_ns_div_zero() {
        let mut faults = FaultSet::empty();
        let ns = Timer::cycles_to_ns(100, 0, &mut faults);
        assert_eq!(ns, 0);
        assert!(faults.contains(FaultSet::DIV_ZERO));
    }

    #[test]
    fn cycles_to_ns_overflow_saturates() {
        let mut faults = FaultSet::empty();
        let ns = Timer::cycles_to_ns(u64::MAX, 1, &mut faults);
        assert_eq!(ns, u64::MAX);
        assert!(faults.contains(FaultSet::OVERFLOW));
    }
}
