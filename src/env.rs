//! Environmental probe (§6) and the stability predicate (§4.4).
//!
//! All fields are best-effort: a failed read leaves zeros rather than
//! raising a fault (§9, "absence must never make a result invalid").

use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};

use sysinfo::System;

use crate::model::{EnvReading, EnvironmentSummary};

/// Take a single environmental reading. Never fails; missing data reads as
/// zero, which the stability predicate treats as "no data, assume stable".
pub fn snapshot() -> EnvReading {
    let timestamp_ns = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);

    let mut sys = System::new_all();
    sys.refresh_all();
    let cpu_freq_hz = sys
        .cpus()
        .first()
        .map(|c| c.frequency() as u64 * 1_000_000)
        .unwrap_or(0);

    let cpu_temp_millidegrees_c = read_thermal_zone().unwrap_or(0);
    let throttle_count = read_throttle_count().unwrap_or(0);

    EnvReading {
        timestamp_ns,
        cpu_freq_hz,
        cpu_temp_millidegrees_c,
        throttle_count,
    }
}

fn read_thermal_zone() -> Option<i64> {
    let raw = fs::read_to_string("/sys/class/thermal/thermal_zone0/temp").ok()?;
    raw.trim().parse::<i64>().ok()
}

fn read_throttle_count() -> Option<u64> {
    None
}

/// Stability predicate: integer-only, no division of the ratio (§4.4).
///
/// `stable` iff `end_freq * 100 >= start_freq * 95` and no throttle events.
/// If `start_freq == 0` (no data), stability is assumed.
pub fn is_stable(start_freq_hz: u64, end_freq_hz: u64, total_throttle_events: u64) -> bool {
    if start_freq_hz == 0 {
        return true;
    }
    end_freq_hz.saturating_mul(100) >= start_freq_hz.saturating_mul(95)
        && total_throttle_events == 0
}

/// Fold a start/end reading pair into the summary the result record carries.
pub fn summarize(start: EnvReading, end: EnvReading) -> EnvironmentSummary {
    let min_freq_hz = start.cpu_freq_hz.min(end.cpu_freq_hz);
    let max_freq_hz = start.cpu_freq_hz.max(end.cpu_freq_hz);
    let min_temp_millidegrees_c = start.cpu_temp_millidegrees_c.min(end.cpu_temp_millidegrees_c);
    let max_temp_millidegrees_c = start.cpu_temp_millidegrees_c.max(end.cpu_temp_millidegrees_c);
    let total_throttle_events = start.throttle_count.saturating_add(end.throttle_count);
    let thermal_drift = !is_stable(start.cpu_freq_hz, end.cpu_freq_hz, total_throttle_events);

    EnvironmentSummary {
        start,
        end,
        min_freq_hz,
        max_freq_hz,
        min_temp_millidegrees_c,
        max_temp_millidegrees_c,
        total_throttle_events,
        thermal_drift,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s7_stability_drift_detected() {
        assert!(!is_stable(3_000_000_000, 2_800_000_000, 0));
    }

    #[test]
    fn s7_stability_holds_when_frequency_flat() {
        assert!(is_stable(3_000_000_000, 3_000_000_000, 0));
    }

    #[test]
    fn stability_assumed_when_no_frequency_data() {
        assert!(is_stable(0, 0, 5));
    }

    #[test]
    fn throttle_events_break_stability_even_at_flat_frequency() {
        assert!(!is_stable(3_000_000_000, 3_000_000_000, 1));
    }

    #[test]
    fn snapshot_never_panics() {
        let reading = snapshot();
        assert!(reading.timestamp_ns > 0 || reading.timestamp_ns == 0);
    }

    #[test]
    fn summarize_sets_thermal_drift_from_readings() {
        let start = EnvReading {
            timestamp_ns: 0,
            cpu_freq_hz: 3_000_000_000,
            cpu_temp_millidegrees_c: 40_000,
            throttle_count: 0,
        };
        let end = EnvReading {
            timestamp_ns: 1,
            cpu_freq_hz: 2_800_000_000,
            cpu_temp_millidegrees_c: 70_000,
            throttle_count: 0,
        };
        let summary = summarize(start, end);
        assert!(summary.thermal_drift);
        assert_eq!(summary.max_temp_millidegrees_c, 70_000);
        assert_eq!(summary.min_freq_hz, 2_800_000_000);
    }
}
