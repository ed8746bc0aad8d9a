//! Shared data model (§3): configuration, result record and its constituent
//! parts. Sizes and field meanings are normative; layout here is the
//! idiomatic Rust choice.

use serde::{Deserialize, Serialize};

use crate::fault::FaultSet;
use crate::stats::LatencyStats;
use crate::timer::TimerSource;

pub const CB_MAX_SAMPLES: usize = 1_000_000;
pub const SCHEMA_VERSION: u32 = 1;

/// Benchmark run configuration (§6 "Configuration defaults").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub warmup_iterations: u32,
    pub measure_iterations: u32,
    pub batch_size: u32,
    pub timer_source: TimerSource,
    pub verify_outputs: bool,
    pub collect_histogram: bool,
    pub histogram_bins: u32,
    pub histogram_min_ns: u64,
    pub histogram_max_ns: u64,
    pub monitor_environment: bool,
    pub model_path: Option<String>,
    pub data_path: Option<String>,
    pub golden_path: Option<String>,
    pub output_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            warmup_iterations: 100,
            measure_iterations: 1000,
            batch_size: 1,
            timer_source: TimerSource::Auto,
            verify_outputs: true,
            collect_histogram: false,
            histogram_bins: 100,
            histogram_min_ns: 0,
            histogram_max_ns: 10_000_000,
            monitor_environment: true,
            model_path: None,
            data_path: None,
            golden_path: None,
            output_path: None,
        }
    }
}

/// Throughput figures derived from latency stats and `batch_size` (§3).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Throughput {
    pub inferences_per_sec: u64,
    pub samples_per_sec: u64,
    pub bytes_per_sec: u64,
    pub batch_size: u32,
}

/// Fixed-range bin counts, rendered for reporting. `bin_counts` is
/// caller-sized at construction time — never resized mid-run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramSnapshot {
    pub min_ns: u64,
    pub max_ns: u64,
    pub bin_width_ns: u64,
    pub bin_counts: Vec<u64>,
    pub underflow_count: u64,
    pub overflow_count: u64,
}

/// Optional hardware performance counter snapshot. Platform-conditional;
/// absence never invalidates a result (§9).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct HwCounterSnapshot {
    pub instructions: Option<u64>,
    pub cycles: Option<u64>,
    pub cache_misses: Option<u64>,
    pub branch_misses: Option<u64>,
}

/// A single environmental reading (§6 "Environmental probe").
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EnvReading {
    pub timestamp_ns: u64,
    pub cpu_freq_hz: u64,
    pub cpu_temp_millidegrees_c: i64,
    pub throttle_count: u64,
}

/// Start/end environmental snapshot pair plus derived stability verdict.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EnvironmentSummary {
    pub start: EnvReading,
    pub end: EnvReading,
    pub min_freq_hz: u64,
    pub max_freq_hz: u64,
    pub min_temp_millidegrees_c: i64,
    pub max_temp_millidegrees_c: i64,
    pub total_throttle_events: u64,
    pub thermal_drift: bool,
}

/// Platform identification (§6 "Platform probe").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformInfo {
    pub platform_tag: String,
    pub cpu_model: String,
    pub cpu_freq_mhz: u32,
}

/// A fully populated benchmark result (§3 "Result record").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
    pub schema_version: u32,
    pub platform: PlatformInfo,
    pub config: Config,
    pub latency: LatencyStats,
    pub throughput: Throughput,
    pub hw_counters: Option<HwCounterSnapshot>,
    pub environment: Option<EnvironmentSummary>,
    pub histogram: Option<HistogramSnapshot>,
    pub determinism_verified: bool,
    pub verification_failures: u64,
    pub output_hash: String,
    pub result_hash: String,
    pub benchmark_start_ns: u64,
    pub benchmark_end_ns: u64,
    pub benchmark_duration_ns: u64,
    pub wall_clock_unix_secs: u64,
    pub faults: FaultSet,
}

impl ResultRecord {
    /// A result is valid iff no hard fault is set and every output verified.
    pub fn is_valid(&self) -> bool {
        !self.faults.has_hard_fault() && self.verification_failures == 0
    }
}

/// A pre-computed expected output used to gate a run as deterministic (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldenReference {
    pub version: u32,
    pub format: String,
    pub output_hash: String,
    pub sample_count: Option<u64>,
    pub output_size: Option<u64>,
    pub platform: Option<String>,
}
