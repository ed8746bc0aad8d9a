//! Benchmark runner (C4, §4.4): warmup, critical loop, result assembly.
//!
//! Implemented as a typestate machine — `Uninit -> Initialised -> Warmed ->
//! Executed -> Reported` — so the five public operations are only callable
//! in the states where they make sense, enforced at compile time rather than
//! by boolean flags (§9 "Runner as a typestate machine").

use std::marker::PhantomData;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::comparator::{self, ResultBindingInputs};
use crate::env;
use crate::error::{BenchError, BenchResult};
use crate::fault::FaultSet;
use crate::hasher::Sha256;
use crate::model::{
    Config, EnvReading, HistogramSnapshot, HwCounterSnapshot, ResultRecord, Throughput,
    CB_MAX_SAMPLES, SCHEMA_VERSION,
};
use crate::platform;
use crate::stats;
use crate::timer::Timer;

/// The inference routine under measurement (§6 "Inference function"). Takes
/// the user-supplied input and must write exactly `output.len()` bytes to
/// `output`, returning `true` on success.
pub type InferenceFn = dyn FnMut(&[u8], &mut [u8]) -> bool;

pub struct Uninit;
pub struct Initialised;
pub struct Warmed;
pub struct Executed;

fn validate_config(config: &Config) -> BenchResult<()> {
    if config.measure_iterations == 0 || config.measure_iterations as usize > CB_MAX_SAMPLES {
        return Err(BenchError::InvalidConfig(
            "measure_iterations must be > 0 and <= CB_MAX_SAMPLES".into(),
        ));
    }
    if config.batch_size == 0 {
        return Err(BenchError::InvalidConfig("batch_size must be > 0".into()));
    }
    if config.collect_histogram && config.histogram_max_ns <= config.histogram_min_ns {
        return Err(BenchError::InvalidConfig(
            "histogram_max_ns must exceed histogram_min_ns".into(),
        ));
    }
    Ok(())
}

pub fn config_default() -> Config {
    Config::default()
}

pub fn config_validate(config: &Config) -> BenchResult<()> {
    validate_config(config)
}

/// The typestate-tagged runner. `state` carries no runtime data; it exists
/// purely to make illegal operation sequences a compile error.
pub struct Runner<'buf, State> {
    config: Config,
    samples: &'buf mut [u64],
    len: usize,
    timer: Timer,
    hasher: Option<Sha256>,
    faults: FaultSet,
    verification_failures: u64,
    env_start: Option<EnvReading>,
    benchmark_start_ns: u64,
    /// Fixed-capacity MAD outlier-detection scratch, sized to the sample
    /// buffer's capacity at `runner_init` and reused by `get_result` — the
    /// only allocation happens here, once, before the measurement window
    /// starts (§5 "fixed-capacity working buffers", §9 redesign cue).
    deviations: Vec<u64>,
    _state: PhantomData<State>,
}

impl<'buf> Runner<'buf, Uninit> {
    /// Validate `config`, borrow `sample_buffer` (length must be at least
    /// `config.measure_iterations`), and initialise the timer and, if
    /// `verify_outputs`, the hasher context.
    pub fn runner_init(
        config: Config,
        sample_buffer: &'buf mut [u64],
    ) -> BenchResult<Runner<'buf, Initialised>> {
        validate_config(&config)?;
        if sample_buffer.len() < config.measure_iterations as usize {
            return Err(BenchError::InvalidConfig(
                "sample buffer capacity smaller than measure_iterations".into(),
            ));
        }
        let timer = Timer::init(config.timer_source)?;
        let hasher = config.verify_outputs.then(Sha256::new);
        let deviations = vec![0u64; sample_buffer.len()];

        Ok(Runner {
            config,
            samples: sample_buffer,
            len: 0,
            timer,
            hasher,
            faults: FaultSet::empty(),
            verification_failures: 0,
            env_start: None,
            benchmark_start_ns: 0,
            deviations,
            _state: PhantomData,
        })
    }
}

impl<'buf> Runner<'buf, Initialised> {
    /// Run exactly `warmup_iterations` calls with no latency recorded. If
    /// `fn` fails, warmup aborts and the failure is surfaced unchanged.
    pub fn warmup(
        mut self,
        inference: &mut InferenceFn,
        input: &[u8],
        output: &mut [u8],
    ) -> BenchResult<Runner<'buf, Warmed>> {
        for _ in 0..self.config.warmup_iterations {
            if !inference(input, output) {
                return Err(BenchError::VerifyFail(
                    "inference function failed during warmup".into(),
                ));
            }
        }
        self.env_start = self.config.monitor_environment.then(env::snapshot);
        self.benchmark_start_ns = self.timer.now_ns(&mut self.faults);

        Ok(Runner {
            config: self.config,
            samples: self.samples,
            len: self.len,
            timer: self.timer,
            hasher: self.hasher,
            faults: self.faults,
            verification_failures: self.verification_failures,
            env_start: self.env_start,
            benchmark_start_ns: self.benchmark_start_ns,
            deviations: self.deviations,
            _state: PhantomData,
        })
    }
}

impl<'buf> Runner<'buf, Warmed> {
    /// The critical loop: `measure_iterations` timed calls. Hashing, fault
    /// bookkeeping and everything else sit strictly outside `[t_start,
    /// t_end]` (§4.4 contract).
    pub fn execute(
        mut self,
        inference: &mut InferenceFn,
        input: &[u8],
        output: &mut [u8],
    ) -> Runner<'buf, Executed> {
        for i in 0..self.config.measure_iterations as usize {
            let t_start = self.timer.now_ns(&mut self.faults);
            let rc = inference(input, output);
            let t_end = self.timer.now_ns(&mut self.faults);

            self.samples[i] = t_end.saturating_sub(t_start);
            if t_end < t_start {
                self.faults.merge(FaultSet::TIMER_ERROR);
            }

            if self.config.verify_outputs {
                if let Some(hasher) = self.hasher.as_mut() {
                    let _ = hasher.update(output);
                }
            }
            if !rc {
                self.faults.merge(FaultSet::VERIFY_FAIL);
                self.verification_failures += 1;
            }
        }
        self.len = self.config.measure_iterations as usize;

        Runner {
            config: self.config,
            samples: self.samples,
            len: self.len,
            timer: self.timer,
            hasher: self.hasher,
            faults: self.faults,
            verification_failures: self.verification_failures,
            env_start: self.env_start,
            benchmark_start_ns: self.benchmark_start_ns,
            deviations: self.deviations,
            _state: PhantomData,
        }
    }
}

impl<'buf> Runner<'buf, Executed> {
    /// Assemble the final result record. Consumes the runner; `Reported` is
    /// represented by there being no runner left to call further operations
    /// on, rather than a fifth marker type.
    pub fn get_result(mut self) -> BenchResult<ResultRecord> {
        let collected = &mut self.samples[..self.len];
        let latency = stats::compute_stats(collected, &mut self.deviations, &mut self.faults)?;

        let sum_ns = latency.sum_ns.max(1);
        let inferences_per_sec = (latency.count.saturating_mul(1_000_000_000)) / sum_ns;
        let samples_per_sec = inferences_per_sec.saturating_mul(self.config.batch_size as u64);

        let histogram = if self.config.collect_histogram {
            build_histogram(&self.config, collected)
        } else {
            None
        };

        let environment = if let Some(start) = self.env_start {
            let end = env::snapshot();
            let summary = env::summarize(start, end);
            if summary.thermal_drift {
                self.faults.merge(FaultSet::THERMAL_DRIFT);
            }
            Some(summary)
        } else {
            None
        };

        let benchmark_end_ns = self.timer.now_ns(&mut self.faults);
        let benchmark_duration_ns = benchmark_end_ns.saturating_sub(self.benchmark_start_ns);
        let wall_clock_unix_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let platform_info = platform::detect();

        let output_hash = match self.hasher.as_ref() {
            Some(hasher) => {
                let mut copy = hasher.clone();
                crate::hasher::to_hex(&copy.finalize())
            }
            None => String::new(),
        };

        let config_hash = config_fingerprint(&self.config);
        let result_hash = if let Ok(output_digest) = crate::hasher::from_hex(&output_hash) {
            let inputs = ResultBindingInputs {
                output_hash: &output_digest,
                platform: &platform_info.platform_tag,
                config_hash,
                min_ns: latency.min_ns,
                max_ns: latency.max_ns,
                mean_ns: latency.mean_ns,
                p99_ns: latency.p99_ns,
                timestamp_unix: wall_clock_unix_secs,
            };
            crate::hasher::to_hex(&comparator::result_binding_digest(&inputs))
        } else {
            String::new()
        };

        // Golden verification participates in the same fault/validity
        // bookkeeping as every other check (§3 "four optional paths" names
        // `golden_path` as part of `Config`; §7 "verify_fail" covers a
        // hash mismatch against a golden reference).
        let golden_mismatch = match &self.config.golden_path {
            Some(path) => {
                let golden_ref = crate::golden::load(std::path::Path::new(path))?;
                !crate::golden::verify(&golden_ref, &output_hash)?
            }
            None => false,
        };
        if golden_mismatch {
            self.faults.merge(FaultSet::VERIFY_FAIL);
        }

        let determinism_verified = self.config.verify_outputs
            && self.verification_failures == 0
            && !golden_mismatch;

        Ok(ResultRecord {
            schema_version: SCHEMA_VERSION,
            platform: platform_info,
            config: self.config,
            latency,
            throughput: Throughput {
                inferences_per_sec,
                samples_per_sec,
                bytes_per_sec: 0,
                batch_size: self.config.batch_size,
            },
            hw_counters: None::<HwCounterSnapshot>,
            environment,
            histogram,
            determinism_verified,
            verification_failures: self.verification_failures,
            output_hash,
            result_hash,
            benchmark_start_ns: self.benchmark_start_ns,
            benchmark_end_ns,
            benchmark_duration_ns,
            wall_clock_unix_secs,
            faults: self.faults,
        })
    }
}

/// Builds the optional histogram snapshot from already-sorted samples.
/// A malformed configured range (rejected at `runner_init` time) never
/// reaches here, so failure is treated as "no histogram" rather than
/// propagated.
fn build_histogram(config: &Config, samples: &[u64]) -> Option<HistogramSnapshot> {
    let mut hist =
        stats::Histogram::new(config.histogram_min_ns, config.histogram_max_ns, config.histogram_bins as usize)
            .ok()?;
    let mut bins = vec![0u64; config.histogram_bins as usize];
    hist.build(samples, &mut bins);
    Some(HistogramSnapshot {
        min_ns: hist.min_ns,
        max_ns: hist.max_ns,
        bin_width_ns: hist.bin_width,
        bin_counts: bins,
        underflow_count: hist.underflow_count,
        overflow_count: hist.overflow_count,
    })
}

/// A 64-bit fingerprint of the echoed config, used as the `config_hash`
/// field of the result-binding digest. Not a security commitment on its
/// own — it narrows the binding to "this config produced this result".
fn config_fingerprint(config: &Config) -> u64 {
    let encoded = format!(
        "{}|{}|{}|{:?}|{}",
        config.warmup_iterations,
        config.measure_iterations,
        config.batch_size,
        config.timer_source,
        config.verify_outputs
    );
    let digest = crate::hasher::hash(encoded.as_bytes());
    u64::from_le_bytes(digest[..8].try_into().expect("digest is 32 bytes"))
}

/// Convenience wrapper: init, warmup, execute, assemble in one call.
pub fn run_to_completion(
    config: Config,
    sample_buffer: &mut [u64],
    inference: &mut InferenceFn,
    input: &[u8],
    output: &mut [u8],
) -> BenchResult<ResultRecord> {
    let runner = Runner::runner_init(config, sample_buffer)?;
    let runner = runner.warmup(inference, input, output)?;
    let runner = runner.execute(inference, input, output);
    runner.get_result()
}
