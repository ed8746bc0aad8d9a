//! Integer statistics kernel (C3).
//!
//! Every operation here is integer-only: no `sqrt`, no floating division, no
//! platform-variant comparator. Sorting is deterministic — insertion sort for
//! small slices, heapsort otherwise; quicksort is avoided because its pivot
//! choice is not fixed by this interface.

use crate::error::{BenchError, BenchResult};
use crate::fault::FaultSet;

const INSERTION_SORT_THRESHOLD: usize = 64;

/// `⌊√n⌋` via binary search. The inner comparison uses `mid <= n / mid`
/// rather than `mid * mid <= n` so it never overflows for `n` near `u64::MAX`.
pub fn isqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    let mut lo = 1u64;
    let mut hi = n;
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if mid <= n / mid {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    lo
}

/// Sort in place. Insertion sort below [`INSERTION_SORT_THRESHOLD`], heapsort
/// above — both are fixed-algorithm, unlike quicksort's pivot-dependent order.
pub fn sort(samples: &mut [u64]) {
    if samples.len() <= INSERTION_SORT_THRESHOLD {
        insertion_sort(samples);
    } else {
        heapsort(samples);
    }
}

fn insertion_sort(a: &mut [u64]) {
    for i in 1..a.len() {
        let mut j = i;
        while j > 0 && a[j - 1] > a[j] {
            a.swap(j - 1, j);
            j -= 1;
        }
    }
}

fn heapsort(a: &mut [u64]) {
    let n = a.len();
    if n < 2 {
        return;
    }
    for start in (0..n / 2).rev() {
        sift_down(a, start, n);
    }
    for end in (1..n).rev() {
        a.swap(0, end);
        sift_down(a, 0, end);
    }
}

fn sift_down(a: &mut [u64], start: usize, end: usize) {
    let mut root = start;
    loop {
        let mut child = root * 2 + 1;
        if child >= end {
            break;
        }
        if child + 1 < end && a[child] < a[child + 1] {
            child += 1;
        }
        if a[root] < a[child] {
            a.swap(root, child);
            root = child;
        } else {
            break;
        }
    }
}

/// Percentile over an ascending-sorted, non-empty slice via linear
/// interpolation between the two bracketing ranks.
pub fn percentile(sorted: &[u64], p: u64) -> BenchResult<u64> {
    if sorted.is_empty() {
        return Err(BenchError::DivZero(
            "percentile requested over zero samples".into(),
        ));
    }
    let n = sorted.len() as u64;
    let rank_scaled = p * (n - 1);
    let rank = (rank_scaled / 100) as usize;
    let frac = rank_scaled % 100;
    let lo = sorted[rank];
    if rank + 1 >= sorted.len() {
        return Ok(lo);
    }
    let hi = sorted[rank + 1];
    Ok(lo + ((hi - lo) * frac) / 100)
}

/// Single-pass mean/variance accumulator (Welford's algorithm).
#[derive(Debug, Clone, Copy, Default)]
pub struct Welford {
    count: u64,
    mean: i64,
    m2: i64,
}

impl Welford {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, x: u64) {
        self.count += 1;
        let x = x as i64;
        let delta = x - self.mean;
        self.mean += delta / self.count as i64;
        let delta2 = x - self.mean;
        self.m2 += delta * delta2;
    }

    pub fn mean(&self) -> u64 {
        self.mean.max(0) as u64
    }

    /// `Sₙ / (n - 1)` for `n > 1`, else `0`.
    pub fn variance(&self) -> u64 {
        if self.count > 1 {
            (self.m2.max(0) as u64) / (self.count - 1)
        } else {
            0
        }
    }

    pub fn stddev(&self) -> u64 {
        isqrt(self.variance())
    }
}

/// Fixed-range histogram. `build` fills a caller-owned bin array and never
/// allocates.
pub struct Histogram {
    pub min_ns: u64,
    pub max_ns: u64,
    pub bin_width: u64,
    pub underflow_count: u64,
    pub overflow_count: u64,
}

impl Histogram {
    pub fn new(min_ns: u64, max_ns: u64, bin_count: usize) -> BenchResult<Self> {
        if max_ns <= min_ns || bin_count == 0 {
            return Err(BenchError::InvalidConfig(
                "histogram range requires max_ns > min_ns and bin_count > 0".into(),
            ));
        }
        let span = max_ns - min_ns;
        let bin_width = (span / bin_count as u64).max(1);
        Ok(Histogram {
            min_ns,
            max_ns,
            bin_width,
            underflow_count: 0,
            overflow_count: 0,
        })
    }

    /// Fill `bins` (length = bin_count) from `samples`. Returns the total of
    /// bin counts plus underflow/overflow sentinels, which always equals
    /// `samples.len()`.
    pub fn build(&mut self, samples: &[u64], bins: &mut [u64]) -> u64 {
        for b in bins.iter_mut() {
            *b = 0;
        }
        self.underflow_count = 0;
        self.overflow_count = 0;
        for &x in samples {
            if x < self.min_ns {
                self.underflow_count += 1;
            } else if x >= self.max_ns {
                self.overflow_count += 1;
            } else {
                let idx = ((x - self.min_ns) / self.bin_width) as usize;
                let idx = idx.min(bins.len() - 1);
                bins[idx] += 1;
            }
        }
        bins.iter().sum::<u64>() + self.underflow_count + self.overflow_count
    }
}

/// MAD-based modified-Z outlier count, scaled by 10 000 (threshold
/// `|z| > 3.5` becomes `(6745 * dev) / mad > 35_000`).
///
/// `deviations` is caller-owned scratch, length `samples.len()`, and is
/// overwritten and sorted in place to find the median deviation (MAD) —
/// no heap allocation happens inside this function. Its contents are
/// undefined on return; the second pass below recomputes each sample's
/// deviation directly from `median` rather than reading back `deviations`.
pub fn mad_outlier_count(sorted_samples: &[u64], deviations: &mut [u64]) -> BenchResult<usize> {
    if sorted_samples.is_empty() {
        return Err(BenchError::DivZero(
            "MAD outlier detection requested over zero samples".into(),
        ));
    }
    let median = percentile(sorted_samples, 50)?;
    for (i, &x) in sorted_samples.iter().enumerate() {
        deviations[i] = x.abs_diff(median);
    }
    sort(deviations);
    let mad = percentile(deviations, 50)?;

    if mad == 0 {
        return Ok(0);
    }
    let mut count = 0usize;
    for &x in sorted_samples {
        let dev = x.abs_diff(median);
        let modified_z = (6745u64.saturating_mul(dev)) / mad;
        if modified_z > 35_000 {
            count += 1;
        }
    }
    Ok(count)
}

/// Classic `mean + 3*stddev` outlier count — distinct from the MAD-based
/// detector above, kept as a separate entry point rather than silently
/// substituted.
pub fn classic_outliers(samples: &[u64], mean: u64, stddev: u64) -> usize {
    let threshold = mean.saturating_add(3 * stddev);
    samples.iter().filter(|&&x| x > threshold).count()
}

/// Populated latency statistics for a completed measurement run.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct LatencyStats {
    pub count: u64,
    pub min_ns: u64,
    pub max_ns: u64,
    pub mean_ns: u64,
    pub variance_ns2: u64,
    pub stddev_ns: u64,
    pub p0_ns: u64,
    pub p25_ns: u64,
    pub p50_ns: u64,
    pub p75_ns: u64,
    pub p99_ns: u64,
    pub p100_ns: u64,
    pub mad_outlier_count: usize,
    pub wcet_observed_ns: u64,
    pub wcet_bound_ns: u64,
    pub sum_ns: u64,
}

/// Sorts `samples` in place, computes the full latency statistics, and
/// merges any `overflow`/`div_zero` faults encountered into `faults`.
///
/// `deviations_scratch` is caller-owned scratch for the MAD outlier pass,
/// length `>= samples.len()`; only the `samples.len()` prefix is touched.
/// No allocation happens inside this function.
pub fn compute_stats(
    samples: &mut [u64],
    deviations_scratch: &mut [u64],
    faults: &mut FaultSet,
) -> BenchResult<LatencyStats> {
    if samples.is_empty() {
        faults.merge(FaultSet::DIV_ZERO);
        return Err(BenchError::DivZero(
            "compute_stats requires at least one sample".into(),
        ));
    }
    if deviations_scratch.len() < samples.len() {
        return Err(BenchError::InvalidConfig(
            "deviations scratch buffer smaller than sample count".into(),
        ));
    }

    sort(samples);

    let mut welford = Welford::new();
    let mut sum: u64 = 0;
    let mut sum_overflowed = false;
    for &x in samples.iter() {
        welford.push(x);
        match sum.checked_add(x) {
            Some(s) => sum = s,
            None => {
                sum_overflowed = true;
                faults.merge(FaultSet::OVERFLOW);
            }
        }
    }
    if sum_overflowed {
        sum = u64::MAX;
    }

    let min_ns = samples[0];
    let max_ns = samples[samples.len() - 1];
    // Primary mean is the plain saturating sum / count; Welford's running
    // mean is only used as a fallback once the sum accumulator has
    // overflowed (see module docs on `Mean`).
    let mean_ns = if sum_overflowed {
        welford.mean()
    } else {
        sum / samples.len() as u64
    };
    let variance_ns2 = welford.variance();
    let stddev_ns = welford.stddev();

    let p0_ns = percentile(samples, 0)?;
    let p25_ns = percentile(samples, 25)?;
    let p50_ns = percentile(samples, 50)?;
    let p75_ns = percentile(samples, 75)?;
    let p99_ns = percentile(samples, 99)?;
    let p100_ns = percentile(samples, 100)?;

    let deviations = &mut deviations_scratch[..samples.len()];
    let mad_outlier_count = mad_outlier_count(samples, deviations)?;

    let wcet_observed_ns = max_ns;
    let wcet_bound_ns = match max_ns.checked_add(6u64.saturating_mul(stddev_ns)) {
        Some(bound) => bound,
        None => {
            faults.merge(FaultSet::OVERFLOW);
            max_ns
        }
    };

    Ok(LatencyStats {
        count: samples.len() as u64,
        min_ns,
        max_ns,
        mean_ns,
        variance_ns2,
        stddev_ns,
        p0_ns,
        p25_ns,
        p50_ns,
        p75_ns,
        p99_ns,
        p100_ns,
        mad_outlier_count,
        wcet_observed_ns,
        wcet_bound_ns,
        sum_ns: sum,
    })
}
