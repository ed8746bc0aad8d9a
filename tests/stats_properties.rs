use certifiable_bench::fault::FaultSet;
use certifiable_bench::stats;

#[test]
fn isqrt_required_table() {
    assert_eq!(stats::isqrt(0), 0);
    assert_eq!(stats::isqrt(1), 1);
    assert_eq!(stats::isqrt(3), 1);
    assert_eq!(stats::isqrt(4), 2);
    assert_eq!(stats::isqrt(99), 9);
    assert_eq!(stats::isqrt(100), 10);
    assert_eq!(stats::isqrt(u64::MAX), 4_294_967_295);
}

#[test]
fn percentile_interpolates_over_sorted_samples() {
    let mut samples: Vec<u64> = vec![5, 1, 9, 3, 7];
    stats::sort(&mut samples);
    assert_eq!(samples, vec![1, 3, 5, 7, 9]);

    let p0 = stats::percentile(&samples, 0).unwrap();
    let p100 = stats::percentile(&samples, 100).unwrap();
    assert_eq!(p0, 1);
    assert_eq!(p100, 9);
}

#[test]
fn percentile_rejects_empty_input() {
    assert!(stats::percentile(&[], 50).is_err());
}

#[test]
fn mad_outlier_flags_the_far_sample() {
    let mut samples = vec![10u64, 11, 9, 10, 500];
    stats::sort(&mut samples);
    let mut deviations = vec![0u64; samples.len()];
    let count = stats::mad_outlier_count(&samples, &mut deviations).unwrap();
    assert_eq!(count, 1);
}

#[test]
fn compute_stats_produces_consistent_ordering_and_wcet_bound() {
    let mut samples = vec![100u64, 110, 120, 130, 1000];
    let mut deviations = vec![0u64; samples.len()];
    let mut faults = FaultSet::empty();
    let result = stats::compute_stats(&mut samples, &mut deviations, &mut faults).unwrap();

    assert_eq!(result.count, 5);
    assert_eq!(result.min_ns, 100);
    assert_eq!(result.max_ns, 1000);
    assert!(result.wcet_bound_ns >= result.max_ns);
    assert_eq!(samples, vec![100, 110, 120, 130, 1000]);
}

#[test]
fn compute_stats_rejects_empty_buffer() {
    let mut samples: Vec<u64> = vec![];
    let mut deviations: Vec<u64> = vec![];
    let mut faults = FaultSet::empty();
    assert!(stats::compute_stats(&mut samples, &mut deviations, &mut faults).is_err());
}

#[test]
fn sort_handles_heapsort_threshold() {
    let mut samples: Vec<u64> = (0..200u64).rev().collect();
    stats::sort(&mut samples);
    assert!(samples.windows(2).all(|w| w[0] <= w[1]));
}
