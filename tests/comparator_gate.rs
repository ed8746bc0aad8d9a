use certifiable_bench::comparator::{self, ResultBindingInputs};
use certifiable_bench::fault::FaultSet;
use certifiable_bench::hasher;
use certifiable_bench::model::{Config, LatencyStats, PlatformInfo, ResultRecord, Throughput};

fn record(output_hash: &str, p99_ns: u64, inferences_per_sec: u64, wcet_bound_ns: u64) -> ResultRecord {
    ResultRecord {
        schema_version: certifiable_bench::model::SCHEMA_VERSION,
        platform: PlatformInfo::default(),
        config: Config::default(),
        latency: LatencyStats {
            p99_ns,
            wcet_bound_ns,
            ..Default::default()
        },
        throughput: Throughput {
            inferences_per_sec,
            ..Default::default()
        },
        hw_counters: None,
        environment: None,
        histogram: None,
        determinism_verified: true,
        verification_failures: 0,
        output_hash: output_hash.to_string(),
        result_hash: String::new(),
        benchmark_start_ns: 0,
        benchmark_end_ns: 0,
        benchmark_duration_ns: 0,
        wall_clock_unix_secs: 0,
        faults: FaultSet::empty(),
    }
}

#[test]
fn identical_outputs_unlock_the_ratio_comparison() {
    let hash = hasher::to_hex(&hasher::hash(b"identical-output"));
    let a = record(&hash, 1_000_000, 500, 2_000_000);
    let b = record(&hash, 2_000_000, 500, 2_000_000);

    let report = comparator::compare(&a, &b);
    assert!(report.outputs_identical);
    assert!(report.comparable);
    assert_eq!(report.latency_ratio_q16, 131_072);
    assert_eq!(report.latency_diff_ns, 1_000_000);
}

#[test]
fn differing_outputs_block_every_performance_field() {
    let a = record(&hasher::to_hex(&hasher::hash(b"a")), 100, 100, 100);
    let b = record(&hasher::to_hex(&hasher::hash(b"b")), 999, 999, 999);

    let report = comparator::compare(&a, &b);
    assert!(!report.outputs_identical);
    assert!(!report.comparable);
    assert_eq!(report.latency_diff_ns, 0);
    assert_eq!(report.latency_ratio_q16, 0);
    assert_eq!(report.throughput_ratio_q16, 0);
    assert_eq!(report.wcet_ratio_q16, 0);
}

#[test]
fn result_binding_digest_is_sensitive_to_every_field() {
    let digest = hasher::hash(b"some-output");
    let base = ResultBindingInputs {
        output_hash: &digest,
        platform: "x86_64",
        config_hash: 7,
        min_ns: 10,
        max_ns: 20,
        mean_ns: 15,
        p99_ns: 19,
        timestamp_unix: 1_800_000_000,
    };
    let base_digest = comparator::result_binding_digest(&base);

    let perturbations: Vec<ResultBindingInputs> = vec![
        ResultBindingInputs { config_hash: 8, ..base },
        ResultBindingInputs { min_ns: 11, ..base },
        ResultBindingInputs { max_ns: 21, ..base },
        ResultBindingInputs { mean_ns: 16, ..base },
        ResultBindingInputs { p99_ns: 20, ..base },
        ResultBindingInputs { timestamp_unix: 1_800_000_001, ..base },
    ];
    for perturbed in perturbations {
        assert_ne!(comparator::result_binding_digest(&perturbed), base_digest);
    }
}

#[test]
fn format_ratio_q16_is_display_only() {
    assert_eq!(comparator::format_ratio_q16(65_536), "1.0000");
    assert_eq!(comparator::format_ratio_q16(131_072), "2.0000");
}
