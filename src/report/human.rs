//! Human-readable summary rendering. The only place in the crate where a
//! `Q16.16` ratio is converted to floating point for display (§9 "Integer
//! ratio printing" — convert only at the presentation boundary).

use crate::comparator::{self, CompareReport};
use crate::model::ResultRecord;

fn format_timestamp(unix_secs: u64) -> String {
    time::OffsetDateTime::from_unix_timestamp(unix_secs as i64)
        .ok()
        .and_then(|t| t.format(&time::format_description::well_known::Rfc3339).ok())
        .unwrap_or_default()
}

pub fn render_result(record: &ResultRecord) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "platform: {} ({})\n",
        record.platform.platform_tag, record.platform.cpu_model
    ));
    out.push_str(&format!(
        "collected_at: {}\n",
        format_timestamp(record.wall_clock_unix_secs)
    ));
    out.push_str(&format!(
        "latency (ns): min={} p50={} p99={} max={} mean={} stddev={}\n",
        record.latency.min_ns,
        record.latency.p50_ns,
        record.latency.p99_ns,
        record.latency.max_ns,
        record.latency.mean_ns,
        record.latency.stddev_ns
    ));
    out.push_str(&format!(
        "wcet: observed={} bound={}\n",
        record.latency.wcet_observed_ns, record.latency.wcet_bound_ns
    ));
    out.push_str(&format!(
        "throughput: {} inferences/sec, {} samples/sec\n",
        record.throughput.inferences_per_sec, record.throughput.samples_per_sec
    ));
    out.push_str(&format!(
        "output_hash: {}\nresult_hash: {}\n",
        record.output_hash, record.result_hash
    ));
    out.push_str(&format!(
        "valid: {} (verification_failures={}, faults={:?})\n",
        record.is_valid(),
        record.verification_failures,
        record.faults
    ));
    out
}

pub fn render_comparison(report: &CompareReport) -> String {
    if !report.comparable {
        return "not comparable: output hashes differ\n".to_string();
    }
    format!(
        "comparable: yes\nlatency: {:+} ns (x{})\nthroughput: {:+} inferences/sec (x{})\nwcet: {:+} ns (x{})\n",
        report.latency_diff_ns,
        comparator::format_ratio_q16(report.latency_ratio_q16),
        report.throughput_diff,
        comparator::format_ratio_q16(report.throughput_ratio_q16),
        report.wcet_diff_ns,
        comparator::format_ratio_q16(report.wcet_ratio_q16),
    )
}
