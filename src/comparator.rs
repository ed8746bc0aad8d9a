//! Comparison gate and Q16.16 ratio arithmetic (C5, §4.5).
//!
//! Two results are only comparable when their output digests match exactly —
//! the "bit-identity gate" is the reason this crate exists. Ratios are
//! persisted as `Q16.16` integers; floating point is permitted only at the
//! human-display boundary (`format_ratio_q16`).

use crate::hasher::{self, DIGEST_LEN};
use crate::model::ResultRecord;

const RESULT_BINDING_MAGIC: &[u8; 12] = b"CB:RESULT:v1";
const PLATFORM_FIELD_LEN: usize = 32;

/// Outcome of gating two results against each other, ready for CLI display.
#[derive(Debug, Clone, Default)]
pub struct CompareReport {
    pub outputs_identical: bool,
    pub comparable: bool,
    pub latency_diff_ns: i64,
    pub latency_ratio_q16: u32,
    pub throughput_diff: i64,
    pub throughput_ratio_q16: u32,
    pub wcet_diff_ns: i64,
    pub wcet_ratio_q16: u32,
}

/// Gate and compare two result records (§4.5). When not comparable, every
/// performance field is zero — not computed, not displayed.
pub fn compare(a: &ResultRecord, b: &ResultRecord) -> CompareReport {
    let outputs_identical = digest_equal_hex(&a.output_hash, &b.output_hash);
    let comparable = outputs_identical;

    if !comparable {
        return CompareReport {
            outputs_identical,
            comparable,
            ..Default::default()
        };
    }

    let latency_diff_ns = signed_delta(a.latency.p99_ns, b.latency.p99_ns);
    let latency_ratio_q16 = q16_ratio(a.latency.p99_ns, b.latency.p99_ns);

    let throughput_diff =
        signed_delta(a.throughput.inferences_per_sec, b.throughput.inferences_per_sec);
    let throughput_ratio_q16 =
        q16_ratio(a.throughput.inferences_per_sec, b.throughput.inferences_per_sec);

    let wcet_diff_ns = signed_delta(a.latency.wcet_bound_ns, b.latency.wcet_bound_ns);
    let wcet_ratio_q16 = q16_ratio(a.latency.wcet_bound_ns, b.latency.wcet_bound_ns);

    CompareReport {
        outputs_identical,
        comparable,
        latency_diff_ns,
        latency_ratio_q16,
        throughput_diff,
        throughput_ratio_q16,
        wcet_diff_ns,
        wcet_ratio_q16,
    }
}

fn digest_equal_hex(a_hex: &str, b_hex: &str) -> bool {
    match (hasher::from_hex(a_hex), hasher::from_hex(b_hex)) {
        (Ok(a), Ok(b)) => hasher::equal(&a, &b),
        _ => false,
    }
}

fn signed_delta(a: u64, b: u64) -> i64 {
    (b as i128 - a as i128).clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// `(b << 16) / a` if `a > 0`, else `0` — division-by-zero collapses the
/// ratio rather than trapping (§8 invariant 9).
fn q16_ratio(a: u64, b: u64) -> u32 {
    if a == 0 {
        return 0;
    }
    let scaled = (b as u128) << 16;
    (scaled / a as u128).min(u32::MAX as u128) as u32
}

/// Render a `Q16.16` value for human display. Decisions, hashes and
/// persisted values must never be derived from the float this produces.
pub fn format_ratio_q16(ratio: u32) -> String {
    format!("{:.4}", ratio as f64 / 65536.0)
}

/// Inputs to the result-binding digest, matching the exact byte layout in
/// §4.5. `config_hash` is an opaque 64-bit commitment the caller derives
/// from the echoed config (e.g. a hash of its serialised form).
#[derive(Clone, Copy)]
pub struct ResultBindingInputs<'a> {
    pub output_hash: &'a [u8; DIGEST_LEN],
    pub platform: &'a str,
    pub config_hash: u64,
    pub min_ns: u64,
    pub max_ns: u64,
    pub mean_ns: u64,
    pub p99_ns: u64,
    pub timestamp_unix: u64,
}

/// `"CB:RESULT:v1"` (12B) || output_hash (32B) || platform padded to 32B ||
/// LE64 config_hash || LE64 min_ns || LE64 max_ns || LE64 mean_ns ||
/// LE64 p99_ns || LE64 timestamp_unix, then SHA-256 over the whole buffer.
pub fn result_binding_digest(inputs: &ResultBindingInputs) -> [u8; DIGEST_LEN] {
    let mut buf = Vec::with_capacity(12 + 32 + 32 + 8 * 6);
    buf.extend_from_slice(RESULT_BINDING_MAGIC);
    buf.extend_from_slice(inputs.output_hash);

    let mut platform_field = [0u8; PLATFORM_FIELD_LEN];
    let platform_bytes = inputs.platform.as_bytes();
    let take = platform_bytes.len().min(PLATFORM_FIELD_LEN);
    platform_field[..take].copy_from_slice(&platform_bytes[..take]);
    buf.extend_from_slice(&platform_field);

    buf.extend_from_slice(&inputs.config_hash.to_le_bytes());
    buf.extend_from_slice(&inputs.min_ns.to_le_bytes());
    buf.extend_from_slice(&inputs.max_ns.to_le_bytes());
    buf.extend_from_slice(&inputs.mean_ns.to_le_bytes());
    buf.extend_from_slice(&inputs.p99_ns.to_le_bytes());
    buf.extend_from_slice(&inputs.timestamp_unix.to_le_bytes());

    hasher::hash(&buf)
}
