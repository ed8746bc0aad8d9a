//! JSON report serialisation. Two serialisations of the same record must be
//! byte-identical (§6, §8 invariant 12) — `serde_json` gives us that for
//! free as long as field order in the struct definition is stable.

use crate::error::{BenchError, BenchResult};
use crate::model::ResultRecord;

pub fn to_string_pretty(record: &ResultRecord) -> BenchResult<String> {
    serde_json::to_string_pretty(record).map_err(|e| BenchError::Message(e.to_string()))
}

pub fn to_string(record: &ResultRecord) -> BenchResult<String> {
    serde_json::to_string(record).map_err(|e| BenchError::Message(e.to_string()))
}

pub fn from_str(raw: &str) -> BenchResult<ResultRecord> {
    serde_json::from_str(raw).map_err(|e| BenchError::Message(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::FaultSet;
    use crate::model::{Config, LatencyStats, PlatformInfo, Throughput, SCHEMA_VERSION};

    fn sample_record() -> ResultRecord {
        ResultRecord {
            schema_version: SCHEMA_VERSION,
            platform: PlatformInfo::default(),
            config: Config::default(),
            latency: LatencyStats::default(),
            throughput: Throughput::default(),
            hw_counters: None,
            environment: None,
            histogram: None,
            determinism_verified: true,
            verification_failures: 0,
            output_hash: "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
                .to_string(),
            result_hash: String::new(),
            benchmark_start_ns: 0,
            benchmark_end_ns: 0,
            benchmark_duration_ns: 0,
            wall_clock_unix_secs: 0,
            faults: FaultSet::empty(),
        }
    }

    #[test]
    fn serialising_twice_is_byte_identical() {
        let record = sample_record();
        assert_eq!(to_string(&record).unwrap(), to_string(&record).unwrap());
    }

    #[test]
    fn round_trips_through_json() {
        let record = sample_record();
        let raw = to_string(&record).unwrap();
        let parsed = from_str(&raw).unwrap();
        assert_eq!(parsed.output_hash, record.output_hash);
        assert_eq!(parsed.schema_version, record.schema_version);
    }

    #[test]
    fn hash_fields_serialise_as_64_lowercase_hex_chars() {
        let record = sample_record();
        let raw = to_string_pretty(&record).unwrap();
        assert!(raw.contains(&record.output_hash));
        assert_eq!(record.output_hash.len(), 64);
        assert!(record.output_hash.chars().all(|c| !c.is_ascii_uppercase()));
    }
}
