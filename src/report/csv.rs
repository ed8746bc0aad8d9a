//! CSV export for result records.
//!
//! A flat column structure with deterministic column order, so results can
//! be diffed and spreadsheet-analysed across runs.

use std::io::Write;
use std::path::Path;

use crate::error::BenchError;
use crate::model::ResultRecord;

pub const CSV_HEADERS: &[&str] = &[
    "schema_version",
    "platform",
    "cpu_model",
    "min_ns",
    "max_ns",
    "mean_ns",
    "p50_ns",
    "p99_ns",
    "stddev_ns",
    "wcet_bound_ns",
    "outlier_count",
    "inferences_per_sec",
    "samples_per_sec",
    "determinism_verified",
    "verification_failures",
    "output_hash",
    "result_hash",
    "thermal_drift",
];

#[derive(Debug, Clone, Default)]
pub struct CsvExporter;

impl CsvExporter {
    pub fn new() -> Self {
        CsvExporter
    }

    pub fn export(&self, records: &[ResultRecord], output: &Path) -> Result<(), BenchError> {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = std::fs::File::create(output)?;
        self.export_to_writer(records, file)
    }

    pub fn export_to_writer<W: Write>(
        &self,
        records: &[ResultRecord],
        writer: W,
    ) -> Result<(), BenchError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer
            .write_record(CSV_HEADERS)
            .map_err(|e| BenchError::Message(format!("failed to write CSV headers: {e}")))?;

        for record in records {
            let row = self.record_to_row(record);
            csv_writer
                .write_record(&row)
                .map_err(|e| BenchError::Message(format!("failed to write CSV row: {e}")))?;
        }

        csv_writer
            .flush()
            .map_err(|e| BenchError::Message(format!("failed to flush CSV writer: {e}")))?;
        Ok(())
    }

    fn record_to_row(&self, record: &ResultRecord) -> Vec<String> {
        let thermal_drift = record
            .environment
            .as_ref()
            .map(|e| e.thermal_drift)
            .unwrap_or(false);

        vec![
            record.schema_version.to_string(),
            record.platform.platform_tag.clone(),
            record.platform.cpu_model.clone(),
            record.latency.min_ns.to_string(),
            record.latency.max_ns.to_string(),
            record.latency.mean_ns.to_string(),
            record.latency.p50_ns.to_string(),
            record.latency.p99_ns.to_string(),
            record.latency.stddev_ns.to_string(),
            record.latency.wcet_bound_ns.to_string(),
            record.latency.mad_outlier_count.to_string(),
            record.throughput.inferences_per_sec.to_string(),
            record.throughput.samples_per_sec.to_string(),
            record.determinism_verified.to_string(),
            record.verification_failures.to_string(),
            record.output_hash.clone(),
            record.result_hash.clone(),
            thermal_drift.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::FaultSet;
    use crate::model::{Config, LatencyStats, PlatformInfo, Throughput, SCHEMA_VERSION};

    fn make_test_record() -> ResultRecord {
        ResultRecord {
            schema_version: SCHEMA_VERSION,
            platform: PlatformInfo {
                platform_tag: "x86_64".to_string(),
                cpu_model: "Test CPU".to_string(),
                cpu_freq_mhz: 3000,
            },
            config: Config::default(),
            latency: LatencyStats {
                min_ns: 100,
                max_ns: 200,
                mean_ns: 150,
                p50_ns: 150,
                p99_ns: 195,
                stddev_ns: 10,
                wcet_bound_ns: 260,
                mad_outlier_count: 0,
                ..Default::default()
            },
            throughput: Throughput {
                inferences_per_sec: 1000,
                samples_per_sec: 1000,
                bytes_per_sec: 0,
                batch_size: 1,
            },
            hw_counters: None,
            environment: None,
            histogram: None,
            determinism_verified: true,
            verification_failures: 0,
            output_hash: "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
                .to_string(),
            result_hash: "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
                .to_string(),
            benchmark_start_ns: 0,
            benchmark_end_ns: 0,
            benchmark_duration_ns: 0,
            wall_clock_unix_secs: 0,
            faults: FaultSet::empty(),
        }
    }

    #[test]
    fn headers_and_row_lengths_match() {
        let exporter = CsvExporter::new();
        let record = make_test_record();
        let row = exporter.record_to_row(&record);
        assert_eq!(row.len(), CSV_HEADERS.len());
    }

    #[test]
    fn export_to_writer_emits_header_and_row() {
        let exporter = CsvExporter::new();
        let record = make_test_record();
        let mut buffer = Vec::new();
        exporter.export_to_writer(&[record], &mut buffer).unwrap();

        let csv_str = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = csv_str.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("schema_version,platform"));
        assert!(lines[1].contains("x86_64"));
    }

    #[test]
    fn export_empty_records_yields_header_only() {
        let exporter = CsvExporter::new();
        let mut buffer = Vec::new();
        exporter.export_to_writer(&[], &mut buffer).unwrap();
        let csv_str = String::from_utf8(buffer).unwrap();
        assert_eq!(csv_str.lines().count(), 1);
    }

    #[test]
    fn export_to_file_creates_parent_dirs() {
        let exporter = CsvExporter::new();
        let dir = tempfile::tempdir().unwrap();
        let output_path = dir.path().join("nested").join("out.csv");
        exporter.export(&[make_test_record()], &output_path).unwrap();
        assert!(output_path.exists());
    }
}
