//! Golden reference loader (§6 "Golden reference format").
//!
//! A small TOML document: `version`, `format`, `output_hash` (mandatory),
//! and optional `sample_count`/`output_size`/`platform`. Malformed input maps
//! to `BenchError::GoldenLoad`; missing optional fields are tolerated.

use std::fs;
use std::path::Path;

use crate::error::{BenchError, BenchResult};
use crate::hasher;
use crate::model::GoldenReference;

pub fn load(path: &Path) -> BenchResult<GoldenReference> {
    let raw = fs::read_to_string(path)
        .map_err(|e| BenchError::GoldenLoad(format!("{}: {e}", path.display())))?;
    parse(&raw)
}

pub fn parse(raw: &str) -> BenchResult<GoldenReference> {
    let golden: GoldenReference =
        toml::from_str(raw).map_err(|e| BenchError::GoldenLoad(e.to_string()))?;

    if golden.output_hash.is_empty() {
        return Err(BenchError::GoldenLoad(
            "output_hash is mandatory".to_string(),
        ));
    }
    hasher::from_hex(&golden.output_hash)
        .map_err(|_| BenchError::GoldenLoad("output_hash is not valid hex".to_string()))?;

    Ok(golden)
}

pub fn save(path: &Path, golden: &GoldenReference) -> BenchResult<()> {
    let raw = toml::to_string_pretty(golden)
        .map_err(|e| BenchError::GoldenLoad(e.to_string()))?;
    fs::write(path, raw)?;
    Ok(())
}

/// Gate a run's digest against a golden reference, matching `equal`'s
/// constant-time comparison.
pub fn verify(golden: &GoldenReference, output_hash_hex: &str) -> BenchResult<bool> {
    let expected = hasher::from_hex(&golden.output_hash)?;
    let actual = hasher::from_hex(output_hash_hex)?;
    Ok(hasher::equal(&expected, &actual))
}
