//! Error taxonomy for the benchmark engine (§7 of the design).
//!
//! Core modules (`timer`, `hasher`, `stats`, `runner`, `comparator`) return the
//! specific typed variants below and never construct `Message`/`Anyhow` — those
//! two are reserved for CLI glue and report/golden I/O.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    /// Required argument missing.
    #[error("null pointer / missing required argument: {0}")]
    NullPtr(String),

    /// `measure_iterations=0`, `batch_size=0`, buffer too small, bad histogram
    /// range, update on a finalised hasher context, etc.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The underlying clock could not be initialised.
    #[error("timer initialisation failed: {0}")]
    TimerInit(String),

    /// A clock read failed during the measurement loop.
    #[error("timer read failed: {0}")]
    TimerRead(String),

    /// An accumulator or the WCET bound saturated.
    #[error("integer overflow in {0}")]
    Overflow(String),

    /// Statistics were requested over zero samples.
    #[error("division by zero: {0}")]
    DivZero(String),

    /// The inference routine returned failure, or its output failed golden
    /// verification.
    #[error("verification failed: {0}")]
    VerifyFail(String),

    /// An optional hardware-counter probe failed.
    #[error("hardware counter read failed: {0}")]
    HwCounters(String),

    /// An optional environmental probe failed.
    #[error("environment read failed: {0}")]
    EnvRead(String),

    /// The golden reference file was missing or malformed.
    #[error("failed to load golden reference: {0}")]
    GoldenLoad(String),

    /// A file I/O operation failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// A caller-provided buffer was smaller than required.
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// CLI / glue-level string error, not part of the core's typed surface.
    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type BenchResult<T> = Result<T, BenchError>;

impl From<std::io::Error> for BenchError {
    fn from(e: std::io::Error) -> Self {
        BenchError::Io(e.to_string())
    }
}
