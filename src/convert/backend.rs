//! Conversion backend trait and the simulated implementation.
//!
//! # Overview
//!
//! [`ConversionBackend`] is the seam between the window and whatever turns a
//! JSON file into CSV.  It is object-safe and `Send + Sync` so it can be held
//! behind an `Arc<dyn ConversionBackend>` by the worker.
//!
//! [`SimulatedBackend`] never looks at the file: it waits for the configured
//! delay and answers with [`SAMPLE_CSV`].
//!
//! [`MockBackend`] (available under `#[cfg(test)]`) returns a pre-configured
//! outcome after an optional delay.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ConversionConfig;
use crate::session::SelectedFile;

/// The fixed result produced by [`SimulatedBackend`].
pub const SAMPLE_CSV: &str = "id,name,value\n1,itemA,100\n2,itemB,200\n3,itemC,300";

// ---------------------------------------------------------------------------
// ConvertError
// ---------------------------------------------------------------------------

/// All errors that can come back from a conversion job.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// The backend did not answer within the configured timeout.
    #[error("timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),

    /// The backend reported a failure.
    #[error("{0}")]
    Backend(String),
}

// ---------------------------------------------------------------------------
// ConversionBackend trait
// ---------------------------------------------------------------------------

/// Turns a selected JSON file into CSV text.
///
/// # Contract
///
/// - Must be cancel-safe: the worker drops the future when a job is
///   cancelled or times out.
/// - An `Ok` payload is the complete CSV document.
#[async_trait]
pub trait ConversionBackend: Send + Sync {
    async fn convert(&self, file: &SelectedFile) -> Result<String, ConvertError>;
}

// Compile-time assertion: Box<dyn ConversionBackend> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn ConversionBackend>) {}
};

// ---------------------------------------------------------------------------
// SimulatedBackend
// ---------------------------------------------------------------------------

/// Stand-in backend: a fixed delay followed by [`SAMPLE_CSV`].
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    delay: Duration,
}

impl SimulatedBackend {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Build from the `[conversion]` settings.
    pub fn from_config(config: &ConversionConfig) -> Self {
        Self::new(Duration::from_millis(config.processing_delay_ms))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::from_config(&ConversionConfig::default())
    }
}

#[async_trait]
impl ConversionBackend for SimulatedBackend {
    async fn convert(&self, file: &SelectedFile) -> Result<String, ConvertError> {
        log::info!(
            "simulating conversion of {:?} ({} bytes, {:?})",
            file.name,
            file.size_bytes,
            self.delay
        );
        tokio::time::sleep(self.delay).await;
        log::info!("simulated conversion of {:?} complete", file.name);
        Ok(SAMPLE_CSV.to_string())
    }
}

// ---------------------------------------------------------------------------
// MockBackend (test only)
// ---------------------------------------------------------------------------

/// Test double that returns a canned outcome.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct MockBackend {
    outcome: Result<String, ConvertError>,
    delay: Duration,
}

#[cfg(test)]
impl MockBackend {
    pub fn ok(csv: &str) -> Self {
        Self {
            outcome: Ok(csv.to_string()),
            delay: Duration::ZERO,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(ConvertError::Backend(message.to_string())),
            delay: Duration::ZERO,
        }
    }

    /// Delay the answer by `delay`.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[cfg(test)]
#[async_trait]
impl ConversionBackend for MockBackend {
    async fn convert(&self, _file: &SelectedFile) -> Result<String, ConvertError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.outcome.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
