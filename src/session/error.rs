//! Errors surfaced by [`ConversionSession`](super::ConversionSession).
//!
//! The `Display` text of each variant is exactly what the window shows in its
//! error line, so the session stores `err.to_string()` as the error message.

use thiserror::Error;

use super::state::SessionPhase;

/// Every way a session operation can be refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The candidate file is not reported as `application/json`.
    #[error("Invalid file type. Please upload a .json file.")]
    InvalidType { mime_type: String },

    /// The candidate file is larger than the configured limit.
    #[error("File is too large. Maximum size is {}KB.", .limit_bytes / 1024)]
    TooLarge { size_bytes: u64, limit_bytes: u64 },

    /// Convert was requested before any file was selected.
    #[error("Please select a file to convert.")]
    NoFileSelected,

    /// Download was requested outside the `Complete` phase.
    #[error("No converted result is available to download.")]
    NoResult,

    /// A selection or conversion was requested outside the `Initial` phase.
    #[error("Cannot do that while the session is {phase}.")]
    Busy { phase: SessionPhase },

    /// The conversion backend failed or timed out.
    #[error("Conversion failed: {reason}")]
    ConversionFailed { reason: String },
}
