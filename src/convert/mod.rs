//! Conversion backend and the worker that runs it.
//!
//! # Architecture
//!
//! ```text
//! ConverterApp ──ConvertCommand──▶ ConversionWorker::run()   (tokio task)
//!      ▲                                  │
//!      │                                  ├─ spawn job (CancellationToken)
//!      │                                  │     └─ timeout(ConversionBackend::convert)
//!      └─────────ConvertEvent─────────────┘
//! ```
//!
//! The backend behind the worker is [`SimulatedBackend`] unless something
//! else implementing [`ConversionBackend`] is plugged in.

pub mod backend;
pub mod worker;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use backend::{ConversionBackend, ConvertError, SimulatedBackend, SAMPLE_CSV};
pub use worker::{ConversionWorker, ConvertCommand, ConvertEvent};

#[cfg(test)]
pub use backend::MockBackend;
