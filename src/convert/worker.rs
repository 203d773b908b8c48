//! Conversion worker: runs jobs handed out by the session off the UI thread.
//!
//! [`ConversionWorker`] listens for [`ConvertCommand`]s on a
//! `tokio::sync::mpsc` channel and reports each finished job as a
//! [`ConvertEvent`].
//!
//! # Job flow
//!
//! ```text
//! ConvertCommand::Start(job)
//!   └─▶ cancel previous job (if any)
//!   └─▶ spawn: timeout(backend.convert(file))
//!         ├─ Ok / Err      → ConvertEvent::Finished { ticket, outcome }
//!         ├─ elapsed       → Finished { outcome: Err(Timeout) }
//!         └─ cancelled     → nothing is sent
//!
//! ConvertCommand::Cancel
//!   └─▶ cancel the job in flight
//! ```
//!
//! At most one job is in flight.  When the command channel closes the
//! in-flight job is cancelled and [`run`](ConversionWorker::run) returns.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::ConversionConfig;
use crate::session::{ConversionJob, ConversionTicket};

use super::backend::{ConversionBackend, ConvertError};

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Commands sent from the UI thread to the worker.
#[derive(Debug, Clone)]
pub enum ConvertCommand {
    /// Run this job, superseding any job still in flight.
    Start(ConversionJob),
    /// Abandon the job in flight.
    Cancel,
}

/// Events delivered from the worker to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertEvent {
    /// The job identified by `ticket` has an outcome.
    Finished {
        ticket: ConversionTicket,
        outcome: Result<String, ConvertError>,
    },
}

// ---------------------------------------------------------------------------
// ConversionWorker
// ---------------------------------------------------------------------------

/// Drives conversion jobs on the tokio runtime.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use tokio::sync::mpsc;
/// use json_to_csv::config::ConversionConfig;
/// use json_to_csv::convert::{ConversionWorker, SimulatedBackend};
///
/// # async fn example() {
/// let config = ConversionConfig::default();
/// let worker = ConversionWorker::from_config(
///     Arc::new(SimulatedBackend::from_config(&config)),
///     &config,
/// );
///
/// let (command_tx, command_rx) = mpsc::channel(8);
/// let (event_tx, event_rx) = mpsc::channel(8);
/// tokio::spawn(worker.run(command_rx, event_tx));
/// # let _ = (command_tx, event_rx);
/// # }
/// ```
pub struct ConversionWorker {
    backend: Arc<dyn ConversionBackend>,
    timeout: Duration,
}

impl ConversionWorker {
    pub fn new(backend: Arc<dyn ConversionBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    /// Build with the timeout from the `[conversion]` settings.
    pub fn from_config(backend: Arc<dyn ConversionBackend>, config: &ConversionConfig) -> Self {
        Self::new(backend, Duration::from_secs(config.timeout_secs))
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run until `command_rx` is closed.
    pub async fn run(
        self,
        mut command_rx: mpsc::Receiver<ConvertCommand>,
        event_tx: mpsc::Sender<ConvertEvent>,
    ) {
        let mut current: Option<(ConversionTicket, CancellationToken)> = None;

        while let Some(command) = command_rx.recv().await {
            match command {
                ConvertCommand::Start(job) => {
                    if let Some((ticket, token)) = current.take() {
                        log::debug!("worker: {} supersedes {ticket}", job.ticket);
                        token.cancel();
                    }

                    let token = CancellationToken::new();
                    current = Some((job.ticket, token.clone()));

                    log::debug!("worker: starting {} for {:?}", job.ticket, job.file.name);
                    tokio::spawn(run_job(
                        Arc::clone(&self.backend),
                        self.timeout,
                        job,
                        token,
                        event_tx.clone(),
                    ));
                }
                ConvertCommand::Cancel => {
                    if let Some((ticket, token)) = current.take() {
                        log::debug!("worker: cancelling {ticket}");
                        token.cancel();
                    }
                }
            }
        }

        if let Some((_, token)) = current.take() {
            token.cancel();
        }
        log::info!("worker: command channel closed, shutting down");
    }
}

/// Run one job to completion, timeout or cancellation.
async fn run_job(
    backend: Arc<dyn ConversionBackend>,
    timeout: Duration,
    job: ConversionJob,
    token: CancellationToken,
    event_tx: mpsc::Sender<ConvertEvent>,
) {
    let ConversionJob { ticket, file } = job;

    let mut handle = tokio::spawn(async move { backend.convert(&file).await });

    let outcome = tokio::select! {
        _ = token.cancelled() => {
            handle.abort();
            log::debug!("worker: {ticket} cancelled");
            return;
        }
        joined = tokio::time::timeout(timeout, &mut handle) => match joined {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(ConvertError::Backend(format!("conversion task failed: {e}"))),
            Err(_) => {
                handle.abort();
                log::warn!("worker: {ticket} timed out after {timeout:?}");
                Err(ConvertError::Timeout(timeout))
            }
        },
    };

    if token.is_cancelled() {
        return;
    }

    if let Err(e) = &outcome {
        log::warn!("worker: {ticket} failed: {e}");
    }

    if event_tx
        .send(ConvertEvent::Finished { ticket, outcome })
        .await
        .is_err()
    {
        log::warn!("worker: event channel closed, dropping result of {ticket}");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
