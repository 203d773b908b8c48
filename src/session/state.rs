//! Conversion session state machine.
//!
//! [`ConversionSession`] is the single source of truth for the window: it
//! owns the selected file, the visible error message, the phase and the
//! converted payload, and it is mutated only through the methods below.
//!
//! ```text
//! Initial ──start_conversion──▶ Processing ──finish_conversion(Ok)──▶ Complete
//!    ▲                              │
//!    └────finish_conversion(Err)────┘
//! any phase ──reset──▶ Initial
//! ```
//!
//! The session never does I/O and never spawns work.  `start_conversion`
//! hands back a [`ConversionJob`]; whoever runs it reports back through
//! [`ConversionSession::finish_conversion`] with the job's ticket.

use std::fmt;

use crate::download::CsvDownload;

use super::error::SessionError;
use super::file::{SelectedFile, JSON_MIME};

/// Default input size limit: 500 KiB.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 500 * 1024;

// ---------------------------------------------------------------------------
// SessionPhase
// ---------------------------------------------------------------------------

/// Which step of the workflow the session is in.  Selects the visible panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Picking a file; the only phase that accepts selection and convert.
    #[default]
    Initial,
    /// A conversion job is in flight.
    Processing,
    /// The result is ready for download.
    Complete,
}

impl SessionPhase {
    /// A short human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::Initial => "Initial",
            SessionPhase::Processing => "Processing",
            SessionPhase::Complete => "Complete",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// ConversionJob
// ---------------------------------------------------------------------------

/// Identifies one conversion request.  Completions carrying any other ticket
/// than the one in flight are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConversionTicket(pub u64);

impl fmt::Display for ConversionTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Work handed out by [`ConversionSession::start_conversion`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub ticket: ConversionTicket,
    pub file: SelectedFile,
}

// ---------------------------------------------------------------------------
// ConversionSession
// ---------------------------------------------------------------------------

/// One user's pass through select → convert → download.
#[derive(Debug, Clone)]
pub struct ConversionSession {
    phase: SessionPhase,
    selected_file: Option<SelectedFile>,
    error_message: Option<String>,
    result_payload: Option<String>,

    max_file_bytes: u64,
    in_flight: Option<ConversionTicket>,
    last_ticket: u64,
}

impl Default for ConversionSession {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_BYTES)
    }
}

impl ConversionSession {
    /// Fresh session that accepts files up to `max_file_bytes`.
    pub fn new(max_file_bytes: u64) -> Self {
        Self {
            phase: SessionPhase::Initial,
            selected_file: None,
            error_message: None,
            result_payload: None,
            max_file_bytes,
            in_flight: None,
            last_ticket: 0,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected_file.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn result_payload(&self) -> Option<&str> {
        self.result_payload.as_deref()
    }

    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_bytes
    }

    /// Ticket of the job currently being waited on, if any.
    pub fn in_flight(&self) -> Option<ConversionTicket> {
        self.in_flight
    }

    // ── Operations ───────────────────────────────────────────────────────

    /// Validate and store `candidate`, or clear the selection when `None`.
    ///
    /// The type check runs before the size check.  A rejected candidate
    /// clears any previous selection and sets the error message.
    pub fn select_file(&mut self, candidate: Option<SelectedFile>) -> Result<(), SessionError> {
        self.require(SessionPhase::Initial)?;

        let Some(file) = candidate else {
            self.selected_file = None;
            self.error_message = None;
            return Ok(());
        };

        if let Err(err) = self.validate(&file) {
            log::debug!("session: rejected {:?}: {err}", file.name);
            self.selected_file = None;
            self.error_message = Some(err.to_string());
            return Err(err);
        }

        log::debug!("session: selected {:?} ({} bytes)", file.name, file.size_bytes);
        self.selected_file = Some(file);
        self.error_message = None;
        Ok(())
    }

    /// Move to `Processing` and hand out the job to run.
    pub fn start_conversion(&mut self) -> Result<ConversionJob, SessionError> {
        self.require(SessionPhase::Initial)?;

        let Some(file) = self.selected_file.clone() else {
            let err = SessionError::NoFileSelected;
            self.error_message = Some(err.to_string());
            return Err(err);
        };

        self.last_ticket += 1;
        let ticket = ConversionTicket(self.last_ticket);

        self.phase = SessionPhase::Processing;
        self.error_message = None;
        self.in_flight = Some(ticket);

        log::debug!("session: Initial → Processing ({ticket} for {:?})", file.name);
        Ok(ConversionJob { ticket, file })
    }

    /// Apply the outcome of the job identified by `ticket`.
    ///
    /// Returns `false` (and changes nothing) when the session is no longer
    /// waiting for that ticket.  A successful, non-empty payload moves the
    /// session to `Complete`; anything else returns it to `Initial` with the
    /// file still selected.
    pub fn finish_conversion<E: fmt::Display>(
        &mut self,
        ticket: ConversionTicket,
        outcome: Result<String, E>,
    ) -> bool {
        if self.phase != SessionPhase::Processing || self.in_flight != Some(ticket) {
            log::debug!("session: ignoring stale completion {ticket}");
            return false;
        }
        self.in_flight = None;

        match outcome {
            Ok(payload) if !payload.is_empty() => {
                log::debug!("session: Processing → Complete ({} bytes)", payload.len());
                self.result_payload = Some(payload);
                self.phase = SessionPhase::Complete;
            }
            Ok(_) => self.fail_conversion("the converter returned no data".into()),
            Err(e) => self.fail_conversion(e.to_string()),
        }
        true
    }

    /// Package the result for saving.
    pub fn download_result(&self) -> Result<CsvDownload, SessionError> {
        if self.phase != SessionPhase::Complete {
            return Err(SessionError::NoResult);
        }
        match (&self.selected_file, &self.result_payload) {
            (Some(file), Some(payload)) => Ok(CsvDownload::new(&file.name, payload)),
            _ => Err(SessionError::NoResult),
        }
    }

    /// Drop everything and go back to `Initial`.  Any job in flight is
    /// abandoned; its completion will be ignored.
    pub fn reset(&mut self) {
        if let Some(ticket) = self.in_flight {
            log::debug!("session: abandoning {ticket}");
        }
        self.phase = SessionPhase::Initial;
        self.selected_file = None;
        self.error_message = None;
        self.result_payload = None;
        self.in_flight = None;
    }

    // ── Helpers ──────────────────────────────────────────────────────────

    fn require(&self, phase: SessionPhase) -> Result<(), SessionError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(SessionError::Busy { phase: self.phase })
        }
    }

    fn validate(&self, file: &SelectedFile) -> Result<(), SessionError> {
        if file.mime_type != JSON_MIME {
            return Err(SessionError::InvalidType {
                mime_type: file.mime_type.clone(),
            });
        }
        if file.size_bytes > self.max_file_bytes {
            return Err(SessionError::TooLarge {
                size_bytes: file.size_bytes,
                limit_bytes: self.max_file_bytes,
            });
        }
        Ok(())
    }

    fn fail_conversion(&mut self, reason: String) {
        let err = SessionError::ConversionFailed { reason };
        log::warn!("session: Processing → Initial: {err}");
        self.phase = SessionPhase::Initial;
        self.error_message = Some(err.to_string());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
