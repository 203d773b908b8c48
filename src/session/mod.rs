//! Conversion session: the window's view model.
//!
//! # Overview
//!
//! * [`ConversionSession`]: phase, selected file, error message and result
//!   payload, plus the operations that move between phases.
//! * [`SelectedFile`]: metadata of the user's chosen input.
//! * [`SessionError`]: why an operation was refused; its `Display` text is
//!   what the window shows.
//!
//! # Quick start
//!
//! ```rust
//! use json_to_csv::session::{ConversionSession, SelectedFile, SessionPhase};
//!
//! let mut session = ConversionSession::default();
//! session
//!     .select_file(Some(SelectedFile::new("data.json", 120, "application/json")))
//!     .unwrap();
//!
//! let job = session.start_conversion().unwrap();
//! assert_eq!(session.phase(), SessionPhase::Processing);
//!
//! // ...the worker runs `job` and reports back:
//! session.finish_conversion(job.ticket, Ok::<_, String>("id\n1".into()));
//! assert_eq!(session.download_result().unwrap().file_name, "data.csv");
//! ```

pub mod error;
pub mod file;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use error::SessionError;
pub use file::{mime_for_path, SelectedFile, JSON_MIME};
pub use state::{
    ConversionJob, ConversionSession, ConversionTicket, SessionPhase, DEFAULT_MAX_FILE_BYTES,
};
