//! JSON to CSV converter: desktop window plus the session logic behind it.
//!
//! * [`session`]: the select → convert → download state machine.
//! * [`convert`]: conversion backend trait, the simulated backend and the
//!   worker that runs jobs on tokio.
//! * [`download`]: output naming and saving.
//! * [`config`]: `settings.toml` and platform paths.
//! * [`app`]: the egui window.

pub mod app;
pub mod config;
pub mod convert;
pub mod download;
pub mod session;
