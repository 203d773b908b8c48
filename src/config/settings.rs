//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//! Missing keys fall back to their defaults, so a hand-edited file only needs
//! the values it changes.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// ConversionConfig
// ---------------------------------------------------------------------------

/// Input limits and conversion backend timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Largest accepted input file, in bytes (500 KiB).
    pub max_file_bytes: u64,
    /// How long the simulated backend "works" before answering.
    pub processing_delay_ms: u64,
    /// Upper bound on a single conversion job before it is reported as
    /// timed out.
    pub timeout_secs: u64,
}

impl ConversionConfig {
    /// Raise `timeout_secs` when it would expire before the simulated delay
    /// is over.  Returns `true` when the value was changed.
    pub fn clamp_timeout(&mut self) -> bool {
        let min_secs = self.processing_delay_ms / 1_000 + 1;
        if self.timeout_secs >= min_secs {
            return false;
        }
        log::warn!(
            "conversion.timeout_secs = {} does not outlast processing_delay_ms = {}; using {min_secs}",
            self.timeout_secs,
            self.processing_delay_ms
        );
        self.timeout_secs = min_secs;
        true
    }
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 512_000,
            processing_delay_ms: 3_000,
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// OutputConfig
// ---------------------------------------------------------------------------

/// Where converted CSV files are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Destination directory.  `None` means the platform Downloads folder.
    pub directory: Option<PathBuf>,
    /// Show a native save dialog instead of writing straight into
    /// `directory`.
    pub ask_for_location: bool,
}

impl OutputConfig {
    /// Directory that downloads land in when no dialog is shown.
    pub fn resolved_directory(&self) -> PathBuf {
        self.directory
            .clone()
            .unwrap_or_else(|| AppPaths::new().download_dir)
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// eframe window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Initial inner window size `(width, height)` in points.
    pub window_size: (f32, f32),
    /// Last saved window position `(x, y)` in screen pixels.  `None` lets the
    /// window manager pick.
    pub window_position: Option<(f32, f32)>,
    /// Keep the window above all other windows.
    pub always_on_top: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_size: (480.0, 420.0),
            window_position: None,
            always_on_top: false,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use json_to_csv::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Write it back (e.g. defaults on first run)
/// config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Input validation and backend settings.
    pub conversion: ConversionConfig,
    /// Download destination settings.
    pub output: OutputConfig,
    /// Window settings.
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.conversion.clamp_timeout();
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
