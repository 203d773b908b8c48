//! Application entry point: JSON to CSV converter.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (on first run, write the defaults out).
//! 3. Create the [`tokio`] runtime.
//! 4. Build the conversion backend from config.
//! 5. Create worker channels (`command`, `event`).
//! 6. Spawn the conversion worker on the tokio runtime.
//! 7. Run [`eframe::run_native`]: blocks the main thread until the window
//!    is closed.

use std::sync::Arc;

use eframe::egui;
use tokio::sync::mpsc;

use json_to_csv::{
    app::ConverterApp,
    config::{AppConfig, AppPaths},
    convert::{ConversionBackend, ConversionWorker, ConvertCommand, ConvertEvent, SimulatedBackend},
};

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let (width, height) = config.ui.window_size;
    let mut vp = egui::ViewportBuilder::default()
        .with_title("JSON to CSV Converter")
        .with_inner_size([width, height])
        .with_min_inner_size([360.0, 320.0])
        .with_drag_and_drop(true);

    if config.ui.always_on_top {
        vp = vp.with_always_on_top();
    }

    if let Some((x, y)) = config.ui.window_position {
        vp = vp.with_position(egui::pos2(x, y));
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("JSON to CSV converter starting up");

    // 2. Configuration
    let first_run = !AppPaths::new().settings_file.exists();
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    if first_run {
        match config.save() {
            Ok(()) => log::info!("wrote default settings"),
            Err(e) => log::warn!("Failed to write default settings: {e}"),
        }
    }

    // 3. Tokio runtime (one worker is plenty for a single job at a time)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("convert-worker")
        .enable_all()
        .build()?;

    // 4. Backend
    let backend: Arc<dyn ConversionBackend> =
        Arc::new(SimulatedBackend::from_config(&config.conversion));

    // 5. Channel setup
    let (command_tx, command_rx) = mpsc::channel::<ConvertCommand>(8);
    let (event_tx, event_rx) = mpsc::channel::<ConvertEvent>(8);

    // 6. Worker
    let worker = ConversionWorker::from_config(backend, &config.conversion);
    rt.spawn(worker.run(command_rx, event_tx));

    // 7. Window (blocks until closed)
    let app = ConverterApp::new(command_tx, event_rx, config.clone());
    let options = native_options(&config);

    eframe::run_native(
        "JSON to CSV Converter",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("window error: {e}"))?;

    log::info!("JSON to CSV converter shut down");
    Ok(())
}
