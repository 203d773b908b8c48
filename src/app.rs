//! JSON to CSV converter window: egui/eframe application.
//!
//! # Architecture
//!
//! [`ConverterApp`] is the top-level [`eframe::App`].  It owns the
//! [`ConversionSession`] and two channel endpoints:
//!
//! * `command_tx`: sends [`ConvertCommand`] to the conversion worker.
//! * `event_rx`: receives [`ConvertEvent`] from the worker.
//!
//! The session is only touched from the egui update loop, so it needs no
//! locking.  Exactly one panel is drawn per frame, chosen by the phase.
//!
//! # Panels
//!
//! | Phase | Visual |
//! |-------|--------|
//! | `Initial` | Title, upload button / drop zone, selected file, error, Convert |
//! | `Processing` | Spinner + "Processing..." |
//! | `Complete` | "Conversion Complete!", Download CSV, Analyze, start over |

use std::path::{Path, PathBuf};
use std::time::Duration;

use eframe::egui;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::convert::{ConvertCommand, ConvertEvent};
use crate::download::DownloadError;
use crate::session::{ConversionSession, SelectedFile, SessionError, SessionPhase};

const ACCENT: egui::Color32 = egui::Color32::from_rgb(79, 70, 229);
const MUTED: egui::Color32 = egui::Color32::from_rgb(100, 116, 139);
const ERROR: egui::Color32 = egui::Color32::from_rgb(220, 38, 38);
const SUCCESS: egui::Color32 = egui::Color32::from_rgb(34, 197, 94);

// ---------------------------------------------------------------------------
// SaveError
// ---------------------------------------------------------------------------

/// Why "Download CSV" did not produce a file.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Download(#[from] DownloadError),
}

// ---------------------------------------------------------------------------
// Notice
// ---------------------------------------------------------------------------

/// One-off line under the panel that is not a session error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Informational, drawn muted.
    Info(String),
    /// Something the user asked for failed, drawn in red.
    Failure(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Self::Info(text) | Self::Failure(text) => text,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    fn color(&self) -> egui::Color32 {
        if self.is_failure() {
            ERROR
        } else {
            MUTED
        }
    }
}

// ---------------------------------------------------------------------------
// ConverterApp
// ---------------------------------------------------------------------------

/// eframe application: the converter window.
pub struct ConverterApp {
    // ── Session ──────────────────────────────────────────────────────────
    /// Phase, selected file, error and result.
    pub session: ConversionSession,

    // ── Transient feedback ───────────────────────────────────────────────
    /// One-off message that is not a session error (unreadable file, save
    /// result, "coming soon").  Cleared whenever the phase changes.
    notice: Option<Notice>,
    /// Where the last download was written.
    saved_to: Option<PathBuf>,

    // ── Channels ─────────────────────────────────────────────────────────
    /// Send commands to the conversion worker.
    pub command_tx: mpsc::Sender<ConvertCommand>,
    /// Receive job outcomes from the conversion worker.
    pub event_rx: mpsc::Receiver<ConvertEvent>,

    // ── Configuration ────────────────────────────────────────────────────
    /// Application configuration (read-only after startup).
    pub config: AppConfig,
}

impl ConverterApp {
    /// Create a new [`ConverterApp`].
    ///
    /// * `command_tx`: sender end of the worker command channel.
    /// * `event_rx`: receiver end of the worker event channel.
    /// * `config`: loaded application configuration.
    pub fn new(
        command_tx: mpsc::Sender<ConvertCommand>,
        event_rx: mpsc::Receiver<ConvertEvent>,
        config: AppConfig,
    ) -> Self {
        Self {
            session: ConversionSession::new(config.conversion.max_file_bytes),
            notice: None,
            saved_to: None,
            command_tx,
            event_rx,
            config,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn saved_to(&self) -> Option<&Path> {
        self.saved_to.as_deref()
    }

    // ── Actions ──────────────────────────────────────────────────────────

    /// Select the file at `path` (from the open dialog or a drop).
    pub fn choose_path(&mut self, path: &Path) {
        match SelectedFile::from_path(path) {
            Ok(file) => self.choose_file(Some(file)),
            Err(e) => {
                log::warn!("cannot read {}: {e}", path.display());
                let _ = self.session.select_file(None);
                self.notice = Some(Notice::Failure(format!(
                    "Cannot open {}: {e}",
                    path.display()
                )));
            }
        }
    }

    /// Hand a candidate (or `None`) to the session.  Refusals end up in the
    /// session's error message, so the result is only logged.
    pub fn choose_file(&mut self, candidate: Option<SelectedFile>) {
        self.notice = None;
        if let Err(e) = self.session.select_file(candidate) {
            log::info!("file rejected: {e}");
        }
    }

    /// Start converting the selected file.
    pub fn convert(&mut self) {
        self.notice = None;
        let job = match self.session.start_conversion() {
            Ok(job) => job,
            Err(e) => {
                log::info!("convert refused: {e}");
                return;
            }
        };

        let ticket = job.ticket;
        if let Err(e) = self.command_tx.try_send(ConvertCommand::Start(job)) {
            log::error!("conversion worker unavailable: {e}");
            self.session
                .finish_conversion(ticket, Err::<String, _>("the conversion worker is not running"));
        }
    }

    /// Drain all pending worker events (non-blocking).
    pub fn poll_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                ConvertEvent::Finished { ticket, outcome } => {
                    if self.session.finish_conversion(ticket, outcome) {
                        self.notice = None;
                        self.saved_to = None;
                    }
                }
            }
        }
    }

    /// Save the result into `dir`.
    pub fn download_into(&mut self, dir: &Path) -> Result<PathBuf, SaveError> {
        let download = self.session.download_result()?;
        let path = download.save_in(dir)?;
        self.saved_to = Some(path.clone());
        Ok(path)
    }

    /// Save the result to exactly `path`.
    pub fn download_to(&mut self, path: &Path) -> Result<PathBuf, SaveError> {
        let download = self.session.download_result()?;
        let path = download.save_to(path)?;
        self.saved_to = Some(path.clone());
        Ok(path)
    }

    /// "Analyze Results" is a placeholder.
    pub fn analyze(&mut self) {
        self.notice = Some(Notice::Info("Analysis feature coming soon!".into()));
    }

    /// Reset to a fresh session, abandoning any job in flight.
    pub fn start_over(&mut self) {
        if self.session.in_flight().is_some() {
            let _ = self.command_tx.try_send(ConvertCommand::Cancel);
        }
        self.session.reset();
        self.notice = None;
        self.saved_to = None;
    }

    // ── Dialog-backed actions (UI only) ──────────────────────────────────

    fn open_file_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .set_title("Choose a JSON file")
            .add_filter("JSON", &["json"])
            .pick_file()
        {
            self.choose_path(&path);
        }
    }

    fn download_clicked(&mut self) {
        let result = if self.config.output.ask_for_location {
            let file_name = match self.session.download_result() {
                Ok(dl) => dl.file_name,
                Err(e) => {
                    self.notice = Some(Notice::Failure(e.to_string()));
                    return;
                }
            };
            let Some(path) = rfd::FileDialog::new()
                .set_title("Save CSV")
                .set_directory(self.config.output.resolved_directory())
                .set_file_name(file_name.as_str())
                .add_filter("CSV", &["csv"])
                .save_file()
            else {
                return;
            };
            self.download_to(&path)
        } else {
            let dir = self.config.output.resolved_directory();
            self.download_into(&dir)
        };

        match result {
            Ok(_) => self.notice = None,
            Err(e) => {
                log::error!("download failed: {e}");
                self.notice = Some(Notice::Failure(e.to_string()));
            }
        }
    }

    /// Pick up files dropped onto the window.  Only the first one counts.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let Some(first) = dropped.into_iter().next() else {
            return;
        };
        if self.session.phase() != SessionPhase::Initial {
            return;
        }

        if let Some(path) = first.path.as_deref() {
            self.choose_path(path);
        } else if let Some(bytes) = first.bytes.as_ref() {
            self.choose_file(Some(SelectedFile::new(
                first.name.clone(),
                bytes.len() as u64,
                first.mime.clone(),
            )));
        }
    }

    // ── Panel renderers ──────────────────────────────────────────────────

    /// Render the Initial panel: upload form.
    fn draw_initial(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.vertical_centered(|ui| {
            ui.add_space(8.0);
            ui.label(
                egui::RichText::new("JSON to CSV Converter")
                    .size(22.0)
                    .strong(),
            );
            ui.label(
                egui::RichText::new(
                    "Upload your .json file to convert it into a downloadable CSV.",
                )
                .color(MUTED),
            );
        });

        ui.add_space(16.0);
        self.draw_drop_zone(ui, ctx);
        ui.add_space(12.0);

        ui.vertical_centered(|ui| {
            if let Some(file) = self.session.selected_file() {
                ui.label(
                    egui::RichText::new(format!("Selected: {}", file.name)).color(MUTED),
                );
            }
            if let Some(err) = self.session.error_message() {
                ui.label(egui::RichText::new(err).color(ERROR));
            }
            if let Some(notice) = &self.notice {
                ui.label(egui::RichText::new(notice.text()).color(notice.color()));
            }
        });

        ui.add_space(12.0);
        let can_convert = self.session.selected_file().is_some();
        let button = egui::Button::new(egui::RichText::new("Convert").color(egui::Color32::WHITE))
            .fill(ACCENT)
            .min_size(egui::vec2(ui.available_width(), 36.0));
        if ui.add_enabled(can_convert, button).clicked() {
            self.convert();
        }
    }

    /// Dashed-looking drop target with the upload button inside.
    fn draw_drop_zone(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let hovering = ctx.input(|i| !i.raw.hovered_files.is_empty());
        let stroke_color = if hovering { ACCENT } else { MUTED };

        egui::Frame::new()
            .stroke(egui::Stroke::new(1.5, stroke_color))
            .corner_radius(egui::CornerRadius::same(6))
            .inner_margin(egui::Margin::same(16))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.vertical_centered(|ui| {
                    ui.horizontal(|ui| {
                        if ui
                            .add(egui::Button::new(
                                egui::RichText::new("Upload a file").color(ACCENT),
                            ))
                            .clicked()
                        {
                            self.open_file_dialog();
                        }
                        ui.label("or drag and drop");
                    });
                    let limit_kb = self.session.max_file_bytes() / 1024;
                    ui.label(
                        egui::RichText::new(format!("JSON up to {limit_kb}KB"))
                            .size(11.0)
                            .color(MUTED),
                    );
                });
            });
    }

    /// Render the Processing panel: spinner + label.  No controls.
    fn draw_processing(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(48.0);
            ui.add(egui::Spinner::new().size(48.0).color(ACCENT));
            ui.add_space(16.0);
            ui.label(egui::RichText::new("Processing...").size(18.0).strong());
            ui.label(
                egui::RichText::new("Your file is being converted. Please wait.").color(MUTED),
            );
        });
    }

    /// Render the Complete panel: download, analyze and start over.
    fn draw_complete(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(24.0);
            ui.label(egui::RichText::new("✔").size(40.0).color(SUCCESS));
            ui.label(
                egui::RichText::new("Conversion Complete!")
                    .size(22.0)
                    .strong(),
            );
            ui.label(egui::RichText::new("Your CSV file is ready for download.").color(MUTED));
            ui.add_space(20.0);

            let width = ui.available_width();
            let download = egui::Button::new(
                egui::RichText::new("Download CSV").color(egui::Color32::WHITE),
            )
            .fill(ACCENT)
            .min_size(egui::vec2(width, 36.0));
            if ui.add(download).clicked() {
                self.download_clicked();
            }

            ui.add_space(8.0);
            if ui
                .add(egui::Button::new("Analyze Results").min_size(egui::vec2(width, 36.0)))
                .clicked()
            {
                self.analyze();
            }

            ui.add_space(12.0);
            if ui
                .add(
                    egui::Button::new(egui::RichText::new("Convert another file?").color(ACCENT))
                        .frame(false),
                )
                .clicked()
            {
                self.start_over();
                return;
            }

            if let Some(path) = &self.saved_to {
                ui.add_space(8.0);
                ui.label(
                    egui::RichText::new(format!("Saved to {}", path.display()))
                        .size(11.0)
                        .color(MUTED),
                );
            }
            if let Some(notice) = &self.notice {
                ui.add_space(4.0);
                ui.label(egui::RichText::new(notice.text()).color(notice.color()));
            }
        });
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for ConverterApp {
    /// Called every frame by eframe.  Polls the worker, then renders the
    /// panel for the current phase.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_events();
        self.handle_dropped_files(ctx);

        if self.session.phase() == SessionPhase::Processing {
            // ~15 fps keeps the spinner alive and picks up the completion.
            ctx.request_repaint_after(Duration::from_millis(66));
        }

        let frame = egui::Frame::new()
            .fill(egui::Color32::from_rgb(248, 250, 252))
            .inner_margin(egui::Margin::same(24));

        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            match self.session.phase() {
                SessionPhase::Initial => self.draw_initial(ui, ctx),
                SessionPhase::Processing => self.draw_processing(ui),
                SessionPhase::Complete => self.draw_complete(ui),
            }
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        let _ = self.command_tx.try_send(ConvertCommand::Cancel);
        log::info!("converter window closing");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::convert::{ConversionWorker, SimulatedBackend, SAMPLE_CSV};
    use tempfile::tempdir;

    fn app_with_channels() -> (
        ConverterApp,
        mpsc::Receiver<ConvertCommand>,
        mpsc::Sender<ConvertEvent>,
    ) {
        let (command_tx, command_rx) = mpsc::channel(8);
        let (event_tx, event_rx) = mpsc::channel(8);
        let app = ConverterApp::new(command_tx, event_rx, AppConfig::default());
        (app, command_rx, event_tx)
    }

    fn write_json(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, br#"[{"id":1,"name":"itemA"}]"#).expect("write");
        path
    }

    #[test]
    fn choosing_a_json_path_selects_it() {
        let dir = tempdir().expect("temp dir");
        let (mut app, _rx, _tx) = app_with_channels();

        app.choose_path(&write_json(dir.path(), "data.json"));

        assert_eq!(
            app.session.selected_file().map(|f| f.name.as_str()),
            Some("data.json")
        );
        assert!(app.session.error_message().is_none());
    }

    #[test]
    fn choosing_a_text_file_shows_type_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").expect("write");
        let (mut app, _rx, _tx) = app_with_channels();

        app.choose_path(&path);

        assert!(app.session.selected_file().is_none());
        assert_eq!(
            app.session.error_message(),
            Some("Invalid file type. Please upload a .json file.")
        );
    }

    #[test]
    fn unreadable_path_sets_notice() {
        let dir = tempdir().expect("temp dir");
        let (mut app, _rx, _tx) = app_with_channels();

        app.choose_path(&dir.path().join("missing.json"));

        assert!(app.session.selected_file().is_none());
        assert!(app
            .notice()
            .is_some_and(|n| n.is_failure() && n.text().starts_with("Cannot open")));
    }

    #[test]
    fn convert_sends_start_command() {
        let (mut app, mut rx, _tx) = app_with_channels();
        app.choose_file(Some(SelectedFile::new("a.json", 1, "application/json")));

        app.convert();

        assert_eq!(app.session.phase(), SessionPhase::Processing);
        match rx.try_recv() {
            Ok(ConvertCommand::Start(job)) => assert_eq!(job.file.name, "a.json"),
            other => panic!("expected Start, got {other:?}"),
        }
    }

    #[test]
    fn convert_without_file_sends_nothing() {
        let (mut app, mut rx, _tx) = app_with_channels();

        app.convert();

        assert_eq!(app.session.phase(), SessionPhase::Initial);
        assert_eq!(
            app.session.error_message(),
            Some("Please select a file to convert.")
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn convert_with_worker_gone_returns_to_initial() {
        let (mut app, rx, _tx) = app_with_channels();
        drop(rx);
        app.choose_file(Some(SelectedFile::new("a.json", 1, "application/json")));

        app.convert();

        assert_eq!(app.session.phase(), SessionPhase::Initial);
        assert!(app
            .session
            .error_message()
            .is_some_and(|m| m.contains("worker is not running")));
    }

    #[test]
    fn start_over_while_processing_cancels_the_job() {
        let (mut app, mut rx, _tx) = app_with_channels();
        app.choose_file(Some(SelectedFile::new("a.json", 1, "application/json")));
        app.convert();

        app.start_over();

        assert!(matches!(rx.try_recv(), Ok(ConvertCommand::Start(_))));
        assert!(matches!(rx.try_recv(), Ok(ConvertCommand::Cancel)));
        assert_eq!(app.session.phase(), SessionPhase::Initial);
        assert!(app.session.selected_file().is_none());
    }

    #[test]
    fn late_event_after_start_over_is_ignored() {
        let (mut app, mut rx, tx) = app_with_channels();
        app.choose_file(Some(SelectedFile::new("a.json", 1, "application/json")));
        app.convert();
        let Ok(ConvertCommand::Start(job)) = rx.try_recv() else {
            panic!("expected Start");
        };
        app.start_over();

        tx.try_send(ConvertEvent::Finished {
            ticket: job.ticket,
            outcome: Ok(SAMPLE_CSV.into()),
        })
        .unwrap();
        app.poll_events();

        assert_eq!(app.session.phase(), SessionPhase::Initial);
        assert!(app.session.result_payload().is_none());
    }

    #[test]
    fn download_outside_complete_is_refused() {
        let dir = tempdir().expect("temp dir");
        let (mut app, _rx, _tx) = app_with_channels();

        let err = app.download_into(dir.path()).unwrap_err();

        assert!(matches!(err, SaveError::Session(SessionError::NoResult)));
        assert!(app.saved_to().is_none());
    }

    #[test]
    fn analyze_notice_is_informational() {
        let (mut app, _rx, _tx) = app_with_channels();

        app.analyze();

        let notice = app.notice().expect("notice");
        assert_eq!(notice.text(), "Analysis feature coming soon!");
        assert!(!notice.is_failure());
        assert_eq!(notice.color(), MUTED);
    }

    #[test]
    fn save_failure_notice_is_red() {
        let notice = Notice::Failure("cannot write".into());
        assert_eq!(notice.color(), ERROR);
    }

    #[tokio::test]
    async fn full_flow_with_simulated_backend() {
        let dir = tempdir().expect("temp dir");
        let input = write_json(dir.path(), "orders.JSON");
        let out_dir = dir.path().join("downloads");

        let (command_tx, command_rx) = mpsc::channel(8);
        let (event_tx, event_rx) = mpsc::channel(8);
        let worker = ConversionWorker::new(
            Arc::new(SimulatedBackend::new(Duration::from_millis(10))),
            Duration::from_secs(5),
        );
        let worker_handle = tokio::spawn(worker.run(command_rx, event_tx));

        let mut app = ConverterApp::new(command_tx, event_rx, AppConfig::default());
        app.choose_path(&input);
        app.convert();
        assert_eq!(app.session.phase(), SessionPhase::Processing);

        for _ in 0..200 {
            app.poll_events();
            if app.session.phase() == SessionPhase::Complete {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(app.session.phase(), SessionPhase::Complete);
        assert_eq!(app.session.result_payload(), Some(SAMPLE_CSV));

        let saved = app.download_into(&out_dir).expect("download");
        assert_eq!(saved, out_dir.join("orders.csv"));
        assert_eq!(std::fs::read_to_string(&saved).expect("read"), SAMPLE_CSV);
        assert_eq!(app.saved_to(), Some(saved.as_path()));

        let again = app.download_into(&out_dir).expect("second download");
        assert_eq!(again, out_dir.join("orders (1).csv"));
        assert_eq!(std::fs::read_to_string(&saved).expect("read"), SAMPLE_CSV);

        app.start_over();
        assert_eq!(app.session.phase(), SessionPhase::Initial);
        assert!(app.session.result_payload().is_none());
        assert!(app.saved_to().is_none());

        drop(app);
        worker_handle.await.unwrap();
    }
}
