use std::path::PathBuf;

use eframe::egui::{self, Align, Align2, Button, Color32, ColorImage, Layout, RichText, TextEdit};
use eframe::Frame;
use egui_extras::{Column, TableBuilder};
use egui_plot::{Legend, Line, Plot, PlotPoints};
use log::{debug, error, info, warn};

use calculator::{Form, ProjectionResult};
use config::{Config, Palette};
use error::AppError;

pub mod calculator;
pub mod config;
pub mod error;
pub mod export;

const BUTTON_HEIGHT: f32 = 28.0;
/// Frames to wait for the screenshot before giving up on a save.
const CAPTURE_FRAMES: u32 = 30;

#[derive(Copy, Clone, Debug, PartialEq)]
enum Action {
    Calculate,
    Reset,
    Save,
}

pub struct App {
    cfg: Config,
    form: Form,
    result: ProjectionResult,
    dark_mode: bool,
    /// Shown in a window that disables the form until dismissed.
    modal: Option<AppError>,
    /// Outcome of the last save, shown above the form.
    status: Option<Result<String, AppError>>,
    reset_chart: bool,
    chart_rect: Option<egui::Rect>,
    pending_export: Option<PathBuf>,
    capture_waited: u32,
}

impl Default for App {
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.capture_chart(ctx);

        let enabled = self.modal.is_none();
        let mut action = None;

        egui::TopBottomPanel::top("inputs").show(ctx, |ui| {
            ui.add_enabled_ui(enabled, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Interest Rate (%):");
                    ui.add(TextEdit::singleline(&mut self.form.rate).desired_width(80.0));
                    ui.label("Initial Investment:");
                    ui.add(TextEdit::singleline(&mut self.form.principal).desired_width(100.0));
                    ui.label("Years to Invest:");
                    ui.add(TextEdit::singleline(&mut self.form.years).desired_width(60.0));

                    let mut dark_mode = self.dark_mode;
                    if ui.checkbox(&mut dark_mode, "Dark Mode").changed() {
                        self.set_dark_mode(ctx, dark_mode);
                    }
                });
            });

            match &self.status {
                Some(Ok(msg)) => {
                    ui.label(RichText::new(msg).color(Color32::from_rgb(0x2e, 0x8b, 0x57)));
                }
                Some(Err(e)) => {
                    ui.label(RichText::new(e.to_string()).color(Color32::RED));
                }
                None => {}
            }
        });

        egui::SidePanel::left("results")
            .resizable(true)
            .default_width(ctx.screen_rect().width() * 0.3)
            .show(ctx, |ui| {
                ui.add_enabled_ui(enabled, |ui| {
                    ui.with_layout(Layout::bottom_up(Align::Center), |ui| {
                        let width = ui.available_width();
                        for (label, clicked) in [
                            ("Save", Action::Save),
                            ("Reset", Action::Reset),
                            ("Calculate", Action::Calculate),
                        ] {
                            if ui.add_sized([width, BUTTON_HEIGHT], Button::new(label)).clicked() {
                                action = Some(clicked);
                            }
                        }
                        ui.separator();

                        ui.with_layout(Layout::top_down(Align::Min), |ui| {
                            self.table(ui);
                        });
                    });
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui
                .vertical_centered(|ui| {
                    ui.heading("Interest Chart");

                    let mut plot = Plot::new("interest_chart")
                        .x_axis_label("Year")
                        .y_axis_label("Total")
                        .legend(Legend::default());
                    if std::mem::take(&mut self.reset_chart) {
                        plot = plot.reset();
                    }

                    plot.show(ui, |plot_ui| {
                        if !self.result.is_empty() {
                            plot_ui.line(Line::new(PlotPoints::from(self.result.points())).name("Total"));
                        }
                    });
                })
                .response;
            self.chart_rect = Some(response.rect);
        });

        if let Some(err) = &self.modal {
            let mut dismissed = false;
            egui::Window::new("ERROR")
                .collapsible(false)
                .resizable(false)
                .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(err.to_string());
                    if ui.button("OK").clicked() {
                        dismissed = true;
                    }
                });
            if dismissed {
                self.modal = None;
            }
        }

        match action {
            Some(Action::Calculate) => self.calculate(),
            Some(Action::Reset) => self.reset(),
            Some(Action::Save) => {
                let dir = rfd::FileDialog::new()
                    .set_title("Select Directory")
                    .pick_folder();
                if self.choose_destination(dir) {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot);
                    ctx.request_repaint();
                }
            }
            None => {}
        }
    }
}

impl App {
    pub fn new(cc: &eframe::CreationContext<'_>, cfg: Config) -> Self {
        let app = Self::with_config(cfg);
        apply_palette(&cc.egui_ctx, app.dark_mode);
        app
    }

    pub fn with_config(cfg: Config) -> Self {
        Self {
            dark_mode: cfg.dark_mode,
            cfg,
            form: Form::default(),
            result: ProjectionResult::default(),
            modal: None,
            status: None,
            reset_chart: false,
            chart_rect: None,
            pending_export: None,
            capture_waited: 0,
        }
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut Form {
        &mut self.form
    }

    pub fn result(&self) -> &ProjectionResult {
        &self.result
    }

    pub fn modal(&self) -> Option<&AppError> {
        self.modal.as_ref()
    }

    pub fn status(&self) -> Option<&Result<String, AppError>> {
        self.status.as_ref()
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    /// Parses the form and replaces the current result. A bad field leaves
    /// the previous result on screen.
    pub fn calculate(&mut self) {
        match self.form.parse(self.cfg.limits.max_years) {
            Ok(input) => {
                self.result = input.project();
                self.reset_chart = true;
                debug!("projected {:?} into {} rows", input, self.result.len());
            }
            Err(e) => {
                warn!("rejected input {:?}: {e}", self.form);
                self.modal = Some(e);
            }
        }
    }

    pub fn reset(&mut self) {
        self.form.clear();
        self.result = ProjectionResult::default();
        self.reset_chart = true;
        self.status = None;
    }

    pub fn set_dark_mode(&mut self, ctx: &egui::Context, dark_mode: bool) {
        self.dark_mode = dark_mode;
        apply_palette(ctx, dark_mode);
    }

    /// Remembers where to save once the chart has been captured. Returns
    /// whether a capture is needed.
    pub fn choose_destination(&mut self, dir: Option<PathBuf>) -> bool {
        match dir {
            Some(dir) => {
                info!("saving results under {}", dir.display());
                self.pending_export = Some(dir);
                self.capture_waited = 0;
                true
            }
            None => {
                warn!("save cancelled, no directory selected");
                self.status = Some(Err(AppError::ExportDestinationMissing));
                false
            }
        }
    }

    /// Writes the current result and the given chart pixels to the chosen directory.
    pub fn finish_export(&mut self, chart: &ColorImage) {
        let dir = self.pending_export.take();
        let status = export::export(dir.as_deref(), &self.cfg.export, &self.result, chart)
            .map(|_| format!("Results were saved to \"{}\" folder!", self.cfg.export.folder));

        if let Err(e) = &status {
            error!("save failed: {e}");
        }
        self.status = Some(status);
    }

    fn capture_chart(&mut self, ctx: &egui::Context) {
        if self.pending_export.is_none() {
            return;
        }

        let screenshot = ctx.input(|i| {
            i.raw.events.iter().find_map(|event| match event {
                egui::Event::Screenshot { image, .. } => Some(image.clone()),
                _ => None,
            })
        });

        match screenshot {
            Some(image) => {
                let chart = match self.chart_rect {
                    Some(rect) => image.region(&rect, Some(ctx.pixels_per_point())),
                    None => (*image).clone(),
                };
                self.finish_export(&chart);
            }
            None => {
                self.missed_capture();
                ctx.request_repaint();
            }
        }
    }

    /// Counts a frame without the screenshot; drops the pending save once
    /// `CAPTURE_FRAMES` have passed.
    fn missed_capture(&mut self) {
        self.capture_waited += 1;
        if self.capture_waited < CAPTURE_FRAMES {
            return;
        }

        if let Some(dir) = self.pending_export.take() {
            let e = AppError::ChartCapture { dir };
            error!("save failed: {e}");
            self.status = Some(Err(e));
        }
    }

    fn table(&self, ui: &mut egui::Ui) {
        let row_height = egui::TextStyle::Body.resolve(ui.style()).size * 1.5;
        let rows = self.result.rows();

        TableBuilder::new(ui)
            .striped(true)
            .auto_shrink([false, false])
            .cell_layout(Layout::left_to_right(Align::Center))
            .column(Column::initial(60.0))
            .column(Column::remainder())
            .header(row_height, |mut header| {
                header.col(|ui| {
                    ui.strong("Year");
                });
                header.col(|ui| {
                    ui.strong("Total");
                });
            })
            .body(|body| {
                body.rows(row_height, rows.len(), |mut row| {
                    let r = rows[row.index()];
                    row.col(|ui| {
                        ui.label(r.year.to_string());
                    });
                    row.col(|ui| {
                        ui.label(r.display_total());
                    });
                });
            });
    }
}

/// Pins the egui theme so the OS light/dark setting cannot swap the palette out.
fn apply_palette(ctx: &egui::Context, dark_mode: bool) {
    let theme = if dark_mode {
        egui::Theme::Dark
    } else {
        egui::Theme::Light
    };
    ctx.set_theme(theme);
    ctx.set_visuals_of(theme, Palette::for_mode(dark_mode).visuals(dark_mode));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(rate: &str, principal: &str, years: &str) -> App {
        let mut app = App::default();
        let form = app.form_mut();
        form.rate = rate.to_owned();
        form.principal = principal.to_owned();
        form.years = years.to_owned();
        app
    }

    #[test]
    fn calculate_replaces_the_result() {
        let mut app = filled("10", "1000", "3");
        app.calculate();
        assert_eq!(app.result().len(), 3);

        app.form_mut().years = "1".to_owned();
        app.calculate();
        assert_eq!(app.result().len(), 1);
        assert!(app.modal().is_none());
    }

    #[test]
    fn bad_rate_keeps_the_previous_result() {
        let mut app = filled("10", "1000", "3");
        app.calculate();
        let before = app.result().clone();

        app.form_mut().rate = "abc".to_owned();
        app.calculate();

        assert_eq!(app.result(), &before);
        assert!(matches!(
            app.modal(),
            Some(AppError::InputParse { field: "rate" })
        ));
        assert!(app.modal().unwrap().is_blocking());
    }

    #[test]
    fn too_many_years_is_rejected() {
        let mut app = filled("1", "1", "10");
        app.calculate();
        let before = app.result().clone();

        app.form_mut().years = "1001".to_owned();
        app.calculate();

        assert_eq!(app.result(), &before);
        assert_eq!(app.result().len(), 10);
        assert!(matches!(
            app.modal(),
            Some(AppError::YearsOutOfRange { years: 1001, max: 1000 })
        ));
    }

    #[test]
    fn reset_clears_form_and_result() {
        let mut app = filled("10", "1000", "3");
        app.calculate();
        app.reset();

        assert!(app.result().is_empty());
        assert_eq!(app.form(), &Form::default());
        assert!(app.reset_chart);
    }

    #[test]
    fn declined_dialog_reports_and_skips_capture() {
        let mut app = filled("10", "1000", "3");
        app.calculate();

        assert!(!app.choose_destination(None));
        assert!(matches!(
            app.status(),
            Some(Err(AppError::ExportDestinationMissing))
        ));
        assert!(app.pending_export.is_none());
    }

    #[test]
    fn export_uses_the_current_result() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = filled("10", "1000", "2");
        app.calculate();
        app.form_mut().years = "5".to_owned();

        assert!(app.choose_destination(Some(dir.path().to_path_buf())));
        app.finish_export(&ColorImage::new([3, 3], Color32::WHITE));

        match app.status() {
            Some(Ok(msg)) => assert_eq!(msg, "Results were saved to \"Saved\" folder!"),
            other => panic!("unexpected status {other:?}"),
        }
        let csv = std::fs::read_to_string(dir.path().join("Saved/results.csv")).unwrap();
        assert_eq!(csv.lines().count(), 3);
        assert!(app.pending_export.is_none());
    }

    #[test]
    fn dark_mode_follows_config() {
        let cfg = Config {
            dark_mode: true,
            ..Default::default()
        };
        assert!(App::with_config(cfg).dark_mode());
        assert!(!App::default().dark_mode());
    }

    #[test]
    fn toggling_dark_mode_swaps_visuals() {
        let ctx = egui::Context::default();
        let mut app = App::default();

        app.set_dark_mode(&ctx, true);
        assert!(app.dark_mode());
        assert_eq!(ctx.style().visuals.panel_fill, Palette::DARK.window);

        app.set_dark_mode(&ctx, false);
        assert_eq!(ctx.style().visuals.panel_fill, Palette::LIGHT.window);
    }

    fn frame_with_os_theme(ctx: &egui::Context, theme: egui::Theme) {
        let input = egui::RawInput {
            system_theme: Some(theme),
            ..Default::default()
        };
        let _ = ctx.run(input, |_| {});
    }

    #[test]
    fn light_palette_survives_a_light_os() {
        let ctx = egui::Context::default();
        let mut app = App::default();
        app.set_dark_mode(&ctx, false);

        frame_with_os_theme(&ctx, egui::Theme::Light);

        let visuals = ctx.style().visuals.clone();
        assert!(!visuals.dark_mode);
        assert_eq!(visuals.panel_fill, Palette::LIGHT.window);
    }

    #[test]
    fn dark_config_survives_a_light_os() {
        let ctx = egui::Context::default();
        let mut app = App::with_config(Config {
            dark_mode: true,
            ..Default::default()
        });
        app.set_dark_mode(&ctx, app.dark_mode());

        frame_with_os_theme(&ctx, egui::Theme::Light);

        let visuals = ctx.style().visuals.clone();
        assert!(visuals.dark_mode);
        assert_eq!(visuals.panel_fill, Palette::DARK.window);

        app.set_dark_mode(&ctx, false);
        frame_with_os_theme(&ctx, egui::Theme::Dark);
        assert_eq!(ctx.style().visuals.panel_fill, Palette::LIGHT.window);
    }

    #[test]
    fn missing_screenshot_abandons_the_save() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = filled("10", "1000", "2");
        app.calculate();
        assert!(app.choose_destination(Some(dir.path().to_path_buf())));

        for _ in 1..CAPTURE_FRAMES {
            app.missed_capture();
        }
        assert!(app.pending_export.is_some());
        assert!(app.status().is_none());

        app.missed_capture();
        assert!(app.pending_export.is_none());
        assert!(matches!(
            app.status(),
            Some(Err(AppError::ChartCapture { .. }))
        ));
        assert!(!dir.path().join("Saved").exists());
    }
}
