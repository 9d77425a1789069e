use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{Color32, Visuals};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dark_mode: bool,
    pub window: Window,
    pub limits: Limits,
    pub export: Export,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Window {
    pub title: String,
    pub width: f32,
    pub height: f32,
}

impl Default for Window {
    fn default() -> Self {
        Self {
            title: "Interest Calculator".to_owned(),
            width: 800.0,
            height: 600.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_years: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self { max_years: 1000 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Export {
    pub folder: String,
    pub csv_file: String,
    pub chart_file: String,
}

impl Default for Export {
    fn default() -> Self {
        Self {
            folder: "Saved".to_owned(),
            csv_file: "results.csv".to_owned(),
            chart_file: "chart.png".to_owned(),
        }
    }
}

/// Fixed color scheme for the whole window.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Palette {
    pub window: Color32,
    pub widget: Color32,
    pub view: Color32,
    pub text: Color32,
}

impl Palette {
    pub const LIGHT: Palette = Palette {
        window: Color32::from_rgb(0xf0, 0xf0, 0xf0),
        widget: Color32::from_rgb(0xf8, 0xf8, 0xf8),
        view: Color32::from_rgb(0xff, 0xff, 0xff),
        text: Color32::from_rgb(0x00, 0x00, 0x00),
    };

    pub const DARK: Palette = Palette {
        window: Color32::from_rgb(0x22, 0x22, 0x22),
        widget: Color32::from_rgb(0x33, 0x33, 0x33),
        view: Color32::from_rgb(0x44, 0x44, 0x44),
        text: Color32::from_rgb(0xee, 0xee, 0xee),
    };

    pub fn for_mode(dark: bool) -> Palette {
        if dark {
            Palette::DARK
        } else {
            Palette::LIGHT
        }
    }

    pub fn visuals(&self, dark: bool) -> Visuals {
        let mut visuals = if dark {
            Visuals::dark()
        } else {
            Visuals::light()
        };

        visuals.panel_fill = self.window;
        visuals.window_fill = self.window;
        // text edits, the table stripes and the plot background
        visuals.extreme_bg_color = self.view;
        visuals.faint_bg_color = self.widget;
        visuals.override_text_color = Some(self.text);

        for widget in [
            &mut visuals.widgets.noninteractive,
            &mut visuals.widgets.inactive,
        ] {
            widget.bg_fill = self.widget;
            widget.weak_bg_fill = self.widget;
        }

        visuals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            dark_mode = true

            [export]
            folder = "Exports"
            "#,
        )
        .unwrap();

        assert!(cfg.dark_mode);
        assert_eq!(cfg.export.folder, "Exports");
        assert_eq!(cfg.export.csv_file, "results.csv");
        assert_eq!(cfg.export.chart_file, "chart.png");
        assert_eq!(cfg.limits, Limits::default());
        assert_eq!(cfg.window.title, "Interest Calculator");
    }

    #[test]
    fn empty_file_is_default() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "limits = 3").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(format!("{err}").contains("broken.toml"));
    }

    #[test]
    fn load_reads_limits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calc.toml");
        std::fs::write(&path, "[limits]\nmax_years = 60\n").unwrap();

        assert_eq!(Config::load(&path).unwrap().limits.max_years, 60);
    }

    #[test]
    fn palettes_apply_their_colors() {
        let dark = Palette::DARK.visuals(true);
        assert!(dark.dark_mode);
        assert_eq!(dark.panel_fill, Color32::from_rgb(0x22, 0x22, 0x22));
        assert_eq!(dark.override_text_color, Some(Color32::from_rgb(0xee, 0xee, 0xee)));

        let light = Palette::for_mode(false).visuals(false);
        assert!(!light.dark_mode);
        assert_eq!(light.panel_fill, Color32::from_rgb(0xf0, 0xf0, 0xf0));
        assert_eq!(light.extreme_bg_color, Color32::WHITE);
    }
}
