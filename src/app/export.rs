use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use eframe::egui::ColorImage;
use log::info;

use crate::app::calculator::ProjectionResult;
use crate::app::config::Export;
use crate::app::error::AppError;

/// Files written by a successful export.
#[derive(Clone, Debug, PartialEq)]
pub struct Saved {
    pub folder: PathBuf,
    pub csv: PathBuf,
    pub chart: PathBuf,
}

/// Writes the table and the captured chart under `<dir>/<folder>`.
///
/// `dir` is `None` when the folder dialog was dismissed; nothing is written then.
pub fn export(
    dir: Option<&Path>,
    cfg: &Export,
    result: &ProjectionResult,
    chart: &ColorImage,
) -> Result<Saved, AppError> {
    let dir = dir.ok_or(AppError::ExportDestinationMissing)?;

    let folder = dir.join(&cfg.folder);
    fs::create_dir_all(&folder).map_err(|source| AppError::ExportIo {
        path: folder.clone(),
        source,
    })?;

    let csv = folder.join(&cfg.csv_file);
    write_csv(&csv, result).map_err(|source| AppError::ExportIo {
        path: csv.clone(),
        source,
    })?;

    let chart_path = folder.join(&cfg.chart_file);
    write_chart(&chart_path, chart)?;

    info!(
        "saved {} rows to {} and chart to {}",
        result.len(),
        csv.display(),
        chart_path.display()
    );

    Ok(Saved {
        folder,
        csv,
        chart: chart_path,
    })
}

fn write_csv(path: &Path, result: &ProjectionResult) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "Year, Total")?;
    for row in result.rows() {
        writeln!(out, "{}, {}", row.year, row.display_total())?;
    }
    out.flush()
}

fn write_chart(path: &Path, chart: &ColorImage) -> Result<(), AppError> {
    let [width, height] = chart.size;
    let buffer = image::RgbaImage::from_raw(width as u32, height as u32, chart.as_raw().to_vec())
        .ok_or_else(|| AppError::ExportIo {
            path: path.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "chart buffer does not match its size",
            ),
        })?;

    buffer.save(path).map_err(|source| match source {
        image::ImageError::IoError(source) => AppError::ExportIo {
            path: path.to_path_buf(),
            source,
        },
        source => AppError::ChartEncode {
            path: path.to_path_buf(),
            source,
        },
    })
}
