use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid Input, Enter a Number ({field})")]
    InputParse { field: &'static str },

    #[error("Years must be at most {max}, got {years}")]
    YearsOutOfRange { years: u32, max: u32 },

    #[error("No directory selected")]
    ExportDestinationMissing,

    #[error("Could not write {}: {source}", .path.display())]
    ExportIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Chart was not captured, nothing saved under {}", .dir.display())]
    ChartCapture { dir: PathBuf },

    #[error("Could not encode chart {}: {source}", .path.display())]
    ChartEncode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl AppError {
    /// Input errors stop the form until acknowledged; everything else is a banner.
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            AppError::InputParse { .. } | AppError::YearsOutOfRange { .. }
        )
    }
}
