use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use eframe::egui::{Color32, ColorImage, Pos2, Rect, vec2};
use image::RgbaImage;
use thiserror::Error;

use crate::chart::DashboardView;
use crate::data::filter::YearRange;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ExportError {
    /// Nothing is loaded, so there is no range to name the file after.
    #[error("no year range selected")]
    NoRange,

    #[error("captured image is empty")]
    EmptyCapture,

    #[error("image buffer does not match {width}x{height}")]
    BufferSize { width: u32, height: u32 },

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// File naming
// ---------------------------------------------------------------------------

/// `inflation_2005-2015.png`
pub fn export_file_name(range: YearRange) -> String {
    format!("inflation_{}-{}.png", range.min, range.max)
}

/// Where the PNG for `range` goes inside `dir`.
pub fn export_path(dir: &Path, range: Option<YearRange>) -> Result<PathBuf, ExportError> {
    let range = range.ok_or(ExportError::NoRange)?;
    Ok(dir.join(export_file_name(range)))
}

// ---------------------------------------------------------------------------
// PNG export
// ---------------------------------------------------------------------------

/// An export waiting for the next screenshot from the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingExport {
    pub path: PathBuf,
    /// Screen area of the primary chart, in points.
    pub region: Rect,
}

/// Cut the chart area out of a full-window screenshot.
///
/// `region` comes from an earlier frame and may no longer fit the window,
/// so it is clipped to the screenshot first. Nothing left gives an empty image.
pub fn crop(screenshot: &ColorImage, region: Rect, pixels_per_point: f32) -> ColorImage {
    let [w, h] = screenshot.size;
    let bounds = Rect::from_min_size(
        Pos2::ZERO,
        vec2(w as f32 / pixels_per_point, h as f32 / pixels_per_point),
    );
    let clipped = region.intersect(bounds);
    if !clipped.is_positive() {
        return ColorImage::new([0, 0], Color32::TRANSPARENT);
    }
    screenshot.region(&clipped, Some(pixels_per_point))
}

pub fn to_rgba_image(image: &ColorImage) -> Result<RgbaImage, ExportError> {
    let [w, h] = image.size;
    if w == 0 || h == 0 {
        return Err(ExportError::EmptyCapture);
    }
    let bytes: Vec<u8> = image
        .pixels
        .iter()
        .flat_map(|c| c.to_srgba_unmultiplied())
        .collect();
    let (width, height) = (w as u32, h as u32);
    RgbaImage::from_raw(width, height, bytes).ok_or(ExportError::BufferSize { width, height })
}

pub fn save_png(image: &ColorImage, path: &Path) -> Result<(), ExportError> {
    let rgba = to_rgba_image(image)?;
    rgba.save_with_format(path, image::ImageFormat::Png)?;
    log::info!("Exported chart to {} ({}x{})", path.display(), rgba.width(), rgba.height());
    Ok(())
}

// ---------------------------------------------------------------------------
// Chart configuration export
// ---------------------------------------------------------------------------

/// Write the current chart configuration as pretty JSON.
pub fn save_view_json(view: &DashboardView, path: &Path) -> Result<(), ExportError> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, view)?;
    log::info!("Saved chart configuration to {}", path.display());
    Ok(())
}
