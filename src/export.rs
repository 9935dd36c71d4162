//! Lasso to CAD point file.
//!
//! Pipeline: flip Y → tolerance offset (pixels) → scale to real-world
//! units → recentre on the centroid. The result is written as bare `x,y`
//! lines, the format the CAD-side import script reads.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use kurbo::{Affine, Point, Vec2};
use tempfile::NamedTempFile;

use crate::config::OutputUnit;
use crate::error::LassoError;
use crate::geom::{centroid, Contour};
use crate::offset::offset;

/// Transform a finished lasso into centred real-world coordinates.
///
/// `scale_factor` is real-world units per pixel; `tolerance` is in the same
/// real-world units (negative shrinks the outline).
pub fn export_points(
    lasso: &Contour,
    scale_factor: f64,
    tolerance: f64,
) -> Result<Vec<Point>, LassoError> {
    if lasso.is_empty() {
        return Err(LassoError::EmptyLasso);
    }
    if !(scale_factor.is_finite() && scale_factor > 0.0) {
        return Err(LassoError::InvalidScale(scale_factor));
    }

    // Image rows grow downwards; CAD Y grows upwards.
    let flipped = Contour::new(lasso.points.iter().map(|&p| Affine::FLIP_Y * p).collect());
    let adjusted = offset(&flipped, tolerance / scale_factor);

    let scaled: Vec<Point> = adjusted
        .points
        .iter()
        .map(|&p| Affine::scale(scale_factor) * p)
        .collect();
    let center = centroid(&scaled).ok_or(LassoError::EmptyLasso)?;
    let shift = Vec2::new(-center.x, -center.y);
    let points: Vec<Point> = scaled.into_iter().map(|p| p + shift).collect();

    log::info!(
        "export: {} points, scale {:.5}/px, tolerance {:+.3}",
        points.len(),
        scale_factor,
        tolerance
    );
    Ok(points)
}

/// Write `points` as `x,y` lines, converted to `unit`.
pub fn write_points<W: Write>(
    writer: &mut W,
    points: &[Point],
    unit: OutputUnit,
) -> Result<(), LassoError> {
    let k = unit.factor();
    for p in points {
        writeln!(writer, "{},{}", p.x * k, p.y * k)?;
    }
    Ok(())
}

/// Write the point file at `path`.
///
/// Points go to a temporary file next to `path`, which is renamed into
/// place only once every line is written.
pub fn write_csv(path: &Path, points: &[Point], unit: OutputUnit) -> Result<(), LassoError> {
    if points.is_empty() {
        return Err(LassoError::EmptyLasso);
    }
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(file.as_file_mut());
        write_points(&mut writer, points, unit)?;
        writer.flush()?;
    }
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// First `{stem}_{n}.csv` in `dir` that does not exist yet, counting from 0.
pub fn next_free_path(dir: &Path, stem: &str) -> PathBuf {
    (0..)
        .map(|n| dir.join(format!("{stem}_{n}.csv")))
        .find(|p| !p.exists())
        .unwrap_or_else(|| dir.join(format!("{stem}.csv")))
}
