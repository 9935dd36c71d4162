//! Two-point scale calibration.
//!
//! The operator marks both ends of a feature of known length; the pixel
//! distance between the marks turns into real-world units per pixel.

use kurbo::Point;

use crate::error::LassoError;
use crate::geom::snap_to_pixel;
use crate::render::{Canvas, COMMITTED_COLOR, PREVIEW_COLOR};

/// Calibration marks in image space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScaleCalibration {
    first: Option<Point>,
    second: Option<Point>,
}

impl ScaleCalibration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first(&self) -> Option<Point> {
        self.first
    }

    pub fn second(&self) -> Option<Point> {
        self.second
    }

    pub fn is_complete(&self) -> bool {
        self.second.is_some()
    }

    /// Place the next missing mark. Returns `false` once both are set.
    pub fn place(&mut self, point: Point) -> bool {
        if self.first.is_none() {
            self.first = Some(point);
        } else if self.second.is_none() {
            self.second = Some(point);
        } else {
            return false;
        }
        true
    }

    /// Clear the most recent mark.
    pub fn undo(&mut self) {
        if self.second.take().is_none() {
            self.first = None;
        }
    }

    /// Distance between the marks, once both are placed.
    pub fn pixel_distance(&self) -> Option<f64> {
        match (self.first, self.second) {
            (Some(a), Some(b)) => Some(a.distance(b)),
            _ => None,
        }
    }
}

/// Calibrating mode: two clicks mark the known span.
#[derive(Debug, Clone, Default)]
pub struct Calibrator {
    calibration: ScaleCalibration,
    cursor: Option<Point>,
}

impl Calibrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calibration(&self) -> &ScaleCalibration {
        &self.calibration
    }

    pub fn cursor(&self) -> Option<Point> {
        self.cursor
    }

    /// `at` is in image space; `bounds` is the raster size.
    pub fn pointer_moved(&mut self, at: Point, bounds: (u32, u32)) {
        self.cursor = Some(snap_to_pixel(at, bounds.0, bounds.1));
    }

    /// Place the next mark. Clicks after the second are ignored.
    pub fn place(&mut self, at: Point, bounds: (u32, u32)) {
        let point = snap_to_pixel(at, bounds.0, bounds.1);
        self.cursor = Some(point);
        if self.calibration.place(point) {
            log::debug!("calibration mark at ({}, {})", point.x, point.y);
            if let Some(d) = self.calibration.pixel_distance() {
                log::info!("calibration span {d:.2} px");
            }
        }
    }

    pub fn undo(&mut self) {
        self.calibration.undo();
    }

    /// Finished span in blue, or a green rubber band from the first mark
    /// to the cursor.
    pub fn render_overlay(&self, canvas: &mut Canvas, width: f32) {
        match (self.calibration.first(), self.calibration.second(), self.cursor) {
            (Some(a), Some(b), _) => canvas.polyline(&[a, b], COMMITTED_COLOR, width),
            (Some(a), None, Some(c)) => canvas.polyline(&[a, c], PREVIEW_COLOR, width),
            (Some(a), None, None) => canvas.polyline(&[a], PREVIEW_COLOR, width),
            _ => {}
        }
    }
}

/// Real-world units per pixel from a measured pixel span and its known
/// physical length.
pub fn real_world_scale(pixel_distance: Option<f64>, known_distance: f64) -> Result<f64, LassoError> {
    let pixels = pixel_distance.ok_or(LassoError::CalibrationIncomplete)?;
    if !(pixels.is_finite() && pixels > 0.0) {
        return Err(LassoError::InvalidDistance(pixels));
    }
    if !(known_distance.is_finite() && known_distance > 0.0) {
        return Err(LassoError::InvalidDistance(known_distance));
    }
    Ok(known_distance / pixels)
}

/// Parse an operator-entered real-world distance.
pub fn parse_distance(text: &str) -> Result<f64, LassoError> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| LassoError::InvalidNumber(text.to_string()))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(LassoError::InvalidDistance(value))
    }
}
