//! Zoom and pan over a working raster.
//!
//! Screen coordinates are pixels of the rendered frame, which is always
//! `image_size` large: the visible region is cropped out of the raster and
//! stretched back to full size. Image coordinates are raster pixels.

use image::imageops::FilterType;
use image::RgbaImage;
use kurbo::{Point, Rect, Size};

/// Highest zoom step.
pub const MAX_ZOOM: u32 = 20;

/// Fraction of the visible region moved by one pan step.
const PAN_STEP: f64 = 0.1;

/// Rounding allowance at the frame border when mapping back to the screen.
const EDGE_SLACK: f64 = 1e-9;

/// Viewer window is fitted to the screen at this scale.
const WINDOW_SCALE: f64 = 0.5;

/// Zoom and pan state for one raster.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    screen_size: Size,
    image_size: Size,
    window_size: Size,
    zoom_level: u32,
    pan_center: Point,
}

impl Viewport {
    /// Fit an `image_width` x `image_height` raster to the screen, unzoomed
    /// and centred.
    pub fn new(screen: (u32, u32), image: (u32, u32)) -> Self {
        let screen_size = Size::new(screen.0 as f64, screen.1 as f64);
        let image_size = Size::new(image.0 as f64, image.1 as f64);
        let fit = (screen_size.width / image_size.width).min(screen_size.height / image_size.height);
        let window_size = Size::new(
            (image_size.width * fit * WINDOW_SCALE).floor().max(1.0),
            (image_size.height * fit * WINDOW_SCALE).floor().max(1.0),
        );
        Self {
            screen_size,
            image_size,
            window_size,
            zoom_level: 0,
            pan_center: Point::new(image_size.width / 2.0, image_size.height / 2.0),
        }
    }

    pub fn screen_size(&self) -> Size {
        self.screen_size
    }

    pub fn image_size(&self) -> Size {
        self.image_size
    }

    pub fn window_size(&self) -> Size {
        self.window_size
    }

    pub fn zoom_level(&self) -> u32 {
        self.zoom_level
    }

    pub fn pan_center(&self) -> Point {
        self.pan_center
    }

    /// Magnification for the current zoom step: `1 + (0.15 * level)^2`.
    pub fn zoom_factor(&self) -> f64 {
        let k = 0.15 * self.zoom_level as f64;
        1.0 + k * k
    }

    /// Size of the image region currently in view.
    pub fn visible_size(&self) -> Size {
        self.image_size / self.zoom_factor()
    }

    /// Image pixels covered by one pixel of the on-screen window.
    pub fn display_scale(&self) -> f64 {
        self.image_size.width / self.window_size.width / self.zoom_factor()
    }

    /// Frame coordinate to image coordinate.
    pub fn screen_to_image(&self, screen: Point) -> Point {
        let z = self.zoom_factor();
        let visible = self.visible_size();
        Point::new(
            self.pan_center.x - visible.width / 2.0 + screen.x / z,
            self.pan_center.y - visible.height / 2.0 + screen.y / z,
        )
    }

    /// Image coordinate to frame coordinate.
    ///
    /// `None` when the point maps outside the frame on either axis.
    pub fn image_to_screen(&self, image: Point) -> Option<Point> {
        let z = self.zoom_factor();
        let visible = self.visible_size();
        let x = (image.x - (self.pan_center.x - visible.width / 2.0)) * z;
        let y = (image.y - (self.pan_center.y - visible.height / 2.0)) * z;
        let (w, h) = (self.image_size.width, self.image_size.height);
        let on_x = (-EDGE_SLACK..=w + EDGE_SLACK).contains(&x);
        let on_y = (-EDGE_SLACK..=h + EDGE_SLACK).contains(&y);
        (on_x && on_y).then(|| Point::new(x.clamp(0.0, w), y.clamp(0.0, h)))
    }

    /// Change the zoom step by `delta`, clamped to `0..=MAX_ZOOM`, then
    /// pull the pan centre back so the view stays inside the image.
    pub fn zoom(&mut self, delta: i32) {
        let level = (self.zoom_level as i64 + delta as i64).clamp(0, MAX_ZOOM as i64);
        self.zoom_level = level as u32;
        self.clamp_pan();
    }

    /// Move the view by a tenth of the visible region per unit.
    ///
    /// Positive `dy` moves the view up, i.e. towards smaller image rows.
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let visible = self.visible_size();
        self.pan_center.x += dx as f64 * visible.width * PAN_STEP;
        self.pan_center.y -= dy as f64 * visible.height * PAN_STEP;
        self.clamp_pan();
    }

    fn clamp_pan(&mut self) {
        let visible = self.visible_size();
        self.pan_center.x = clamp_axis(self.pan_center.x, visible.width, self.image_size.width);
        self.pan_center.y = clamp_axis(self.pan_center.y, visible.height, self.image_size.height);
    }

    /// Whole-pixel region of the raster in view, clamped inside the image.
    pub fn visible_region(&self) -> Rect {
        let visible = self.visible_size();
        let w = visible.width.trunc().max(1.0);
        let h = visible.height.trunc().max(1.0);
        let x = (self.pan_center.x - w / 2.0)
            .trunc()
            .clamp(0.0, self.image_size.width - w);
        let y = (self.pan_center.y - h / 2.0)
            .trunc()
            .clamp(0.0, self.image_size.height - h);
        Rect::new(x, y, x + w, y + h)
    }

    /// Crop `raster` to the visible region and stretch it back to full size.
    pub fn render_view(&self, raster: &RgbaImage) -> RgbaImage {
        let region = self.visible_region();
        let (w, h) = raster.dimensions();
        if self.zoom_level == 0 {
            return raster.clone();
        }
        let crop = image::imageops::crop_imm(
            raster,
            region.x0 as u32,
            region.y0 as u32,
            region.width() as u32,
            region.height() as u32,
        )
        .to_image();
        image::imageops::resize(&crop, w, h, FilterType::Triangle)
    }
}

/// Keep a window of `span` centred at `center` inside `[0, extent]`.
fn clamp_axis(center: f64, span: f64, extent: f64) -> f64 {
    if center - span / 2.0 < 0.0 {
        span / 2.0
    } else if center + span / 2.0 > extent {
        extent - span / 2.0
    } else {
        center
    }
}
