//! Interaction modes and the viewer that hosts them.
//!
//! A [`Viewer`] owns one working raster, its [`Viewport`], and the mode the
//! operator is in. Viewport keys are handled here for every mode; pointer
//! events are converted to image space and passed on to the mode.

use image::RgbaImage;
use kurbo::Point;

use crate::calibrate::Calibrator;
use crate::error::LassoError;
use crate::event::{InputEvent, Key, PointerButton};
use crate::render::{line_width, Canvas};
use crate::session::LoopExit;
use crate::trace::Tracer;
use crate::viewport::Viewport;

/// What pointer input does.
pub enum InteractionMode {
    /// Build the lasso.
    Tracing(Tracer),
    /// Mark the two ends of a known span.
    Calibrating(Calibrator),
}

impl InteractionMode {
    pub fn as_tracer(&self) -> Option<&Tracer> {
        match self {
            InteractionMode::Tracing(t) => Some(t),
            InteractionMode::Calibrating(_) => None,
        }
    }

    pub fn as_calibrator(&self) -> Option<&Calibrator> {
        match self {
            InteractionMode::Calibrating(c) => Some(c),
            InteractionMode::Tracing(_) => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            InteractionMode::Tracing(_) => "tracing",
            InteractionMode::Calibrating(_) => "calibrating",
        }
    }

    fn pointer_moved(&mut self, at: Point, raster: &RgbaImage, viewport: &Viewport) {
        match self {
            InteractionMode::Tracing(t) => t.pointer_moved(at, raster, viewport),
            InteractionMode::Calibrating(c) => c.pointer_moved(at, raster.dimensions()),
        }
    }

    fn pointer_released(
        &mut self,
        button: PointerButton,
        at: Point,
        raster: &RgbaImage,
        viewport: &Viewport,
    ) {
        match (self, button) {
            (InteractionMode::Tracing(t), PointerButton::Left) => t.commit(at, raster, viewport),
            (InteractionMode::Tracing(t), PointerButton::Right) => t.undo(),
            (InteractionMode::Calibrating(c), PointerButton::Left) => c.place(at, raster.dimensions()),
            (InteractionMode::Calibrating(c), PointerButton::Right) => c.undo(),
        }
    }

    fn confirm(&mut self) {
        if let InteractionMode::Tracing(t) = self {
            t.confirm();
        }
    }

    fn render_overlay(&self, canvas: &mut Canvas, width: f32) {
        match self {
            InteractionMode::Tracing(t) => t.render_overlay(canvas, width),
            InteractionMode::Calibrating(c) => c.render_overlay(canvas, width),
        }
    }
}

/// A raster, its viewport, and the active mode.
pub struct Viewer {
    viewport: Viewport,
    raster: RgbaImage,
    mode: InteractionMode,
}

impl Viewer {
    /// Fit `raster` to a `screen` sized display.
    pub fn new(raster: RgbaImage, screen: (u32, u32), mode: InteractionMode) -> Self {
        let viewport = Viewport::new(screen, raster.dimensions());
        Self {
            viewport,
            raster,
            mode,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn raster(&self) -> &RgbaImage {
        &self.raster
    }

    pub fn mode(&self) -> &InteractionMode {
        &self.mode
    }

    /// Apply one event. Returns how the loop should end, if it should.
    pub fn handle(&mut self, event: InputEvent) -> Option<LoopExit> {
        match event {
            InputEvent::PointerMoved(screen) => {
                let at = self.viewport.screen_to_image(screen);
                self.mode.pointer_moved(at, &self.raster, &self.viewport);
            }
            InputEvent::PointerReleased { button, position } => {
                let at = self.viewport.screen_to_image(position);
                self.mode
                    .pointer_released(button, at, &self.raster, &self.viewport);
            }
            InputEvent::Key(key) => match key {
                Key::ZoomIn => self.viewport.zoom(1),
                Key::ZoomOut => self.viewport.zoom(-1),
                Key::PanLeft => self.viewport.pan(-1, 0),
                Key::PanRight => self.viewport.pan(1, 0),
                Key::PanUp => self.viewport.pan(0, 1),
                Key::PanDown => self.viewport.pan(0, -1),
                Key::Confirm => {
                    self.mode.confirm();
                    log::debug!("{} confirmed", self.mode.name());
                    return Some(LoopExit::Confirmed);
                }
                Key::Quit => {
                    log::debug!("{} cancelled", self.mode.name());
                    return Some(LoopExit::Cancelled);
                }
            },
        }
        None
    }

    /// The current frame: overlay drawn on the raster, then cropped and
    /// zoomed to the visible region.
    pub fn frame(&self) -> Result<RgbaImage, LassoError> {
        let width = line_width(&self.viewport, 1.0);
        let overlaid = self.overlaid(width)?;
        Ok(self.viewport.render_view(&overlaid))
    }

    /// Full, unzoomed raster with the overlay at double thickness.
    pub fn confirm_preview(&self) -> Result<RgbaImage, LassoError> {
        self.overlaid(line_width(&self.viewport, 2.0))
    }

    fn overlaid(&self, width: f32) -> Result<RgbaImage, LassoError> {
        let mut canvas = Canvas::from_image(&self.raster)?;
        self.mode.render_overlay(&mut canvas, width);
        canvas.into_image()
    }
}
