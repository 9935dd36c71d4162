//! The pull-based event loop and the application context.

use std::path::{Path, PathBuf};
use std::time::Duration;

use kurbo::Point;

use crate::calibrate::{real_world_scale, Calibrator};
use crate::config::SessionConfig;
use crate::edges::CannyEdges;
use crate::error::LassoError;
use crate::event::{EventSource, FrameSink};
use crate::export::{export_points, write_csv};
use crate::geom::Contour;
use crate::mode::{InteractionMode, Viewer};
use crate::raster;
use crate::trace::Tracer;

/// Why a viewer loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// Enter: the operator accepted the result.
    Confirmed,
    /// Esc: the operator backed out.
    Cancelled,
    /// The event source ran dry.
    SourceClosed,
}

impl Viewer {
    /// Poll, apply every pending event in order, present one frame; repeat
    /// until a key ends the loop or the source closes.
    ///
    /// Events in the same batch after a terminating key are dropped. The
    /// frame for that batch is still presented.
    pub fn run(
        &mut self,
        source: &mut dyn EventSource,
        sink: &mut dyn FrameSink,
        poll_interval: Duration,
    ) -> Result<LoopExit, LassoError> {
        let mut frames = 0usize;
        let exit = loop {
            let Some(events) = source.poll(poll_interval) else {
                break LoopExit::SourceClosed;
            };
            let exit = events.into_iter().find_map(|event| self.handle(event));
            sink.present(&self.frame()?)?;
            frames += 1;
            if let Some(exit) = exit {
                break exit;
            }
        };
        log::debug!("loop ended after {frames} frames: {exit:?}");
        Ok(exit)
    }
}

struct Loaded {
    path: PathBuf,
    raw_size: (u32, u32),
    tracer: Viewer,
    calibrator: Viewer,
}

/// Everything a session owns: config, the loaded image, and one viewer
/// per interaction mode.
pub struct Workspace {
    config: SessionConfig,
    loaded: Option<Loaded>,
}

impl Workspace {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            loaded: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SessionConfig {
        &mut self.config
    }

    /// Decode and downsample `path`, then start both viewers fresh.
    ///
    /// On failure the previously loaded image, lasso and calibration stay.
    pub fn load_image(&mut self, path: &Path) -> Result<(), LassoError> {
        let image = raster::load(path, self.config.effective_downsample())?;
        let screen = (self.config.screen_width, self.config.screen_height);
        let edges = CannyEdges::from(self.config.edges);
        let tracer = Viewer::new(
            image.raster.clone(),
            screen,
            InteractionMode::Tracing(Tracer::new(Box::new(edges))),
        );
        let calibrator = Viewer::new(
            image.raster,
            screen,
            InteractionMode::Calibrating(Calibrator::new()),
        );
        self.loaded = Some(Loaded {
            path: path.to_path_buf(),
            raw_size: image.raw_size,
            tracer,
            calibrator,
        });
        Ok(())
    }

    fn loaded(&self) -> Result<&Loaded, LassoError> {
        self.loaded.as_ref().ok_or(LassoError::NoImage)
    }

    pub fn image_path(&self) -> Option<&Path> {
        self.loaded.as_ref().map(|l| l.path.as_path())
    }

    /// Decoded size before downsampling.
    pub fn raw_size(&self) -> Option<(u32, u32)> {
        self.loaded.as_ref().map(|l| l.raw_size)
    }

    /// Size of the working raster.
    pub fn working_size(&self) -> Option<(u32, u32)> {
        self.loaded.as_ref().map(|l| l.tracer.raster().dimensions())
    }

    pub fn tracer(&self) -> Result<&Viewer, LassoError> {
        Ok(&self.loaded()?.tracer)
    }

    pub fn tracer_mut(&mut self) -> Result<&mut Viewer, LassoError> {
        self.loaded
            .as_mut()
            .map(|l| &mut l.tracer)
            .ok_or(LassoError::NoImage)
    }

    pub fn calibrator(&self) -> Result<&Viewer, LassoError> {
        Ok(&self.loaded()?.calibrator)
    }

    pub fn calibrator_mut(&mut self) -> Result<&mut Viewer, LassoError> {
        self.loaded
            .as_mut()
            .map(|l| &mut l.calibrator)
            .ok_or(LassoError::NoImage)
    }

    /// Real-world units per pixel: the configured override if set,
    /// otherwise the calibration span against `known_distance`.
    pub fn scale_factor(&self) -> Result<f64, LassoError> {
        if let Some(scale) = self.config.scale_factor {
            return if scale.is_finite() && scale > 0.0 {
                Ok(scale)
            } else {
                Err(LassoError::InvalidScale(scale))
            };
        }
        let known = self
            .config
            .known_distance
            .ok_or_else(|| LassoError::Config("no known distance for calibration".into()))?;
        let span = self
            .calibrator()?
            .mode()
            .as_calibrator()
            .and_then(|c| c.calibration().pixel_distance());
        real_world_scale(span, known)
    }

    /// The committed lasso as a closed loop.
    pub fn lasso(&self) -> Result<Contour, LassoError> {
        self.tracer()?
            .mode()
            .as_tracer()
            .and_then(|t| t.lasso().finalize())
            .ok_or(LassoError::EmptyLasso)
    }

    /// Lasso in centred real-world coordinates.
    pub fn export_points(&self) -> Result<Vec<Point>, LassoError> {
        let lasso = self.lasso()?;
        export_points(&lasso, self.scale_factor()?, self.config.tolerance)
    }

    /// Export to a CSV file at `path`. Nothing is written on error.
    pub fn export_to(&self, path: &Path) -> Result<Vec<Point>, LassoError> {
        let points = self.export_points()?;
        write_csv(path, &points, self.config.output_unit)?;
        log::info!("wrote {} points to {}", points.len(), path.display());
        Ok(points)
    }
}
