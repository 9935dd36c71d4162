//! cad-lasso: photo of a part → scaled, tolerance-adjusted CAD point file.
//!
//! The operator calibrates the image scale with two clicks on a feature of
//! known length, then traces the part outline with a lasso that snaps onto
//! nearby intensity edges. The closed outline is flipped into CAD
//! orientation, offset by a tolerance, scaled to millimetres, centred and
//! written as `x,y` lines for the CAD host to import.
//!
//! # Example
//!
//! ```no_run
//! use cad_lasso::{LoopExit, NullSink, ScriptedEvents, SessionConfig, Workspace};
//! use std::path::Path;
//! use std::time::Duration;
//!
//! let config = SessionConfig {
//!     scale_factor: Some(0.1),
//!     ..SessionConfig::default()
//! };
//! let mut ws = Workspace::new(config);
//! ws.load_image(Path::new("part.jpg"))?;
//!
//! let mut events = ScriptedEvents::load(Path::new("lasso.txt"))?;
//! let exit = ws.tracer_mut()?.run(&mut events, &mut NullSink, Duration::from_millis(10))?;
//! if exit != LoopExit::Cancelled {
//!     ws.export_to(Path::new("point_data_0.csv"))?;
//! }
//! # Ok::<(), cad_lasso::LassoError>(())
//! ```

#![forbid(unsafe_code)]

pub mod calibrate;
pub mod config;
pub mod edges;
pub mod error;
pub mod event;
pub mod export;
pub mod geom;
pub mod import;
pub mod lasso;
pub mod mode;
pub mod offset;
pub mod raster;
pub mod render;
pub mod route;
pub mod session;
pub mod trace;
pub mod viewport;

// Re-export kurbo so callers share the Point type used throughout.
pub use kurbo;

pub use config::{EdgeConfig, OutputUnit, SessionConfig};
pub use error::LassoError;
pub use event::{EventSource, FrameSink, InputEvent, Key, NullSink, PointerButton, ScriptedEvents};
pub use geom::{Contour, Route};
pub use mode::{InteractionMode, Viewer};
pub use session::{LoopExit, Workspace};
