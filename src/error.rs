use thiserror::Error;

/// Errors that can occur while loading, tracing, calibrating or exporting.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LassoError {
    #[error("failed to load image: {0}")]
    ImageLoad(String),

    #[error("image has no pixels")]
    EmptyImage,

    #[error("no image loaded")]
    NoImage,

    #[error("not a valid downsample factor: {0} (choose a number >= 1)")]
    InvalidDownsample(String),

    #[error("not a number: {0:?}")]
    InvalidNumber(String),

    #[error("scale needs two calibration points")]
    CalibrationIncomplete,

    #[error("distance must be positive, got {0}")]
    InvalidDistance(f64),

    #[error("scale factor must be positive, got {0}")]
    InvalidScale(f64),

    #[error("lasso is empty, nothing to export")]
    EmptyLasso,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("event script line {line}: {message}")]
    ParseEvent { line: usize, message: String },

    #[error("point file line {line}: {message}")]
    ParsePoint { line: usize, message: String },

    #[error("render error: {0}")]
    Render(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
