// THEORY:
// The `error` module holds the two failure families of the vision engine.
//
// 1.  **Frame failures** are local to one analysis cycle. A frame with zero or
//     mismatched dimensions is rejected, the alarm state is left untouched, and
//     the next frame is analyzed as usual.
// 2.  **Configuration failures** only ever surface while the pipeline is being
//     built. Once a `PipelineConfig` has validated, nothing in the core can
//     produce one again.

use thiserror::Error;

/// Top-level error type of the `fire_vision` crate.
#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Invalid frame: {0}")]
    InvalidFrame(#[from] FrameError),
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

/// Why a single frame was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame has zero area ({width}x{height})")]
    ZeroSized { width: u32, height: u32 },
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferLength { expected: usize, actual: usize },
    #[error("frame is {actual_width}x{actual_height}, pipeline expects {expected_width}x{expected_height}")]
    DimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },
}

/// Startup-time configuration problems.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("at least one color band must be configured")]
    EmptyBandList,
    #[error("`{0}` must be greater than zero")]
    NonPositiveThreshold(&'static str),
    #[error("color band `{name}` is malformed: {reason}")]
    InvalidBand { name: String, reason: String },
    #[error("target frame dimensions must be non-zero, got {width}x{height}")]
    ZeroFrameDimensions { width: u32, height: u32 },
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

impl From<config::ConfigError> for VisionError {
    fn from(error: config::ConfigError) -> Self {
        VisionError::Configuration(ConfigurationError::Load(error))
    }
}
