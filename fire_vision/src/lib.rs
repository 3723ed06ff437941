// THEORY:
// This file is the main entry point for the `fire_vision` library crate. It
// exposes the `FirePipeline` and its associated data structures
// (`PipelineConfig`, `FrameReport`, `AlarmState`, etc.) as the high-level
// interface of the detector, plus the `FireSession` controller that runs a
// pipeline against a live frame stream.
//
// The per-frame stages live in `core_modules` and are public for callers that
// want a single stage (a mask for a debug overlay, say), but most consumers only
// need `pipeline`, `session` and `alert`.

pub mod alert;
pub mod config;
pub mod core_modules;
pub mod error;
pub mod pipeline;
pub mod session;

pub use alert::{AlarmSounder, AlertBus, AlertEvent, AlertSink, AudioPlayer};
pub use config::PipelineConfig;
pub use core_modules::frame::frame::Frame;
pub use error::{ConfigurationError, FrameError, VisionError};
pub use pipeline::{AlarmState, FirePipeline, FrameReport, FrameResult};
pub use session::{Command, FireSession, SessionHandle, SessionSnapshot};
