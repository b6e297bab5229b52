//! Microphone capture and level analysis for hark.

mod analyzer;
mod session;

pub use analyzer::{AnalyzerParams, ChannelMeter, LevelAnalyzer};
pub use session::{CaptureError, CaptureSession};
