//! Core types for hark.
//!
//! Everything here is independent of the audio backend and the UI toolkit:
//! configuration, level values and their display, the deduplicating level
//! publisher, and the start/stop controller.

mod buffer;
mod config;
mod control;
mod display;
mod event;
mod publish;
mod state;

pub use buffer::{ChannelLevels, PowerLevel, SampleBuffer, SampleBufferCallback};
pub use config::{Config, ConfigManager};
pub use control::{CaptureControl, RunningController};
pub use display::{LevelDisplay, PLACEHOLDER};
pub use event::{LevelEvent, LevelSink};
pub use publish::{Dedup, LevelPublisher};
pub use state::RunningState;

/// Application name
pub const APP_NAME: &str = "hark";

/// Pretty application name for display
pub const APP_NAME_PRETTY: &str = "Hark";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";
