// Re-export from sub-crates
pub use hark_audio::{CaptureError, CaptureSession};
pub use hark_core::{
    APP_NAME, APP_NAME_PRETTY, Config, ConfigManager, DEFAULT_LOG_LEVEL, LevelDisplay, LevelEvent,
    RunningController, RunningState,
};

// App-specific modules
pub mod config_ext;
pub mod event;
pub mod icon;
pub mod menu;

// Version from this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
