//! App-specific configuration extensions.
//!
//! This module provides hotkey support on top of the core Config.

use global_hotkey::hotkey::{Code, HotKey, Modifiers};
use hark_core::Config;
use tracing::warn;

/// Default hotkey: Shift+Alt+M
pub fn default_hotkey() -> HotKey {
    HotKey::new(Some(Modifiers::SHIFT | Modifiers::ALT), Code::KeyM)
}

/// Extension trait for Config to handle hotkeys.
pub trait ConfigExt {
    /// Get the hotkey, parsing from config or using default.
    fn hotkey(&self) -> HotKey;
}

impl ConfigExt for Config {
    fn hotkey(&self) -> HotKey {
        let Some(hotkey) = self.hotkey.as_deref() else {
            return default_hotkey();
        };
        match hotkey.parse() {
            Ok(hotkey) => hotkey,
            Err(e) => {
                warn!(hotkey, error = %e, "Invalid hotkey in config, using default");
                default_hotkey()
            }
        }
    }
}
