//! Application events for the tao event loop.

use global_hotkey::GlobalHotKeyEvent;
use hark_core::{LevelEvent, LevelSink};
use tao::event_loop::EventLoopProxy;
use tray_icon::menu::MenuEvent;

/// Events for the tao event loop, extending the core LevelEvent.
#[derive(Debug, Clone)]
pub enum HarkEvent {
    /// A deduplicated level change from the audio thread
    Level(LevelEvent),
    /// A tray menu item was clicked
    Menu(MenuEvent),
    /// The global hotkey was pressed or released
    HotKey(GlobalHotKeyEvent),
}

/// Posts level changes onto the UI thread. Sending never blocks the audio
/// thread.
pub struct ProxySink(EventLoopProxy<HarkEvent>);

impl ProxySink {
    pub fn new(proxy: EventLoopProxy<HarkEvent>) -> Self {
        Self(proxy)
    }
}

impl LevelSink for ProxySink {
    fn send(&self, event: LevelEvent) {
        // Fails only once the event loop has exited.
        self.0.send_event(HarkEvent::Level(event)).ok();
    }
}
