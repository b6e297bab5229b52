//! Level change notifications.
//!
//! These events travel from the audio context to whoever renders them,
//! without depending on any specific UI framework.

use std::sync::mpsc::Sender;

/// A level value that differs from the previous one on its stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LevelEvent {
    /// Average power level in dB
    AveragePower(f32),
    /// Peak hold level in dB
    PeakHold(f32),
}

/// Receiver end of the level publisher. `send` is called from the audio
/// thread and must not block.
pub trait LevelSink: Send {
    fn send(&self, event: LevelEvent);
}

impl LevelSink for Sender<LevelEvent> {
    fn send(&self, event: LevelEvent) {
        // A dropped receiver just means nobody is watching anymore.
        Sender::send(self, event).ok();
    }
}
