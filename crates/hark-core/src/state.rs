//! Running state of the meter.

/// Whether the capture session is supposed to be delivering levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunningState {
    /// Not capturing. The initial state.
    #[default]
    Stopped,
    /// Capturing and publishing levels.
    Running,
}

impl RunningState {
    pub fn is_running(self) -> bool {
        self == RunningState::Running
    }

    /// The opposite state, used by the toggle control.
    pub fn toggled(self) -> Self {
        match self {
            RunningState::Stopped => RunningState::Running,
            RunningState::Running => RunningState::Stopped,
        }
    }

    /// Label of the toggle control while in this state.
    pub fn button_label(self) -> &'static str {
        match self {
            RunningState::Stopped => "Start",
            RunningState::Running => "Stop",
        }
    }
}

impl From<bool> for RunningState {
    fn from(running: bool) -> Self {
        if running {
            RunningState::Running
        } else {
            RunningState::Stopped
        }
    }
}
