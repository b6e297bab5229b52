//! Running-state controller. The only path through which the capture
//! session is started or stopped.

use tracing::{info, warn};

use crate::state::RunningState;

/// Something that can be started and stopped, normally the capture session.
pub trait CaptureControl {
    /// Returns `false` if the session could not be started. Having nothing
    /// to start is not a failure.
    fn start(&mut self) -> bool;
    fn stop(&mut self);
}

/// Owns the running flag and the session it governs.
pub struct RunningController<C> {
    state: RunningState,
    session: C,
}

impl<C: CaptureControl> RunningController<C> {
    pub fn new(session: C) -> Self {
        Self {
            state: RunningState::Stopped,
            session,
        }
    }

    pub fn state(&self) -> RunningState {
        self.state
    }

    pub fn session(&self) -> &C {
        &self.session
    }

    /// Move to `state`. Returns `None` when already there or when the
    /// session refused to start, otherwise the new state.
    pub fn set(&mut self, state: RunningState) -> Option<RunningState> {
        if self.state == state {
            return None;
        }
        match state {
            RunningState::Running => {
                if !self.session.start() {
                    warn!("Capture did not start, staying stopped");
                    return None;
                }
            }
            RunningState::Stopped => self.session.stop(),
        }
        self.state = state;
        info!(state = ?state, "Running state changed");
        Some(state)
    }

    /// Flip the running flag, as the toggle button does. Returns the
    /// resulting state.
    pub fn toggle(&mut self) -> RunningState {
        self.set(self.state.toggled());
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Start,
        Stop,
    }

    #[derive(Default)]
    struct MockSession {
        calls: Vec<Call>,
        fail_start: bool,
    }

    impl CaptureControl for MockSession {
        fn start(&mut self) -> bool {
            self.calls.push(Call::Start);
            !self.fail_start
        }

        fn stop(&mut self) {
            self.calls.push(Call::Stop);
        }
    }

    #[test]
    fn test_starts_stopped_without_side_effects() {
        let controller = RunningController::new(MockSession::default());
        assert_eq!(controller.state(), RunningState::Stopped);
        assert!(controller.session().calls.is_empty());
    }

    #[test]
    fn test_toggle_starts_then_stops() {
        let mut controller = RunningController::new(MockSession::default());

        assert_eq!(controller.toggle(), RunningState::Running);
        assert_eq!(controller.session().calls, vec![Call::Start]);

        assert_eq!(controller.toggle(), RunningState::Stopped);
        assert_eq!(controller.session().calls, vec![Call::Start, Call::Stop]);
    }

    #[test]
    fn test_quick_toggle_sequence_alternates() {
        let mut controller = RunningController::new(MockSession::default());
        controller.set(RunningState::Running);

        controller.toggle();
        controller.toggle();

        assert_eq!(controller.state(), RunningState::Running);
        assert_eq!(
            controller.session().calls,
            vec![Call::Start, Call::Stop, Call::Start]
        );
    }

    #[test]
    fn test_setting_current_state_is_noop() {
        let mut controller = RunningController::new(MockSession::default());

        assert_eq!(controller.set(RunningState::Stopped), None);
        assert!(controller.session().calls.is_empty());

        assert_eq!(
            controller.set(RunningState::Running),
            Some(RunningState::Running)
        );
        assert_eq!(controller.set(RunningState::Running), None);
        assert_eq!(controller.session().calls, vec![Call::Start]);
    }

    #[test]
    fn test_failed_start_keeps_state_stopped() {
        let mut controller = RunningController::new(MockSession {
            fail_start: true,
            ..Default::default()
        });

        assert_eq!(controller.set(RunningState::Running), None);
        assert_eq!(controller.toggle(), RunningState::Stopped);
        assert_eq!(controller.state().button_label(), "Start");
        // Each attempt reaches the session, no stop is ever issued.
        assert_eq!(controller.session().calls, vec![Call::Start, Call::Start]);
    }
}
