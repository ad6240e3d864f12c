//! Editor controller state machine.
//!
//! `Uninitialized → Mounted → (Idle ⇄ Updating)`, plus `Disposed` once the
//! host tears the editor down. At most one update runs at a time; text that
//! arrives while an update is in flight replaces any earlier pending text, so
//! the newest value always wins.

/// Lifecycle state of the editor controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    #[default]
    Uninitialized,
    /// Widget and preview exist; the initial update has not started.
    Mounted,
    Idle,
    Updating,
    Disposed,
}

impl ControllerState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Mounted => "mounted",
            Self::Idle => "idle",
            Self::Updating => "updating",
            Self::Disposed => "disposed",
        }
    }
}

/// Pure transition logic; the browser controller performs the side effects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerMachine {
    state: ControllerState,
    pending: Option<String>,
}

impl ControllerMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Text waiting for the in-flight update to finish.
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// `Uninitialized → Mounted`. Returns false from any other state.
    pub fn mount(&mut self) -> bool {
        if self.state == ControllerState::Uninitialized {
            self.state = ControllerState::Mounted;
            true
        } else {
            false
        }
    }

    /// Ask for an update with `text`.
    ///
    /// Returns the text to render now, or `None` when the request was parked
    /// behind an in-flight update or the controller cannot update.
    pub fn request(&mut self, text: String) -> Option<String> {
        match self.state {
            ControllerState::Mounted | ControllerState::Idle => {
                self.state = ControllerState::Updating;
                Some(text)
            }
            ControllerState::Updating => {
                if self.pending.replace(text).is_some() {
                    tracing::trace!("dropping superseded pending text");
                }
                None
            }
            ControllerState::Uninitialized | ControllerState::Disposed => None,
        }
    }

    /// The in-flight update finished (successfully or not).
    ///
    /// Returns the pending text to render next, staying in `Updating`, or
    /// moves to `Idle` and returns `None`.
    pub fn complete(&mut self) -> Option<String> {
        if self.state != ControllerState::Updating {
            return None;
        }
        match self.pending.take() {
            Some(next) => Some(next),
            None => {
                self.state = ControllerState::Idle;
                None
            }
        }
    }

    /// Enter `Disposed`, dropping any pending text.
    pub fn dispose(&mut self) {
        self.pending = None;
        self.state = ControllerState::Disposed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mounted() -> ControllerMachine {
        let mut m = ControllerMachine::new();
        assert!(m.mount());
        m
    }

    #[test]
    fn test_mount_only_once() {
        let mut m = ControllerMachine::new();
        assert_eq!(m.state(), ControllerState::Uninitialized);
        assert!(m.mount());
        assert_eq!(m.state(), ControllerState::Mounted);
        assert!(!m.mount());
    }

    #[test]
    fn test_request_before_mount_is_ignored() {
        let mut m = ControllerMachine::new();
        assert_eq!(m.request("x".into()), None);
        assert_eq!(m.state(), ControllerState::Uninitialized);
    }

    #[test]
    fn test_idle_updating_cycle() {
        let mut m = mounted();
        assert_eq!(m.request("a".into()).as_deref(), Some("a"));
        assert_eq!(m.state(), ControllerState::Updating);
        assert_eq!(m.complete(), None);
        assert_eq!(m.state(), ControllerState::Idle);

        assert_eq!(m.request("b".into()).as_deref(), Some("b"));
        assert_eq!(m.state(), ControllerState::Updating);
    }

    #[test]
    fn test_newest_pending_text_wins() {
        let mut m = mounted();
        m.request("a".into());
        assert_eq!(m.request("b".into()), None);
        assert_eq!(m.request("c".into()), None);
        assert_eq!(m.pending(), Some("c"));

        assert_eq!(m.complete().as_deref(), Some("c"));
        assert_eq!(m.state(), ControllerState::Updating);
        assert_eq!(m.complete(), None);
        assert_eq!(m.state(), ControllerState::Idle);
    }

    #[test]
    fn test_dispose_stops_updates() {
        let mut m = mounted();
        m.request("a".into());
        m.request("b".into());
        m.dispose();
        assert_eq!(m.complete(), None);
        assert_eq!(m.request("c".into()), None);
        assert_eq!(m.state(), ControllerState::Disposed);
        assert_eq!(m.state().as_str(), "disposed");
    }
}
