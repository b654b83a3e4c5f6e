use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Correct,
    Incorrect,
    /// Validation nudge, e.g. submitting with nothing selected.
    Notice,
}

/// What the shell should display right now. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackState {
    pub visible: bool,
    pub kind: Option<FeedbackKind>,
    pub message: String,
    /// Whole seconds left on the current entry, for timed games.
    pub time_remaining: Option<u32>,
}

/// Owns the single visible message and the optional countdown.
///
/// Messages hide themselves `display` after being shown; that is display
/// state only and never feeds back into scoring or progression.
#[derive(Debug)]
pub struct FeedbackCoordinator {
    state: FeedbackState,
    display: Duration,
    hide_at: Option<Duration>,
}

impl FeedbackCoordinator {
    pub fn new(display: Duration) -> Self {
        Self {
            state: FeedbackState::default(),
            display,
            hide_at: None,
        }
    }

    pub fn state(&self) -> &FeedbackState {
        &self.state
    }

    pub fn show(&mut self, kind: FeedbackKind, message: impl Into<String>, now: Duration) {
        self.state.visible = true;
        self.state.kind = Some(kind);
        self.state.message = message.into();
        self.hide_at = Some(now + self.display);
    }

    /// Hides the message once its display time has passed. Returns true if
    /// something was hidden.
    pub fn expire(&mut self, now: Duration) -> bool {
        match self.hide_at {
            Some(at) if at <= now => {
                self.hide_message();
                true
            }
            _ => false,
        }
    }

    fn hide_message(&mut self) {
        self.state.visible = false;
        self.state.kind = None;
        self.state.message.clear();
        self.hide_at = None;
    }

    /// Clears the message and any countdown.
    pub fn clear(&mut self) {
        self.hide_message();
        self.state.time_remaining = None;
    }

    pub fn start_countdown(&mut self, budget: Duration) {
        let secs = budget.as_secs() + u64::from(budget.subsec_nanos() > 0);
        self.state.time_remaining = Some(secs.min(u64::from(u32::MAX)) as u32);
    }

    /// One second passes. Returns the seconds left, or `None` when no
    /// countdown is running.
    pub fn tick_countdown(&mut self) -> Option<u32> {
        let remaining = self.state.time_remaining.as_mut()?;
        *remaining = remaining.saturating_sub(1);
        Some(*remaining)
    }

    /// Stops the countdown, returning the seconds that were left.
    pub fn stop_countdown(&mut self) -> Option<u32> {
        self.state.time_remaining.take()
    }

    pub fn is_correct_visible(&self) -> bool {
        self.state.visible && self.state.kind == Some(FeedbackKind::Correct)
    }
}
