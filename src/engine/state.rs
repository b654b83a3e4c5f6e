/// The player's current pick for the entry on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Choice(String),
    Text(String),
}

/// Where the current play-through is in the entry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Presenting,
    Submitted { correct: bool },
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    Correct,
    Incorrect,
    TimedOut,
}

impl EntryOutcome {
    pub fn is_correct(&self) -> bool {
        matches!(self, EntryOutcome::Correct)
    }
}

/// Mutable per-run state. Only the engine's transitions touch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressionState {
    pub phase: Phase,
    pub current_index: usize,
    pub selection: Option<Selection>,
    pub answered: bool,
    pub score: u32,
    pub completed: bool,
    pub correct_count: u32,
    pub streak: u32,
    pub best_streak: u32,
    /// Latest outcome per entry; retried entries keep their final result.
    pub outcomes: Vec<Option<EntryOutcome>>,
    /// Choices already paired with an entry, for tables that use them up.
    pub used_choices: Vec<String>,
}

impl ProgressionState {
    pub fn new(total: usize) -> Self {
        Self {
            phase: Phase::Idle,
            current_index: 0,
            selection: None,
            answered: false,
            score: 0,
            completed: false,
            correct_count: 0,
            streak: 0,
            best_streak: 0,
            outcomes: vec![None; total],
            used_choices: Vec::new(),
        }
    }

    pub fn is_choice_used(&self, id: &str) -> bool {
        self.used_choices.iter().any(|used| used == id)
    }

    /// True while a selection or submission can change anything.
    pub fn accepting_input(&self) -> bool {
        self.phase == Phase::Presenting && !self.answered && !self.completed
    }

    pub(crate) fn record(&mut self, outcome: EntryOutcome) {
        if let Some(slot) = self.outcomes.get_mut(self.current_index) {
            *slot = Some(outcome);
        }
        if outcome.is_correct() {
            self.correct_count += 1;
            self.streak += 1;
            self.best_streak = self.best_streak.max(self.streak);
        } else {
            self.streak = 0;
        }
    }
}
