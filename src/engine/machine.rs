use std::rc::Rc;
use std::time::Duration;

use tracing::debug;

use super::feedback::{FeedbackCoordinator, FeedbackKind, FeedbackState};
use super::policy::ScoringPolicy;
use super::state::{EntryOutcome, Phase, ProgressionState, Selection};
use super::timer::{Scheduler, Transition};
use crate::content::{Answer, ContentTable, GameRules, LevelEntry};

pub const DEFAULT_SUBMIT_DELAY: Duration = Duration::from_millis(1500);
pub const DEFAULT_FEEDBACK_DISPLAY: Duration = Duration::from_millis(2000);
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

const NEEDS_SELECTION: &str = "Select an answer first!";
const TIME_UP: &str = "Time's up!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Pause between a submission and the transition it causes.
    pub submit_delay: Duration,
    /// How long a feedback message stays up.
    pub feedback_display: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            submit_delay: DEFAULT_SUBMIT_DELAY,
            feedback_display: DEFAULT_FEEDBACK_DISPLAY,
        }
    }
}

/// Something the engine did in response to an operation or the clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Started { total: usize },
    Selected { index: usize, selection: Selection },
    NeedsSelection { index: usize },
    Answered { index: usize, correct: bool, awarded: u32 },
    TimedOut { index: usize },
    Tick { index: usize, remaining: u32 },
    Retry { index: usize },
    Advanced { index: usize },
    Completed { score: u32 },
}

/// Drives one play-through of a content table.
pub struct LevelProgressionEngine {
    table: Rc<ContentTable>,
    rules: GameRules,
    timing: Timing,
    state: ProgressionState,
    feedback: FeedbackCoordinator,
    scheduler: Scheduler,
}

impl LevelProgressionEngine {
    pub fn new(table: Rc<ContentTable>, timing: Timing) -> Self {
        let rules = table.rules.clone();
        Self::with_rules(table, rules, timing)
    }

    /// Plays `table` under `rules` instead of the ones it was authored with.
    pub fn with_rules(table: Rc<ContentTable>, rules: GameRules, timing: Timing) -> Self {
        let state = ProgressionState::new(table.len());
        Self {
            table,
            rules,
            timing,
            state,
            feedback: FeedbackCoordinator::new(timing.feedback_display),
            scheduler: Scheduler::new(),
        }
    }

    pub fn table(&self) -> &ContentTable {
        &self.table
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn state(&self) -> &ProgressionState {
        &self.state
    }

    pub fn feedback(&self) -> &FeedbackState {
        self.feedback.state()
    }

    pub fn is_correct_feedback_visible(&self) -> bool {
        self.feedback.is_correct_visible()
    }

    pub fn is_completed(&self) -> bool {
        self.state.completed
    }

    pub fn current_entry(&self) -> Option<&LevelEntry> {
        self.table.entry(self.state.current_index)
    }

    /// False once a table that uses up its choices has paired `choice_id`.
    pub fn is_choice_available(&self, choice_id: &str) -> bool {
        !(self.rules.consume_choices && self.state.is_choice_used(choice_id))
    }

    pub fn pending_transition(&self) -> Option<Transition> {
        self.scheduler.pending()
    }

    /// Engine clock: time elapsed since creation, as seen through [`Self::elapse`].
    pub fn clock(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn max_score(&self) -> u32 {
        let rewards = self.table.entries.iter().map(|e| e.reward);
        self.rules.reward.max_score(rewards)
    }

    pub fn start(&mut self) -> Vec<EngineEvent> {
        if self.state.phase != Phase::Idle || self.table.is_empty() {
            return Vec::new();
        }
        self.state.phase = Phase::Presenting;
        debug!(game = %self.table.id(), entries = self.table.len(), "game started");
        self.arm_countdown();
        vec![EngineEvent::Started {
            total: self.table.len(),
        }]
    }

    pub fn select_choice(&mut self, choice_id: &str) -> Vec<EngineEvent> {
        if !self.state.accepting_input() {
            return Vec::new();
        }
        let Some(entry) = self.current_entry() else {
            return Vec::new();
        };
        if entry.choice(choice_id).is_none() {
            debug!(game = %self.table.id(), choice = choice_id, "ignoring unknown choice");
            return Vec::new();
        }
        if !self.is_choice_available(choice_id) {
            debug!(game = %self.table.id(), choice = choice_id, "ignoring used choice");
            return Vec::new();
        }

        let selection = Selection::Choice(choice_id.to_string());
        self.state.selection = Some(selection.clone());
        let mut events = vec![EngineEvent::Selected {
            index: self.state.current_index,
            selection,
        }];
        if self.rules.instant {
            events.extend(self.submit());
        }
        events
    }

    /// Replaces the free-text answer for an open entry.
    pub fn enter_text(&mut self, text: &str) -> Vec<EngineEvent> {
        if !self.state.accepting_input() {
            return Vec::new();
        }
        if !self.current_entry().is_some_and(LevelEntry::is_open) {
            return Vec::new();
        }
        let selection = Selection::Text(text.to_string());
        self.state.selection = Some(selection.clone());
        vec![EngineEvent::Selected {
            index: self.state.current_index,
            selection,
        }]
    }

    pub fn submit(&mut self) -> Vec<EngineEvent> {
        if !self.state.accepting_input() {
            return Vec::new();
        }
        let Some(answer) = self.current_entry().map(|e| e.answer.clone()) else {
            return Vec::new();
        };
        let index = self.state.current_index;
        let selection = self.state.selection.clone();

        let correct = match (&answer, &selection) {
            (Answer::Open { min_chars }, Some(Selection::Text(text))) => {
                if text.trim().chars().count() < *min_chars {
                    let message = format!("Write a little more (at least {min_chars} characters).");
                    return self.needs_selection(index, message);
                }
                true
            }
            (Answer::Choice(winner), Some(Selection::Choice(picked))) => winner == picked,
            _ => return self.needs_selection(index, NEEDS_SELECTION.to_string()),
        };

        let outcome = if correct {
            EntryOutcome::Correct
        } else {
            EntryOutcome::Incorrect
        };
        self.resolve(outcome)
    }

    fn needs_selection(&mut self, index: usize, message: String) -> Vec<EngineEvent> {
        self.feedback
            .show(FeedbackKind::Notice, message, self.scheduler.now());
        vec![EngineEvent::NeedsSelection { index }]
    }

    /// Locks the current entry, scores it and schedules what comes next.
    fn resolve(&mut self, outcome: EntryOutcome) -> Vec<EngineEvent> {
        let index = self.state.current_index;
        let Some(entry) = self.table.entry(index) else {
            return Vec::new();
        };

        self.scheduler.cancel();
        self.feedback.stop_countdown();

        let correct = outcome.is_correct();
        let awarded = if correct {
            self.rules
                .reward
                .award(entry.reward, self.state.streak, self.state.score)
        } else {
            0
        };
        let message = match outcome {
            EntryOutcome::Correct => entry
                .feedback_correct
                .clone()
                .unwrap_or_else(|| correct_message(awarded)),
            EntryOutcome::Incorrect => entry
                .feedback_incorrect
                .clone()
                .unwrap_or_else(|| incorrect_message(&self.rules.scoring)),
            EntryOutcome::TimedOut => TIME_UP.to_string(),
        };

        if self.rules.consume_choices && outcome != EntryOutcome::TimedOut {
            if let Some(Selection::Choice(id)) = &self.state.selection {
                self.state.used_choices.push(id.clone());
            }
        }
        self.state.record(outcome);
        self.state.score = self.state.score.saturating_add(awarded);
        self.state.answered = true;
        self.state.phase = Phase::Submitted { correct };

        let kind = if correct {
            FeedbackKind::Correct
        } else {
            FeedbackKind::Incorrect
        };
        self.feedback.show(kind, message, self.scheduler.now());

        let next = if !correct && self.rules.scoring.retries_on_wrong() {
            Transition::Rearm
        } else {
            Transition::Advance
        };
        self.scheduler.arm(self.timing.submit_delay, next);

        debug!(
            game = %self.table.id(),
            index,
            ?outcome,
            awarded,
            score = self.state.score,
            "entry resolved"
        );

        match outcome {
            EntryOutcome::TimedOut => vec![EngineEvent::TimedOut { index }],
            _ => vec![EngineEvent::Answered {
                index,
                correct,
                awarded,
            }],
        }
    }

    /// Moves past an answered entry: to the next one, or to completion.
    ///
    /// Normally fired by the scheduler after the submit delay. Calling it
    /// directly consumes the pending transition so it never runs twice.
    /// A wrong answer in a retry game re-presents the same entry instead.
    pub fn advance(&mut self) -> Vec<EngineEvent> {
        if self.state.completed || !self.state.answered {
            return Vec::new();
        }
        self.scheduler.cancel();

        if self.rules.scoring.retries_on_wrong()
            && self.state.phase == (Phase::Submitted { correct: false })
        {
            return self.rearm();
        }

        if self.state.current_index + 1 >= self.table.len() {
            self.state.completed = true;
            self.state.phase = Phase::Completed;
            self.state.selection = None;
            debug!(game = %self.table.id(), score = self.state.score, "game completed");
            return vec![EngineEvent::Completed {
                score: self.state.score,
            }];
        }

        self.state.current_index += 1;
        self.state.selection = None;
        self.state.answered = false;
        self.state.phase = Phase::Presenting;
        self.feedback.clear();
        self.arm_countdown();
        vec![EngineEvent::Advanced {
            index: self.state.current_index,
        }]
    }

    fn rearm(&mut self) -> Vec<EngineEvent> {
        if self.state.completed || !self.state.answered {
            return Vec::new();
        }
        self.state.selection = None;
        self.state.answered = false;
        self.state.phase = Phase::Presenting;
        self.feedback.clear();
        self.arm_countdown();
        vec![EngineEvent::Retry {
            index: self.state.current_index,
        }]
    }

    fn tick(&mut self) -> Vec<EngineEvent> {
        if !self.state.accepting_input() {
            return Vec::new();
        }
        let Some(remaining) = self.feedback.tick_countdown() else {
            return Vec::new();
        };
        let index = self.state.current_index;
        let mut events = vec![EngineEvent::Tick { index, remaining }];
        if remaining == 0 {
            events.extend(self.resolve(EntryOutcome::TimedOut));
        } else {
            self.scheduler.arm(COUNTDOWN_TICK, Transition::Tick);
        }
        events
    }

    fn arm_countdown(&mut self) {
        if let Some(budget) = self.rules.scoring.countdown() {
            self.feedback.start_countdown(budget);
            self.scheduler.arm(COUNTDOWN_TICK, Transition::Tick);
        }
    }

    /// Lets `dt` pass on the engine clock, firing every transition that
    /// falls due on the way in deadline order.
    pub fn elapse(&mut self, dt: Duration) -> Vec<EngineEvent> {
        let until = self.scheduler.now() + dt;
        let mut events = Vec::new();
        while let Some(transition) = self.scheduler.fire_due(until) {
            self.feedback.expire(self.scheduler.now());
            events.extend(match transition {
                Transition::Tick => self.tick(),
                Transition::Advance => self.advance(),
                Transition::Rearm => self.rearm(),
            });
        }
        self.scheduler.advance_to(until);
        self.feedback.expire(until);
        events
    }

    /// Starts over from the first entry. The caller calls [`Self::start`] again.
    pub fn reset(&mut self) {
        self.scheduler.cancel();
        self.feedback.clear();
        self.state = ProgressionState::new(self.table.len());
        debug!(game = %self.table.id(), "game reset");
    }
}

fn correct_message(awarded: u32) -> String {
    if awarded > 0 {
        format!("Correct! +{awarded}")
    } else {
        "Correct!".to_string()
    }
}

fn incorrect_message(scoring: &ScoringPolicy) -> String {
    if scoring.retries_on_wrong() {
        "Not quite, try again!".to_string()
    } else {
        "Not quite!".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::parse_table;
    use crate::engine::RewardRule;
    use std::path::Path;

    const DELAY: Duration = DEFAULT_SUBMIT_DELAY;

    /// Five entries with choices "a" (right) and "b" (wrong), reward 2 each.
    fn table(policy: &str) -> Rc<ContentTable> {
        let mut content = format!("[meta]\nid = \"test\"\ntitle = \"Test\"\n\n[policy]\n{policy}\n");
        for n in 1..=5 {
            content.push_str(&format!(
                "\n[[entry]]\nprompt = \"Question {n}\"\nreward = 2\nanswer = \"a\"\n  [[entry.choice]]\n  id = \"a\"\n  text = \"Right\"\n  [[entry.choice]]\n  id = \"b\"\n  text = \"Wrong\"\n"
            ));
        }
        Rc::new(parse_table(&content, Path::new("test.toml")).unwrap())
    }

    fn journal() -> Rc<ContentTable> {
        let content = r#"
[meta]
id = "journal"
title = "Journal"
family = "journal"

[[entry]]
prompt = "What makes you feel calm?"
min_chars = 5
reward = 3

[[entry]]
prompt = "Who do you talk to when you are worried?"
reward = 3
"#;
        Rc::new(parse_table(content, Path::new("journal.toml")).unwrap())
    }

    fn engine(policy: &str) -> LevelProgressionEngine {
        let mut engine = LevelProgressionEngine::new(table(policy), Timing::default());
        engine.start();
        engine
    }

    fn answer(engine: &mut LevelProgressionEngine, choice: &str) -> Vec<EngineEvent> {
        let mut events = engine.select_choice(choice);
        events.extend(engine.submit());
        events
    }

    #[test]
    fn test_all_correct_completes_with_full_score() {
        let mut engine = engine("kind = \"retry_on_wrong\"");
        for i in 0..5 {
            assert_eq!(engine.state().current_index, i);
            let events = answer(&mut engine, "a");
            assert!(events.contains(&EngineEvent::Answered {
                index: i,
                correct: true,
                awarded: 2
            }));
            assert!(!engine.is_completed());
            engine.elapse(DELAY);
        }
        assert!(engine.is_completed());
        assert_eq!(engine.state().phase, Phase::Completed);
        assert_eq!(engine.state().score, 10);
        assert_eq!(engine.state().score, engine.max_score());
        assert_eq!(engine.state().correct_count, 5);
        assert_eq!(engine.state().best_streak, 5);
    }

    #[test]
    fn test_submit_without_selection_changes_nothing() {
        let mut engine = engine("kind = \"retry_on_wrong\"");
        let before = engine.state().clone();

        let events = engine.submit();
        assert_eq!(events, vec![EngineEvent::NeedsSelection { index: 0 }]);
        assert_eq!(engine.state(), &before);
        assert_eq!(engine.feedback().kind, Some(FeedbackKind::Notice));
        assert!(engine.pending_transition().is_none());
    }

    #[test]
    fn test_unknown_choice_is_ignored() {
        let mut engine = engine("kind = \"retry_on_wrong\"");
        assert!(engine.select_choice("zzz").is_empty());
        assert_eq!(engine.state().selection, None);
    }

    #[test]
    fn test_nothing_happens_before_start() {
        let mut engine = LevelProgressionEngine::new(table(""), Timing::default());
        assert_eq!(engine.state().phase, Phase::Idle);
        assert!(engine.select_choice("a").is_empty());
        assert!(engine.submit().is_empty());
        assert_eq!(engine.start(), vec![EngineEvent::Started { total: 5 }]);
        assert!(engine.start().is_empty());
    }

    #[test]
    fn test_retry_on_wrong_keeps_index_and_rearms() {
        let mut engine = engine("kind = \"retry_on_wrong\"");
        answer(&mut engine, "b");
        assert!(engine.state().answered);
        assert_eq!(engine.state().score, 0);
        assert_eq!(engine.pending_transition(), Some(Transition::Rearm));

        // Locked until the delay elapses
        assert!(engine.select_choice("a").is_empty());

        let events = engine.elapse(DELAY);
        assert_eq!(events, vec![EngineEvent::Retry { index: 0 }]);
        assert_eq!(engine.state().current_index, 0);
        assert!(!engine.state().answered);
        assert_eq!(engine.state().selection, None);

        answer(&mut engine, "a");
        assert_eq!(engine.state().score, 2);
        assert_eq!(engine.state().outcomes[0], Some(EntryOutcome::Correct));
        engine.elapse(DELAY);
        assert_eq!(engine.state().current_index, 1);
    }

    #[test]
    fn test_move_on_wrong_advances_with_no_credit() {
        let mut engine = engine("kind = \"move_on_wrong\"");
        answer(&mut engine, "b");
        let events = engine.elapse(DELAY);
        assert_eq!(events, vec![EngineEvent::Advanced { index: 1 }]);
        assert_eq!(engine.state().score, 0);
        assert_eq!(engine.state().outcomes[0], Some(EntryOutcome::Incorrect));
    }

    #[test]
    fn test_advance_always_moves_on_regardless() {
        let mut engine = engine("kind = \"advance_always\"");
        answer(&mut engine, "b");
        engine.elapse(DELAY);
        assert_eq!(engine.state().current_index, 1);
        answer(&mut engine, "a");
        engine.elapse(DELAY);
        assert_eq!(engine.state().current_index, 2);
        assert_eq!(engine.state().score, 2);
    }

    #[test]
    fn test_second_submit_is_a_noop() {
        let mut engine = engine("kind = \"retry_on_wrong\"");
        answer(&mut engine, "a");
        assert!(engine.submit().is_empty());
        assert!(engine.select_choice("b").is_empty());
        assert_eq!(engine.state().score, 2);
        assert_eq!(engine.state().selection, Some(Selection::Choice("a".into())));
    }

    #[test]
    fn test_completion_is_terminal() {
        let mut engine = engine("kind = \"move_on_wrong\"");
        for _ in 0..5 {
            answer(&mut engine, "a");
            engine.elapse(DELAY);
        }
        assert!(engine.is_completed());
        assert!(engine.select_choice("a").is_empty());
        assert!(engine.submit().is_empty());
        assert!(engine.advance().is_empty());
        assert!(engine.elapse(Duration::from_secs(60)).is_empty());
        assert_eq!(engine.state().score, 10);
        assert_eq!(engine.state().current_index, 4);
    }

    #[test]
    fn test_advance_waits_for_delay() {
        let mut engine = engine("kind = \"retry_on_wrong\"");
        answer(&mut engine, "a");
        assert!(engine.elapse(DELAY - Duration::from_millis(1)).is_empty());
        assert_eq!(engine.state().current_index, 0);
        assert_eq!(
            engine.elapse(Duration::from_millis(1)),
            vec![EngineEvent::Advanced { index: 1 }]
        );
    }

    #[test]
    fn test_manual_advance_consumes_pending_transition() {
        let mut engine = engine("kind = \"retry_on_wrong\"");
        assert!(engine.advance().is_empty());

        answer(&mut engine, "a");
        assert_eq!(engine.advance(), vec![EngineEvent::Advanced { index: 1 }]);
        assert!(engine.pending_transition().is_none());
        assert!(engine.elapse(DELAY * 4).is_empty());
        assert_eq!(engine.state().current_index, 1);
    }

    #[test]
    fn test_manual_advance_after_wrong_answer_retries() {
        let mut engine = engine("kind = \"retry_on_wrong\"");
        answer(&mut engine, "b");

        assert_eq!(engine.advance(), vec![EngineEvent::Retry { index: 0 }]);
        assert_eq!(engine.state().current_index, 0);
        assert!(!engine.state().answered);
        assert!(engine.pending_transition().is_none());
        assert!(engine.elapse(DELAY * 2).is_empty());

        answer(&mut engine, "a");
        assert_eq!(engine.advance(), vec![EngineEvent::Advanced { index: 1 }]);
        assert_eq!(engine.state().score, 2);
    }

    #[test]
    fn test_manual_advance_after_wrong_answer_moves_on_without_retry() {
        let mut engine = engine("kind = \"move_on_wrong\"");
        answer(&mut engine, "b");
        assert_eq!(engine.advance(), vec![EngineEvent::Advanced { index: 1 }]);
    }

    #[test]
    fn test_huge_rewards_do_not_overflow() {
        let content = r#"
[meta]
id = "huge"
title = "Huge"

[policy]
kind = "move_on_wrong"
reward = "streak"

[[entry]]
prompt = "One"
reward = 4294967295
  [[entry.choice]]
  text = "A"
  correct = true

[[entry]]
prompt = "Two"
reward = 4294967295
  [[entry.choice]]
  text = "A"
  correct = true
"#;
        let table = Rc::new(parse_table(content, Path::new("huge.toml")).unwrap());
        assert_eq!(table.max_score(), u32::MAX);

        let mut engine = LevelProgressionEngine::new(table, Timing::default());
        engine.start();
        for _ in 0..2 {
            answer(&mut engine, "1");
            engine.elapse(DELAY);
        }
        assert!(engine.is_completed());
        assert_eq!(engine.state().score, u32::MAX);
    }

    #[test]
    fn test_timeout_counts_incorrect_and_advances_once() {
        let mut engine = engine("kind = \"timer_forced\"\ncountdown_secs = 5\ninstant = true");
        // First two entries answered right away
        for _ in 0..2 {
            engine.select_choice("a");
            engine.elapse(DELAY);
        }
        assert_eq!(engine.state().current_index, 2);
        assert_eq!(engine.feedback().time_remaining, Some(5));

        let events = engine.elapse(Duration::from_secs(4));
        assert_eq!(events.len(), 4);
        assert_eq!(engine.feedback().time_remaining, Some(1));

        let events = engine.elapse(Duration::from_secs(1));
        assert!(events.contains(&EngineEvent::TimedOut { index: 2 }));
        assert_eq!(engine.state().outcomes[2], Some(EntryOutcome::TimedOut));
        assert_eq!(engine.feedback().message, "Time's up!");

        let events = engine.elapse(DELAY);
        let advances = events
            .iter()
            .filter(|e| matches!(e, EngineEvent::Advanced { .. }))
            .count();
        assert_eq!(advances, 1);
        assert_eq!(engine.state().current_index, 3);
        assert_eq!(engine.state().score, 4);
        assert_eq!(engine.feedback().time_remaining, Some(5));
    }

    #[test]
    fn test_answer_before_expiry_cancels_countdown() {
        let mut engine = engine("kind = \"timer_forced\"\ncountdown_secs = 5\ninstant = true");
        engine.elapse(Duration::from_secs(3));
        engine.select_choice("b");
        assert_eq!(engine.feedback().time_remaining, None);
        assert_eq!(engine.pending_transition(), Some(Transition::Advance));

        // Well past the old deadline: one advance, no timeout
        let events = engine.elapse(Duration::from_secs(3));
        assert!(!events.iter().any(|e| matches!(e, EngineEvent::TimedOut { .. })));
        assert_eq!(engine.state().current_index, 1);
        assert_eq!(engine.state().outcomes[0], Some(EntryOutcome::Incorrect));
    }

    #[test]
    fn test_unattended_timed_game_runs_to_completion() {
        let mut engine = engine("kind = \"timer_forced\"\ncountdown_secs = 5");
        let events = engine.elapse(Duration::from_secs(60));
        let timeouts = events
            .iter()
            .filter(|e| matches!(e, EngineEvent::TimedOut { .. }))
            .count();
        assert_eq!(timeouts, 5);
        assert!(engine.is_completed());
        assert_eq!(engine.state().score, 0);
        assert_eq!(events.last(), Some(&EngineEvent::Completed { score: 0 }));
    }

    #[test]
    fn test_streak_rewards() {
        let mut engine = engine("kind = \"move_on_wrong\"\nreward = \"streak\"");
        let mut awarded = Vec::new();
        for choice in ["a", "a", "a", "a", "b"] {
            for event in answer(&mut engine, choice) {
                if let EngineEvent::Answered { awarded: a, .. } = event {
                    awarded.push(a);
                }
            }
            engine.elapse(DELAY);
        }
        assert_eq!(awarded, vec![2, 2, 2, 4, 0]);
        assert_eq!(engine.state().streak, 0);
        assert_eq!(engine.state().best_streak, 4);
        assert_eq!(engine.max_score(), 2 + 2 + 2 + 4 + 4);
    }

    #[test]
    fn test_capped_rewards() {
        let mut engine = engine("kind = \"move_on_wrong\"\nreward = \"capped\"\ncap = 5");
        for _ in 0..5 {
            answer(&mut engine, "a");
            engine.elapse(DELAY);
        }
        assert_eq!(engine.state().score, 5);
        assert_eq!(engine.max_score(), 5);
    }

    #[test]
    fn test_journal_accepts_any_long_enough_text() {
        let mut engine = LevelProgressionEngine::new(journal(), Timing::default());
        engine.start();

        engine.enter_text("  hi  ");
        assert_eq!(engine.submit(), vec![EngineEvent::NeedsSelection { index: 0 }]);
        assert!(!engine.state().answered);
        assert!(engine.feedback().message.contains("at least 5"));

        engine.enter_text("Reading a book");
        engine.submit();
        assert_eq!(engine.state().score, 3);
        engine.elapse(DELAY);

        // Blank text is treated as no selection
        engine.enter_text("   ");
        assert_eq!(engine.submit(), vec![EngineEvent::NeedsSelection { index: 1 }]);
        engine.enter_text("My mum");
        engine.submit();
        engine.elapse(DELAY);
        assert!(engine.is_completed());
        assert_eq!(engine.state().score, 6);
    }

    #[test]
    fn test_choices_ignored_on_open_entries_and_text_on_choice_entries() {
        let mut engine = LevelProgressionEngine::new(journal(), Timing::default());
        engine.start();
        assert!(engine.select_choice("a").is_empty());

        let mut quiz = self::engine("kind = \"retry_on_wrong\"");
        assert!(quiz.enter_text("a").is_empty());
    }

    fn matching() -> Rc<ContentTable> {
        let content = r#"
[meta]
id = "match-roles"
title = "Match Roles"
family = "match"

[[option]]
id = "pilot"
text = "Flies planes"
[[option]]
id = "chef"
text = "Cooks food"
[[option]]
id = "doctor"
text = "Treats patients"
[[option]]
id = "teacher"
text = "Runs a classroom"

[[entry]]
prompt = "Hospital"
answer = "doctor"
[[entry]]
prompt = "Kitchen"
answer = "chef"
[[entry]]
prompt = "Cockpit"
answer = "pilot"
"#;
        Rc::new(parse_table(content, Path::new("match.toml")).unwrap())
    }

    #[test]
    fn test_matching_locks_used_options() {
        let mut engine = LevelProgressionEngine::new(matching(), Timing::default());
        engine.start();

        // One attempt per item: a wrong pairing still moves on
        answer(&mut engine, "chef");
        assert_eq!(engine.state().outcomes[0], Some(EntryOutcome::Incorrect));
        assert!(!engine.is_choice_available("chef"));
        engine.elapse(DELAY);
        assert_eq!(engine.state().current_index, 1);

        assert!(engine.select_choice("chef").is_empty());
        assert_eq!(engine.state().selection, None);
        assert_eq!(engine.submit(), vec![EngineEvent::NeedsSelection { index: 1 }]);

        answer(&mut engine, "teacher");
        engine.elapse(DELAY);
        assert!(!engine.is_choice_available("teacher"));
        assert!(engine.is_choice_available("pilot"));
        assert!(!engine.is_completed());

        answer(&mut engine, "pilot");
        engine.elapse(DELAY);
        assert!(engine.is_completed());
        assert_eq!(engine.state().score, 1);
        assert_eq!(engine.state().used_choices, vec!["chef", "teacher", "pilot"]);
        assert!(engine.state().outcomes.iter().all(Option::is_some));
    }

    #[test]
    fn test_matching_replay_unlocks_options() {
        let mut engine = LevelProgressionEngine::new(matching(), Timing::default());
        engine.start();
        answer(&mut engine, "doctor");
        assert!(!engine.is_choice_available("doctor"));

        engine.reset();
        engine.start();
        assert!(engine.is_choice_available("doctor"));
        answer(&mut engine, "doctor");
        assert_eq!(engine.state().score, 1);
    }

    #[test]
    fn test_other_tables_never_lock_choices() {
        let mut engine = engine("kind = \"move_on_wrong\"");
        answer(&mut engine, "b");
        engine.elapse(DELAY);
        assert!(engine.is_choice_available("b"));
        assert!(engine.state().used_choices.is_empty());
        assert_eq!(answer(&mut engine, "b").len(), 2);
    }

    #[test]
    fn test_feedback_clears_on_its_own() {
        let timing = Timing {
            submit_delay: Duration::from_secs(3),
            feedback_display: Duration::from_secs(1),
        };
        let mut engine = LevelProgressionEngine::new(table("kind = \"retry_on_wrong\""), timing);
        engine.start();
        answer(&mut engine, "a");
        assert!(engine.is_correct_feedback_visible());

        engine.elapse(Duration::from_secs(1));
        assert!(!engine.feedback().visible);
        // Display expiry does not move progression
        assert_eq!(engine.state().current_index, 0);
        assert!(engine.state().answered);
    }

    #[test]
    fn test_reset_starts_over() {
        let mut engine = engine("kind = \"retry_on_wrong\"");
        answer(&mut engine, "a");
        engine.elapse(DELAY);
        answer(&mut engine, "a");

        engine.reset();
        assert_eq!(engine.state(), &ProgressionState::new(5));
        assert!(engine.pending_transition().is_none());
        assert!(!engine.feedback().visible);
        assert_eq!(engine.start(), vec![EngineEvent::Started { total: 5 }]);
    }

    #[test]
    fn test_rules_override() {
        let rules = GameRules {
            scoring: ScoringPolicy::MoveOnWrong,
            reward: RewardRule::Flat,
            ..GameRules::default()
        };
        let mut engine = LevelProgressionEngine::with_rules(table(""), rules, Timing::default());
        engine.start();
        answer(&mut engine, "b");
        engine.elapse(DELAY);
        assert_eq!(engine.state().current_index, 1);
    }
}
