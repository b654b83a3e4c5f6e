use serde::Deserialize;

use crate::engine::{RewardRule, ScoringPolicy};
use crate::rewards::GameMeta;

/// Kind of mini-game a table was authored for. Only used to pick default
/// rules when a file has no `[policy]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    #[default]
    Quiz,
    Story,
    Reflex,
    Poster,
    Journal,
    Badge,
    /// Pair each left-hand item with one of a shared set of options.
    Match,
}

impl Family {
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Quiz => "quiz",
            Family::Story => "story",
            Family::Reflex => "reflex",
            Family::Poster => "poster",
            Family::Journal => "journal",
            Family::Badge => "badge",
            Family::Match => "match",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableMeta {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub family: Family,
    #[serde(default)]
    pub coins: Option<u32>,
    #[serde(default)]
    pub xp: Option<u32>,
    #[serde(default)]
    pub back_path: Option<String>,
}

/// Badge handed out at the end of a run with enough correct answers.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Badge {
    pub name: String,
    pub min_correct: u32,
}

/// Per-table play rules, resolved from the `[policy]` section and the family.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRules {
    pub scoring: ScoringPolicy,
    pub reward: RewardRule,
    /// Selecting a choice submits it straight away (single-tap games).
    pub instant: bool,
    pub shuffle_choices: bool,
    /// Free-running games draw this many entries from the pool.
    pub draw: Option<usize>,
    /// A choice picked for one entry is locked for the rest of the run.
    pub consume_choices: bool,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            scoring: ScoringPolicy::RetryOnWrong,
            reward: RewardRule::Flat,
            instant: false,
            shuffle_choices: false,
            draw: None,
            consume_choices: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub id: String,
    pub text: String,
    pub icon: Option<String>,
    pub correct: bool,
}

/// What resolves an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// The id of the single winning choice.
    Choice(String),
    /// Free-text entry; any trimmed submission of at least `min_chars` counts.
    Open { min_chars: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelEntry {
    /// 1-based ordinal within the table.
    pub id: u32,
    pub prompt: String,
    pub choices: Vec<Choice>,
    pub answer: Answer,
    pub reward: u32,
    pub feedback_correct: Option<String>,
    pub feedback_incorrect: Option<String>,
}

impl LevelEntry {
    pub fn choice(&self, id: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.id == id)
    }

    pub fn is_open(&self) -> bool {
        matches!(self.answer, Answer::Open { .. })
    }

    pub fn correct_choice(&self) -> Option<&Choice> {
        match &self.answer {
            Answer::Choice(id) => self.choice(id),
            Answer::Open { .. } => None,
        }
    }
}

/// One game's content: metadata, rules and the ordered entries.
#[derive(Debug, Clone)]
pub struct ContentTable {
    pub meta: TableMeta,
    pub rules: GameRules,
    pub badge: Option<Badge>,
    pub entries: Vec<LevelEntry>,
}

impl ContentTable {
    pub fn id(&self) -> &str {
        &self.meta.id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, index: usize) -> Option<&LevelEntry> {
        self.entries.get(index)
    }

    /// Score of a perfect run under this table's reward rule.
    pub fn max_score(&self) -> u32 {
        self.rules.reward.max_score(self.entries.iter().map(|e| e.reward))
    }

    pub fn game_meta(&self) -> GameMeta {
        GameMeta {
            id: self.meta.id.clone(),
            coins: self.meta.coins,
            xp: self.meta.xp,
        }
    }
}
