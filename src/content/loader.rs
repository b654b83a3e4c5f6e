use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use super::catalog::Catalog;
use super::types::{Answer, Badge, Choice, ContentTable, Family, GameRules, LevelEntry, TableMeta};
use crate::engine::{RewardRule, ScoringPolicy};
use crate::error::ContentError;

/// Countdown used by reflex tables that don't set `countdown_secs`.
pub const DEFAULT_COUNTDOWN_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct RawTable {
    meta: TableMeta,
    #[serde(default)]
    policy: Option<RawPolicy>,
    #[serde(default)]
    badge: Option<Badge>,
    /// Shared right-hand options for matching tables.
    #[serde(rename = "option", default)]
    options: Vec<RawChoice>,
    #[serde(rename = "entry", default)]
    entries: Vec<RawEntry>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawPolicy {
    kind: Option<PolicyKind>,
    countdown_secs: Option<u64>,
    reward: Option<RewardKind>,
    cap: Option<u32>,
    instant: Option<bool>,
    #[serde(default)]
    shuffle_choices: bool,
    draw: Option<usize>,
    consume_choices: Option<bool>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum PolicyKind {
    RetryOnWrong,
    MoveOnWrong,
    AdvanceAlways,
    TimerForced,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RewardKind {
    Flat,
    Streak,
    Capped,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    prompt: String,
    #[serde(default = "default_reward")]
    reward: u32,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    min_chars: Option<usize>,
    #[serde(default)]
    feedback_correct: Option<String>,
    #[serde(default)]
    feedback_incorrect: Option<String>,
    #[serde(rename = "choice", default)]
    choices: Vec<RawChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawChoice {
    #[serde(default)]
    id: Option<String>,
    text: String,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    correct: bool,
}

fn default_reward() -> u32 {
    1
}

pub fn load_table(path: &Path) -> Result<ContentTable, ContentError> {
    let content = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_table(&content, path)
}

/// Parses a table from TOML text. `origin` only shows up in error messages.
pub fn parse_table(content: &str, origin: &Path) -> Result<ContentTable, ContentError> {
    let raw: RawTable = toml::from_str(content).map_err(|source| ContentError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;
    build_table(raw)
}

/// Paths of every table file in `games_dir`, sorted by file name.
pub fn table_paths(games_dir: &Path) -> Result<Vec<PathBuf>, ContentError> {
    if !games_dir.is_dir() {
        return Err(ContentError::Io {
            path: games_dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        });
    }

    let dir = glob::Pattern::escape(&games_dir.to_string_lossy());
    let pattern = Path::new(&dir).join("*.toml");
    let mut paths: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(err) => {
                warn!(path = %err.path().display(), error = %err, "skipping unreadable games entry");
                None
            }
        })
        .collect();

    // Sort by filename so 01_, 02_, 03_ are in order
    paths.sort();
    Ok(paths)
}

pub fn load_catalog(games_dir: &Path) -> Result<Catalog, ContentError> {
    let paths = table_paths(games_dir)?;

    let mut seen = HashSet::new();
    let mut tables = Vec::with_capacity(paths.len());
    for path in paths {
        let table = load_table(&path)?;
        if !seen.insert(table.meta.id.clone()) {
            return Err(ContentError::DuplicateId(table.meta.id));
        }
        debug!(game = %table.meta.id, entries = table.len(), path = %path.display(), "loaded content table");
        tables.push(table);
    }

    Ok(Catalog::new(tables))
}

fn build_table(raw: RawTable) -> Result<ContentTable, ContentError> {
    let game = raw.meta.id.clone();
    let rules = build_rules(&game, raw.meta.family, raw.policy.unwrap_or_default())?;

    if raw.entries.is_empty() {
        return Err(ContentError::invalid(&game, "has no entries"));
    }

    let mut raw_entries = raw.entries;
    if !raw.options.is_empty() {
        share_options(&game, &raw.options, &mut raw_entries)?;
    }

    let entries = raw_entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| build_entry(&game, i as u32 + 1, entry, &rules))
        .collect::<Result<Vec<_>, _>>()?;

    if rules.consume_choices {
        check_consumable(&game, &rules, raw.options.len(), &entries)?;
    }

    if let Some(badge) = &raw.badge {
        // Free-running tables play `draw` rounds, not one per entry
        let rounds = rules.draw.unwrap_or(entries.len());
        if badge.min_correct as usize > rounds {
            return Err(ContentError::invalid(
                &game,
                format!(
                    "badge '{}' needs {} correct answers but only {} rounds are played",
                    badge.name, badge.min_correct, rounds
                ),
            ));
        }
    }

    Ok(ContentTable {
        meta: raw.meta,
        rules,
        badge: raw.badge,
        entries,
    })
}

/// Gives every entry of a matching table the shared option list.
fn share_options(
    game: &str,
    options: &[RawChoice],
    entries: &mut [RawEntry],
) -> Result<(), ContentError> {
    if options.iter().any(|o| o.correct) {
        return Err(ContentError::invalid(
            game,
            "shared options cannot be flagged correct; name the `answer` on each entry",
        ));
    }
    for (i, entry) in entries.iter_mut().enumerate() {
        if !entry.choices.is_empty() {
            return Err(ContentError::invalid(
                game,
                format!("entry {} lists its own choices but the table has shared options", i + 1),
            ));
        }
        entry.choices = options.to_vec();
    }
    Ok(())
}

/// Options used up by one entry must leave enough for the rest.
fn check_consumable(
    game: &str,
    rules: &GameRules,
    option_count: usize,
    entries: &[LevelEntry],
) -> Result<(), ContentError> {
    if option_count == 0 {
        return Err(ContentError::invalid(game, "consume_choices needs shared `[[option]]`s"));
    }
    if rules.scoring.retries_on_wrong() {
        return Err(ContentError::invalid(game, "consume_choices cannot retry wrong answers"));
    }
    if rules.draw.is_some() {
        return Err(ContentError::invalid(game, "consume_choices cannot draw from a pool"));
    }
    if option_count < entries.len() {
        return Err(ContentError::invalid(
            game,
            format!("{} entries but only {} options to match them with", entries.len(), option_count),
        ));
    }

    let mut answers = HashSet::new();
    for entry in entries {
        if let Answer::Choice(id) = &entry.answer {
            if !answers.insert(id.as_str()) {
                return Err(ContentError::invalid(
                    game,
                    format!("option '{id}' is the answer to more than one entry"),
                ));
            }
        }
    }
    Ok(())
}

fn build_rules(game: &str, family: Family, policy: RawPolicy) -> Result<GameRules, ContentError> {
    let kind = policy.kind.unwrap_or(match family {
        Family::Quiz | Family::Story => PolicyKind::RetryOnWrong,
        Family::Reflex => PolicyKind::TimerForced,
        Family::Poster | Family::Journal => PolicyKind::AdvanceAlways,
        Family::Badge | Family::Match => PolicyKind::MoveOnWrong,
    });

    let scoring = match kind {
        PolicyKind::RetryOnWrong => ScoringPolicy::RetryOnWrong,
        PolicyKind::MoveOnWrong => ScoringPolicy::MoveOnWrong,
        PolicyKind::AdvanceAlways => ScoringPolicy::AdvanceAlways,
        PolicyKind::TimerForced => {
            let secs = policy.countdown_secs.unwrap_or(DEFAULT_COUNTDOWN_SECS);
            if secs == 0 {
                return Err(ContentError::invalid(game, "timer_forced needs a non-zero countdown"));
            }
            ScoringPolicy::TimerForced {
                countdown: Duration::from_secs(secs),
            }
        }
    };

    let reward = match policy.reward.unwrap_or(RewardKind::Flat) {
        RewardKind::Flat => RewardRule::Flat,
        RewardKind::Streak => RewardRule::Streak,
        RewardKind::Capped => match policy.cap {
            Some(max) => RewardRule::Capped { max },
            None => return Err(ContentError::invalid(game, "capped reward needs `cap`")),
        },
    };

    if policy.draw == Some(0) {
        return Err(ContentError::invalid(game, "`draw` must be at least 1"));
    }

    Ok(GameRules {
        scoring,
        reward,
        instant: policy.instant.unwrap_or(family == Family::Reflex),
        shuffle_choices: policy.shuffle_choices,
        draw: policy.draw,
        consume_choices: policy.consume_choices.unwrap_or(family == Family::Match),
    })
}

fn build_entry(
    game: &str,
    ordinal: u32,
    raw: RawEntry,
    rules: &GameRules,
) -> Result<LevelEntry, ContentError> {
    if raw.choices.is_empty() {
        if rules.scoring != ScoringPolicy::AdvanceAlways {
            return Err(ContentError::invalid(
                game,
                format!("entry {ordinal} has no choices; open entries need advance_always"),
            ));
        }
        if raw.answer.is_some() {
            return Err(ContentError::invalid(
                game,
                format!("entry {ordinal} names an answer but has no choices"),
            ));
        }
        return Ok(LevelEntry {
            id: ordinal,
            prompt: raw.prompt,
            choices: Vec::new(),
            answer: Answer::Open {
                min_chars: raw.min_chars.unwrap_or(1).max(1),
            },
            reward: raw.reward,
            feedback_correct: raw.feedback_correct,
            feedback_incorrect: raw.feedback_incorrect,
        });
    }

    let mut choices: Vec<Choice> = raw
        .choices
        .into_iter()
        .enumerate()
        .map(|(i, c)| Choice {
            id: c.id.unwrap_or_else(|| (i + 1).to_string()),
            text: c.text,
            icon: c.icon,
            correct: c.correct,
        })
        .collect();

    let mut ids = HashSet::new();
    if let Some(dup) = choices.iter().find(|c| !ids.insert(c.id.as_str())) {
        return Err(ContentError::invalid(
            game,
            format!("entry {ordinal} repeats choice id '{}'", dup.id),
        ));
    }

    let flagged: Vec<&str> = choices
        .iter()
        .filter(|c| c.correct)
        .map(|c| c.id.as_str())
        .collect();

    let winner = match (raw.answer.as_deref(), flagged.as_slice()) {
        (_, [_, _, ..]) => {
            return Err(ContentError::invalid(
                game,
                format!("entry {ordinal} has more than one correct choice"),
            ));
        }
        (None, []) => {
            return Err(ContentError::invalid(
                game,
                format!("entry {ordinal} has no correct choice"),
            ));
        }
        (None, [flag]) => flag.to_string(),
        (Some(answer), []) => {
            if !ids.contains(answer) {
                return Err(ContentError::invalid(
                    game,
                    format!("entry {ordinal} answer '{answer}' is not one of its choices"),
                ));
            }
            answer.to_string()
        }
        (Some(answer), [flag]) => {
            if answer != *flag {
                return Err(ContentError::invalid(
                    game,
                    format!("entry {ordinal} answer '{answer}' disagrees with flagged choice '{flag}'"),
                ));
            }
            answer.to_string()
        }
    };

    for choice in &mut choices {
        choice.correct = choice.id == winner;
    }

    Ok(LevelEntry {
        id: ordinal,
        prompt: raw.prompt,
        choices,
        answer: Answer::Choice(winner),
        reward: raw.reward,
        feedback_correct: raw.feedback_correct,
        feedback_incorrect: raw.feedback_incorrect,
    })
}
