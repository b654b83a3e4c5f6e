use super::resolve::{NextGame, RewardConfig};
use crate::engine::LevelProgressionEngine;

/// Correct answers that earn confetti when a table has no badge.
pub const CELEBRATE_AT: u32 = 3;

/// Everything the shell needs to draw chrome around a running game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellReport {
    pub score: u32,
    /// 1-based level shown in the progress indicator.
    pub current_level: usize,
    pub total_levels: usize,
    pub show_game_over: bool,
    pub max_score: u32,
    pub coins_per_level: u32,
    pub total_coins: u32,
    pub total_xp: u32,
    pub coins_earned: u32,
    pub show_confetti: bool,
    pub show_answer_confetti: bool,
    pub badge_earned: Option<String>,
    pub back_path: Option<String>,
    pub next_game_path: Option<String>,
    pub next_game_id: Option<String>,
}

impl ShellReport {
    pub fn build(engine: &LevelProgressionEngine, rewards: &RewardConfig, next: &NextGame) -> Self {
        let state = engine.state();
        let table = engine.table();
        let total_levels = table.len();
        let completed = state.completed;

        let badge_earned = table
            .badge
            .as_ref()
            .filter(|badge| completed && state.correct_count >= badge.min_correct)
            .map(|badge| badge.name.clone());

        let show_confetti = completed
            && match &table.badge {
                Some(_) => badge_earned.is_some(),
                None => state.correct_count >= CELEBRATE_AT.min(total_levels as u32),
            };

        ShellReport {
            score: state.score,
            current_level: (state.current_index + 1).min(total_levels),
            total_levels,
            show_game_over: completed,
            max_score: engine.max_score(),
            coins_per_level: rewards.coins_per_level,
            total_coins: rewards.total_coins,
            total_xp: rewards.total_xp,
            coins_earned: rewards.coins_earned(state.correct_count),
            show_confetti,
            show_answer_confetti: engine.is_correct_feedback_visible(),
            badge_earned,
            back_path: table.meta.back_path.clone(),
            next_game_path: next.path.clone(),
            next_game_id: next.id.clone(),
        }
    }
}

impl LevelProgressionEngine {
    pub fn report(&self, rewards: &RewardConfig, next: &NextGame) -> ShellReport {
        ShellReport::build(self, rewards, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::parse_table;
    use crate::engine::Timing;
    use std::path::Path;
    use std::rc::Rc;
    use std::time::Duration;

    fn engine(badge: &str, entries: usize) -> LevelProgressionEngine {
        let mut content = format!(
            "[meta]\nid = \"badge\"\ntitle = \"Badge\"\nfamily = \"badge\"\nback_path = \"/games/brain/kids\"\n{badge}\n"
        );
        for n in 1..=entries {
            content.push_str(&format!(
                "\n[[entry]]\nprompt = \"Q{n}\"\nanswer = \"y\"\n  [[entry.choice]]\n  id = \"y\"\n  text = \"Yes\"\n  [[entry.choice]]\n  id = \"n\"\n  text = \"No\"\n"
            ));
        }
        let table = parse_table(&content, Path::new("badge.toml")).unwrap();
        let mut engine = LevelProgressionEngine::new(Rc::new(table), Timing::default());
        engine.start();
        engine
    }

    fn play(engine: &mut LevelProgressionEngine, picks: &[&str]) {
        for pick in picks {
            engine.select_choice(pick);
            engine.submit();
            engine.elapse(Duration::from_secs(2));
        }
    }

    #[test]
    fn test_progress_fields() {
        let mut engine = engine("", 5);
        let rewards = RewardConfig::default();
        let next = NextGame {
            path: Some("/games/next".into()),
            id: Some("next".into()),
        };

        let report = ShellReport::build(&engine, &rewards, &next);
        assert_eq!(report.current_level, 1);
        assert_eq!(report.total_levels, 5);
        assert_eq!(report.max_score, 5);
        assert!(!report.show_game_over);
        assert_eq!(report.back_path.as_deref(), Some("/games/brain/kids"));
        assert_eq!(report.next_game_id.as_deref(), Some("next"));

        engine.select_choice("y");
        engine.submit();
        assert!(ShellReport::build(&engine, &rewards, &next).show_answer_confetti);

        engine.elapse(Duration::from_secs(2));
        play(&mut engine, &["y", "y", "y", "y"]);
        let report = engine.report(&rewards, &next);
        assert!(report.show_game_over);
        assert_eq!(report.current_level, 5);
        assert_eq!(report.score, 5);
        assert!(report.show_confetti);
        assert_eq!(report.coins_earned, 5);
    }

    #[test]
    fn test_badge_decides_confetti() {
        let badge = "[badge]\nname = \"Calm Kid\"\nmin_correct = 4\n";

        let mut engine = self::engine(badge, 5);
        play(&mut engine, &["y", "y", "y", "n", "n"]);
        let report = ShellReport::build(&engine, &RewardConfig::default(), &NextGame::default());
        assert!(report.show_game_over);
        assert_eq!(report.badge_earned, None);
        assert!(!report.show_confetti);

        let mut engine = self::engine(badge, 5);
        play(&mut engine, &["y", "n", "y", "y", "y"]);
        let report = ShellReport::build(&engine, &RewardConfig::default(), &NextGame::default());
        assert_eq!(report.badge_earned.as_deref(), Some("Calm Kid"));
        assert!(report.show_confetti);
    }

    #[test]
    fn test_small_tables_can_still_celebrate() {
        let mut engine = engine("", 2);
        play(&mut engine, &["y", "y"]);
        let report = ShellReport::build(&engine, &RewardConfig::default(), &NextGame::default());
        assert!(report.show_confetti);
    }
}
