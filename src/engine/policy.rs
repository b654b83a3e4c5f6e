use std::time::Duration;

/// How a game reacts to a resolved entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringPolicy {
    /// Wrong answers re-present the same entry until it is answered correctly.
    RetryOnWrong,
    /// Wrong answers move on with zero credit.
    MoveOnWrong,
    /// Any valid submission moves on (posters, journals).
    AdvanceAlways,
    /// Each entry runs a countdown; expiry counts as a wrong answer.
    TimerForced { countdown: Duration },
}

impl ScoringPolicy {
    pub fn countdown(&self) -> Option<Duration> {
        match self {
            ScoringPolicy::TimerForced { countdown } => Some(*countdown),
            _ => None,
        }
    }

    pub fn retries_on_wrong(&self) -> bool {
        matches!(self, ScoringPolicy::RetryOnWrong)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringPolicy::RetryOnWrong => "retry_on_wrong",
            ScoringPolicy::MoveOnWrong => "move_on_wrong",
            ScoringPolicy::AdvanceAlways => "advance_always",
            ScoringPolicy::TimerForced { .. } => "timer_forced",
        }
    }
}

/// How many points a correct resolution is worth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RewardRule {
    /// The entry's reward, every time.
    #[default]
    Flat,
    /// The entry's reward times a multiplier that grows with the running streak.
    Streak,
    /// Flat, but the total never exceeds `max`.
    Capped { max: u32 },
}

/// Multiplier for the next correct answer given the streak before it.
pub fn streak_multiplier(streak: u32) -> u32 {
    match streak {
        s if s >= 5 => 3,
        s if s >= 3 => 2,
        _ => 1,
    }
}

impl RewardRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardRule::Flat => "flat",
            RewardRule::Streak => "streak",
            RewardRule::Capped { .. } => "capped",
        }
    }

    /// Points for one correct answer.
    ///
    /// `streak` is the number of consecutive correct answers before this one
    /// and `score` the total before it.
    pub fn award(&self, reward: u32, streak: u32, score: u32) -> u32 {
        match self {
            RewardRule::Flat => reward,
            RewardRule::Streak => reward.saturating_mul(streak_multiplier(streak)),
            RewardRule::Capped { max } => reward.min(max.saturating_sub(score)),
        }
    }

    /// Total of a run where every entry is answered correctly first time.
    pub fn max_score(&self, rewards: impl IntoIterator<Item = u32>) -> u32 {
        let mut score: u32 = 0;
        for (streak, reward) in rewards.into_iter().enumerate() {
            score = score.saturating_add(self.award(reward, streak as u32, score));
        }
        score
    }
}
