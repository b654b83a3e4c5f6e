pub mod feedback;
pub mod machine;
pub mod policy;
pub mod state;
pub mod timer;

pub use feedback::{FeedbackCoordinator, FeedbackKind, FeedbackState};
pub use machine::{EngineEvent, LevelProgressionEngine, Timing};
pub use policy::{streak_multiplier, RewardRule, ScoringPolicy};
pub use state::{EntryOutcome, Phase, ProgressionState, Selection};
pub use timer::{Scheduler, Transition};
