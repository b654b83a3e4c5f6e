pub mod report;
pub mod resolve;

pub use report::ShellReport;
pub use resolve::{resolve_next_game, GameMeta, Navigation, NextGame, RewardConfig};
