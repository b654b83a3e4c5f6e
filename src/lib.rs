//! Level progression engine for single-screen mini-games.
//!
//! A game is a [`content::ContentTable`] (loaded from TOML) played through a
//! [`engine::LevelProgressionEngine`]. The engine owns the selection/submit
//! loop, scoring, feedback and countdowns; the shell around it only draws
//! and forwards input.

pub mod config;
pub mod content;
pub mod engine;
pub mod error;
pub mod rewards;

pub use content::{load_catalog, load_table, Catalog, ContentTable};
pub use engine::{EngineEvent, LevelProgressionEngine, ScoringPolicy, Timing};
pub use error::ContentError;
pub use rewards::{Navigation, RewardConfig, ShellReport};
