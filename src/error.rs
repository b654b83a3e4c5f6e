use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading or validating content tables.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("bad games pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("game '{game}' is invalid: {reason}")]
    Invalid { game: String, reason: String },

    #[error("game id '{0}' is defined more than once")]
    DuplicateId(String),

    #[error("no game with id '{0}'")]
    UnknownGame(String),
}

impl ContentError {
    pub(crate) fn invalid(game: &str, reason: impl Into<String>) -> Self {
        ContentError::Invalid {
            game: game.to_string(),
            reason: reason.into(),
        }
    }
}
