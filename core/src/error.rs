use thiserror::Error;

/// Why a [`GameConfig`](crate::GameConfig) was rejected.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigIssue {
    ZeroWidth,
    ZeroHeight,
    TooManyMines,
    TooWide,
    TooTall,
}

impl core::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::ZeroWidth => "width must be at least 1",
            Self::ZeroHeight => "height must be at least 1",
            Self::TooManyMines => "mine count must leave at least one safe cell",
            Self::TooWide => "width must not exceed 255",
            Self::TooTall => "height must not exceed 255",
        })
    }
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(ConfigIssue),
    #[error("Invalid coordinates")]
    InvalidCoords,
}

pub type Result<T> = core::result::Result<T, GameError>;
