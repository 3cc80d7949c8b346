//! Error types for campus-paths

use thiserror::Error;

/// Reasons a selection cannot be turned into a path request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Need to select both start and end buildings!")]
    MissingSelection,

    #[error("Cannot enter the same start and end buildings!")]
    SameBuilding,

    #[error("Unknown building: {0}")]
    UnknownBuilding(String),
}

#[derive(Error, Debug)]
pub enum PathError {
    #[error("There was an error contacting the server: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{endpoint}: the status expects 200, but got {status}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Could not parse {context}: {fragment:?}")]
    Parse {
        context: &'static str,
        fragment: String,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Discarded route {requested} - selection is now {current}")]
    Stale { requested: String, current: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl PathError {
    /// Build a parse error carrying the substring that failed
    pub fn parse(context: &'static str, fragment: impl Into<String>) -> Self {
        Self::Parse {
            context,
            fragment: fragment.into(),
        }
    }

    /// Whether the error came from the user's selection rather than the server
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, PathError>;
