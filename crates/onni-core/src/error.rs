use thiserror::Error;

/// Errors raised while projecting an upstream document into a [`crate::WorldState`].
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("world state payload must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("world state payload is missing required field '{0}'")]
    MissingMarker(String),

    #[error("malformed world state: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid relic tier: {0}")]
    InvalidRelicTier(String),
}

impl ParseError {
    pub fn missing_marker(field: impl Into<String>) -> Self {
        Self::MissingMarker(field.into())
    }

    pub fn invalid_relic_tier(tier: impl Into<String>) -> Self {
        Self::InvalidRelicTier(tier.into())
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;
