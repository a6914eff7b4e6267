use thiserror::Error;

use crate::reinforcement::action::EngagementAction;

/// Main error type for the magpie engagement agent
#[derive(Error, Debug)]
pub enum MagpieError {
    #[error("No value row for time bucket '{bucket}'")]
    RowNotFound { bucket: String },

    #[error("Value row for time bucket '{bucket}' is missing action '{action}'")]
    ActionNotFound {
        bucket: String,
        action: EngagementAction,
    },

    #[error("Search for '{query}' returned no posts")]
    EmptySearch { query: String },

    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Platform error: {message}")]
    Platform { message: String },

    #[error("Content generation error: {message}")]
    Content { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{0}")]
    Other(String),
}

impl MagpieError {
    /// Create a new row-not-found error for a bucket
    pub fn row_not_found(bucket: impl Into<String>) -> Self {
        Self::RowNotFound {
            bucket: bucket.into(),
        }
    }

    /// Create a new missing-action error for a bucket
    pub fn action_not_found(bucket: impl Into<String>, action: EngagementAction) -> Self {
        Self::ActionNotFound {
            bucket: bucket.into(),
            action,
        }
    }

    /// Create a new empty search result error
    pub fn empty_search(query: impl Into<String>) -> Self {
        Self::EmptySearch {
            query: query.into(),
        }
    }

    /// Create a new platform client error
    pub fn platform_error(message: impl Into<String>) -> Self {
        Self::Platform {
            message: message.into(),
        }
    }

    /// Create a new content generation error
    pub fn content_error(message: impl Into<String>) -> Self {
        Self::Content {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

impl From<reqwest::Error> for MagpieError {
    fn from(error: reqwest::Error) -> Self {
        MagpieError::platform_error(error.to_string())
    }
}

impl From<serde_json::Error> for MagpieError {
    fn from(error: serde_json::Error) -> Self {
        MagpieError::other(error.to_string())
    }
}

/// Result type alias using MagpieError
pub type MagpieResult<T> = Result<T, MagpieError>;
