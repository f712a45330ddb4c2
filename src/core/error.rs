//! Load-time errors.
//!
//! Tag data is validated once when the registry is built. Anything wrong with
//! it is a `ConfigError` and should stop startup; everything that can go wrong
//! while an effect runs is logged and degraded instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tag definitions from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed tag definition document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid tag definition `{tag}`: {reason}")]
    Invalid { tag: String, reason: String },

    #[error("invalid conflict table: {0}")]
    Conflicts(String),
}

impl ConfigError {
    pub(crate) fn invalid(tag: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            tag: tag.into(),
            reason: reason.into(),
        }
    }
}
