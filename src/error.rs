use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the birthday registry and the daily reconciler
#[derive(Debug, Error)]
pub enum BirthdayError {
    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("user {0} already has a birthday set")]
    AlreadyExists(String),

    #[error("user {0} doesn't have a birthday set")]
    NotFound(String),

    #[error("could not resolve user {user_id}: {reason}")]
    IdentityResolutionFailed { user_id: String, reason: String },

    #[error("could not resolve channel {channel_id}: {reason}")]
    ChannelResolutionFailed { channel_id: String, reason: String },

    #[error("could not update birthday role for user {user_id}: {reason}")]
    RoleUpdateFailed { user_id: String, reason: String },

    #[error("could not deliver message: {0}")]
    DeliveryFailed(String),

    #[error("birthday storage unavailable at {}: {source}", path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BirthdayError {
    /// Wrap an IO or JSON failure for the given storage path
    pub fn storage(path: impl Into<PathBuf>, source: impl Into<std::io::Error>) -> Self {
        BirthdayError::StorageUnavailable {
            path: path.into(),
            source: source.into(),
        }
    }
}
