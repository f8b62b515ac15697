//! Typed failures for the participation lifecycle.
//!
//! Business-rule errors are not retryable without a state change.
//! `Transient` wraps storage failures and is safe to retry; callers that
//! time out should re-query state instead of assuming the write failed.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("activity not found: {0}")]
    ActivityNotFound(String),

    #[error("participation not found for activity {activity_id}")]
    ParticipationNotFound { activity_id: String },

    #[error("creators cannot express interest in their own activity")]
    SelfInterest,

    #[error("a participation already exists for this user and activity")]
    DuplicateInterest,

    #[error("only the activity creator may perform this action")]
    NotAuthorized,

    #[error("action not valid from the current state: {0}")]
    InvalidState(String),

    #[error("no spots left on this activity")]
    CapacityExceeded,

    #[error("storage error: {0}")]
    Transient(#[from] sqlx::Error),
}

impl Error {
    /// Stable machine-readable code, exposed in API error bodies so clients
    /// can tell "spot no longer available" apart from a generic failure.
    pub fn code(&self) -> &'static str {
        match self {
            Error::ActivityNotFound(_) | Error::ParticipationNotFound { .. } => "not_found",
            Error::SelfInterest => "self_interest",
            Error::DuplicateInterest => "duplicate_interest",
            Error::NotAuthorized => "not_authorized",
            Error::InvalidState(_) => "invalid_state",
            Error::CapacityExceeded => "capacity_exceeded",
            Error::Transient(_) => "transient",
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
