//! Core error types for habitquest-core.
//!
//! Every failure the core can report is local to one operation. Callers
//! branch on [`CoreError::kind`] to pick a message for the user or operator.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::campaign::{CampaignAction, CampaignStatus};
use crate::participation::ParticipationStatus;
use crate::reward::{RewardAction, RewardStatus};
use crate::verification::VerificationType;

/// Core error type for habitquest-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed check-in payload or broken campaign invariant
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A lifecycle or reward guard refused the action
    #[error("{0}")]
    Transition(#[from] TransitionError),

    /// A check-in already exists for this participation and date
    #[error("Already checked in on {date} for participation {participation_id}")]
    DuplicateCheckIn {
        participation_id: String,
        date: NaiveDate,
    },

    /// Referenced entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of a [`CoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    InvalidTransition,
    DuplicateCheckIn,
    NotFound,
    Storage,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Validation(_) => ErrorKind::Validation,
            CoreError::Transition(_) => ErrorKind::InvalidTransition,
            CoreError::DuplicateCheckIn { .. } => ErrorKind::DuplicateCheckIn,
            CoreError::NotFound { .. } => ErrorKind::NotFound,
            CoreError::Database(_)
            | CoreError::Config(_)
            | CoreError::Io(_)
            | CoreError::Json(_) => ErrorKind::Storage,
        }
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Payload and invariant validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Payload variant does not match the campaign's verification type
    #[error("Expected a {expected} payload, got {actual}")]
    TypeMismatch {
        expected: VerificationType,
        actual: VerificationType,
    },

    /// Time record that does not parse as HH:MM
    #[error("Invalid time '{0}': expected HH:MM")]
    InvalidTime(String),

    /// Required text is empty after trimming
    #[error("'{0}' must not be empty")]
    Empty(&'static str),

    /// Simple check submitted unchecked
    #[error("Simple check must be checked")]
    Unchecked,

    /// Negative counter or amount
    #[error("'{field}' must not be negative (got {value})")]
    Negative { field: &'static str, value: i64 },

    /// Counter below the configured minimum
    #[error("Value {value} is below the minimum of {min}")]
    BelowMinimum { value: i64, min: i64 },

    /// Receipt amount that is not positive
    #[error("Receipt amount must be greater than zero")]
    NonPositiveAmount,

    /// Invalid date range
    #[error("Invalid date range: end_date ({end}) must be after start_date ({start})")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Guard failures for campaign, participation and reward transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// Action not allowed from the current campaign status
    #[error("Invalid transition: cannot {action} a campaign in '{from}' state")]
    InvalidTransition {
        from: CampaignStatus,
        action: CampaignAction,
    },

    /// Unpublish blocked by enrolled users
    #[error("cannot unpublish: {count} active participants")]
    ParticipantsPresent { count: u32 },

    /// Field frozen once the campaign left draft
    #[error("cannot edit '{field}' of a {status} campaign")]
    ImmutableField {
        field: &'static str,
        status: CampaignStatus,
    },

    /// Campaign is not open for joining or checking in
    #[error("campaign {campaign_id} is {status}: {reason}")]
    CampaignClosed {
        campaign_id: String,
        status: CampaignStatus,
        reason: &'static str,
    },

    /// Max participant count reached
    #[error("campaign {campaign_id} is full ({max} participants)")]
    CapacityReached { campaign_id: String, max: u32 },

    /// User already enrolled in the campaign
    #[error("user {user_id} already joined campaign {campaign_id}")]
    AlreadyJoined {
        user_id: String,
        campaign_id: String,
    },

    /// Acting user is not the participant
    #[error("user {user_id} does not own participation {participation_id}")]
    NotOwner {
        participation_id: String,
        user_id: String,
    },

    /// Participation no longer accepts changes
    #[error("participation {participation_id} is {status}")]
    ParticipationInactive {
        participation_id: String,
        status: ParticipationStatus,
    },

    /// Reward action not allowed from the current ticket status
    #[error("Invalid reward transition: cannot {action} a reward in '{from}' state")]
    InvalidRewardTransition {
        from: RewardStatus,
        action: RewardAction,
    },
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Unique constraint rejected the write
    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, msg) => match code.code {
                rusqlite::ErrorCode::DatabaseLocked | rusqlite::ErrorCode::DatabaseBusy => {
                    DatabaseError::Locked
                }
                rusqlite::ErrorCode::ConstraintViolation => DatabaseError::ConstraintViolation(
                    msg.clone().unwrap_or_else(|| code.to_string()),
                ),
                _ => DatabaseError::QueryFailed(err.to_string()),
            },
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinguishable() {
        let dup = CoreError::DuplicateCheckIn {
            participation_id: "part-1".into(),
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        };
        assert_eq!(dup.kind(), ErrorKind::DuplicateCheckIn);
        assert_eq!(
            CoreError::not_found("campaign", "c-1").kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            CoreError::from(ValidationError::Unchecked).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            CoreError::from(TransitionError::ParticipantsPresent { count: 2 }).kind(),
            ErrorKind::InvalidTransition
        );
    }

    #[test]
    fn unpublish_guard_message_is_operator_readable() {
        let err = CoreError::from(TransitionError::ParticipantsPresent { count: 3 });
        assert_eq!(err.to_string(), "cannot unpublish: 3 active participants");
    }

    #[test]
    fn invalid_transition_names_state_and_action() {
        let err = TransitionError::InvalidTransition {
            from: CampaignStatus::Ended,
            action: CampaignAction::Publish,
        };
        assert_eq!(err.to_string(), "Invalid transition: cannot publish a campaign in 'ended' state");
    }
}
