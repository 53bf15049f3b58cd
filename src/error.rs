//! Application error types.
//!
//! Every failure an operation can produce is an [`AppError`]. The HTTP
//! layer maps each variant to a stable error code and status; nothing in
//! the request path panics.

use thiserror::Error;

/// Kind of entity that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    Team,
    PullRequest,
}

/// Application-level errors returned by review operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Requested team, user or pull request does not exist.
    #[error("{resource} not found")]
    NotFound { resource: String, id: String },

    /// A team or pull request with the same key already exists.
    #[error("{message}")]
    AlreadyExists { kind: Conflict, message: String },

    /// Operation is not allowed on a merged pull request.
    #[error("cannot reassign on merged PR")]
    PrMerged { pull_request_id: String },

    /// The reviewer to replace is not assigned to the pull request.
    #[error("reviewer is not assigned")]
    NotAssigned {
        pull_request_id: String,
        user_id: String,
    },

    /// No active teammate is available as a replacement reviewer.
    #[error("no active replacement candidate in team")]
    NoCandidate {
        pull_request_id: String,
        user_id: String,
    },

    /// Malformed or incomplete input.
    #[error("{message}")]
    InvalidInput {
        message: String,
        field: Option<String>,
    },

    /// Database operation failed.
    #[error("Database error: {message}")]
    Database { message: String },
}

impl AppError {
    /// Create a not found error for `resource` keyed by `id`.
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create a duplicate team error.
    pub fn team_exists() -> Self {
        Self::AlreadyExists {
            kind: Conflict::Team,
            message: "team already exists".into(),
        }
    }

    /// Create a duplicate pull request error.
    pub fn pr_exists() -> Self {
        Self::AlreadyExists {
            kind: Conflict::PullRequest,
            message: "PR already exists".into(),
        }
    }

    pub fn pr_merged(pull_request_id: impl Into<String>) -> Self {
        Self::PrMerged {
            pull_request_id: pull_request_id.into(),
        }
    }

    pub fn not_assigned(pull_request_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self::NotAssigned {
            pull_request_id: pull_request_id.into(),
            user_id: user_id.into(),
        }
    }

    pub fn no_candidate(pull_request_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self::NoCandidate {
            pull_request_id: pull_request_id.into(),
            user_id: user_id.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: None,
        }
    }

    /// Create an invalid input error with field name.
    pub fn invalid_input_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    /// Stable error code reported to API clients.
    ///
    /// Malformed input shares `NOT_FOUND` with missing entities; clients of
    /// the service already depend on that code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } | Self::InvalidInput { .. } => "NOT_FOUND",
            Self::AlreadyExists {
                kind: Conflict::Team,
                ..
            } => "TEAM_EXISTS",
            Self::AlreadyExists {
                kind: Conflict::PullRequest,
                ..
            } => "PR_EXISTS",
            Self::PrMerged { .. } => "PR_MERGED",
            Self::NotAssigned { .. } => "NOT_ASSIGNED",
            Self::NoCandidate { .. } => "NO_CANDIDATE",
            Self::Database { .. } => "INTERNAL_ERROR",
        }
    }

    /// Whether the error originates from the server rather than the request.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Database { .. })
    }
}

// Conversions from common error types

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::database(err.to_string())
    }
}

impl From<crate::db::DbError> for AppError {
    fn from(err: crate::db::DbError) -> Self {
        use crate::db::DbError;

        match err {
            DbError::NotFound { entity, key } => Self::not_found(entity, key),
            DbError::AlreadyExists { entity, .. } if entity == "team" => Self::team_exists(),
            DbError::AlreadyExists { entity, .. } if entity == "pull request" => {
                Self::pr_exists()
            }
            other => Self::database(other.to_string()),
        }
    }
}
