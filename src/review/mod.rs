//! Reviewer assignment rules and the pull request lifecycle.
//!
//! Every operation takes the entity store as an explicit `&mut S` and does
//! all of its reads and writes through it. Callers decide the transaction
//! boundary (see `services::review_service`); the operations themselves
//! hold no state between calls.
//!
//! - `roster`: a user's team and active teammates
//! - `selection`: reviewers for a new pull request
//! - `reassignment`: swapping one reviewer for another
//! - `lifecycle`: creation and the OPEN -> MERGED transition
//! - `directory`: teams, users and review listings

pub mod directory;
pub mod lifecycle;
pub mod reassignment;
pub mod roster;
pub mod selection;

pub use directory::UserReviews;
pub use lifecycle::MergeTransition;
pub use reassignment::Reassignment;
pub use roster::Roster;
pub use selection::DEFAULT_MAX_REVIEWERS;

use crate::error::AppError;

/// Reject blank identifiers before touching the store.
fn require_id(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::invalid_input_field(
            format!("missing {}", field),
            field,
        ));
    }
    Ok(())
}
