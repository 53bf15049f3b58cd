//! Replacing one reviewer of an open pull request with another.
//!
//! Replacement candidates come from the team of the reviewer being
//! replaced, which is not necessarily the author's team.

use serde::Serialize;

use super::{lifecycle, require_id};
use crate::error::AppError;
use crate::models::{PullRequest, User};
use crate::store::EntityStore;

/// Result of a successful reassignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reassignment {
    pub pr: PullRequest,
    pub replaced_by: String,
}

/// Pick the replacement for `old_reviewer` among `candidates`.
///
/// Returns the first candidate, in the order given, that is active, is not
/// the old reviewer, is not the PR author and is not already reviewing
/// the PR.
pub fn pick_replacement(pr: &PullRequest, old_reviewer: &str, candidates: &[User]) -> Option<String> {
    candidates
        .iter()
        .find(|c| {
            c.is_active
                && c.user_id != old_reviewer
                && c.user_id != pr.author_id
                && !pr.has_reviewer(&c.user_id)
        })
        .map(|c| c.user_id.clone())
}

/// Replace `old_user_id` on `pull_request_id` with an active teammate of
/// the old reviewer.
///
/// Preconditions are checked in order, each with its own error: PR exists
/// (`NOT_FOUND`), PR is open (`PR_MERGED`), old user is assigned
/// (`NOT_ASSIGNED`), a candidate exists (`NO_CANDIDATE`). The reviewer set
/// keeps its size.
pub async fn reassign_reviewer<S: EntityStore>(
    store: &mut S,
    pull_request_id: &str,
    old_user_id: &str,
) -> Result<Reassignment, AppError> {
    require_id(pull_request_id, "pull_request_id")?;
    require_id(old_user_id, "old_user_id")?;

    let pr = store
        .get_pull_request(pull_request_id)
        .await?
        .ok_or_else(|| AppError::not_found("PR", pull_request_id))?;

    lifecycle::ensure_open(&pr)?;

    if !pr.has_reviewer(old_user_id) {
        return Err(AppError::not_assigned(pull_request_id, old_user_id));
    }

    let old_reviewer = store
        .get_user(old_user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user", old_user_id))?;

    let candidates = match &old_reviewer.team_name {
        Some(team_name) => store.users_by_team(team_name, true).await?,
        None => Vec::new(),
    };

    let replaced_by = pick_replacement(&pr, old_user_id, &candidates)
        .ok_or_else(|| AppError::no_candidate(pull_request_id, old_user_id))?;

    store.remove_reviewer(pull_request_id, old_user_id).await?;
    store.add_reviewer(pull_request_id, &replaced_by).await?;

    log::info!(
        "[review] Reassigned PR {}: {} -> {}",
        pull_request_id,
        old_user_id,
        replaced_by
    );

    let pr = store
        .get_pull_request(pull_request_id)
        .await?
        .ok_or_else(|| AppError::not_found("PR", pull_request_id))?;

    Ok(Reassignment { pr, replaced_by })
}
