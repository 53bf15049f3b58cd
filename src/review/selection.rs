//! Reviewer selection for new pull requests.

use crate::models::User;

/// Reviewers assigned to a new pull request when not configured otherwise.
pub const DEFAULT_MAX_REVIEWERS: usize = 2;

/// Pick up to `limit` reviewers for a PR written by `author`.
///
/// Candidates are taken in the order given (the store's ascending
/// `user_id` order), skipping the author and inactive users. There is no
/// randomness and no weighting by open review load, so the same roster
/// always yields the same reviewers.
pub fn select_reviewers(author: &User, candidates: &[User], limit: usize) -> Vec<String> {
    candidates
        .iter()
        .filter(|c| c.is_active && c.user_id != author.user_id)
        .take(limit)
        .map(|c| c.user_id.clone())
        .collect()
}
