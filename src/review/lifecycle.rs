//! Pull request lifecycle: creation with reviewer assignment, and merge.
//!
//! A PR starts `OPEN` and moves to `MERGED` exactly once. Merging an
//! already merged PR returns the stored state untouched, so `mergedAt`
//! never changes after the first merge.

use chrono::{DateTime, Utc};

use super::{require_id, roster, selection};
use crate::error::AppError;
use crate::models::{NewPullRequest, PullRequest, PullRequestStatus};
use crate::store::EntityStore;

/// What a merge request does to a pull request in its current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeTransition {
    /// OPEN -> MERGED, stamping `merged_at`.
    Merge { merged_at: DateTime<Utc> },
    /// Already merged; nothing changes.
    AlreadyMerged,
}

/// Decide the merge transition for `pr` at time `now`.
pub fn plan_merge(pr: &PullRequest, now: DateTime<Utc>) -> MergeTransition {
    match pr.status {
        PullRequestStatus::Open => MergeTransition::Merge { merged_at: now },
        PullRequestStatus::Merged => MergeTransition::AlreadyMerged,
    }
}

/// Reviewer changes are only allowed while the PR is open.
pub fn ensure_open(pr: &PullRequest) -> Result<(), AppError> {
    if pr.is_open() {
        Ok(())
    } else {
        Err(AppError::pr_merged(pr.pull_request_id.as_str()))
    }
}

/// Create an OPEN pull request and assign up to `max_reviewers` reviewers
/// from the author's active teammates.
///
/// Checks, in order: duplicate PR ID (`PR_EXISTS`), unknown author or
/// author team (`NOT_FOUND`). An author without active teammates gets a PR
/// with no reviewers.
pub async fn create_pull_request<S: EntityStore>(
    store: &mut S,
    input: NewPullRequest,
    now: DateTime<Utc>,
    max_reviewers: usize,
) -> Result<PullRequest, AppError> {
    require_id(&input.pull_request_id, "pull_request_id")?;
    require_id(&input.author_id, "author_id")?;

    if store.get_pull_request(&input.pull_request_id).await?.is_some() {
        return Err(AppError::pr_exists());
    }

    let roster = roster::active_teammates(store, &input.author_id).await?;
    let reviewers =
        selection::select_reviewers(&roster.user, &roster.active_teammates, max_reviewers);

    let pr = PullRequest {
        pull_request_id: input.pull_request_id,
        pull_request_name: input.pull_request_name,
        author_id: input.author_id,
        status: PullRequestStatus::Open,
        assigned_reviewers: reviewers,
        created_at: now,
        merged_at: None,
    };

    store.create_pull_request(&pr).await?;
    for reviewer in &pr.assigned_reviewers {
        store.add_reviewer(&pr.pull_request_id, reviewer).await?;
    }

    log::info!(
        "[review] Created PR {} by {} in team {} with {} reviewer(s)",
        pr.pull_request_id,
        pr.author_id,
        roster.team_name,
        pr.assigned_reviewers.len()
    );

    Ok(pr)
}

/// Merge a pull request. Idempotent: a merged PR is returned unchanged.
pub async fn merge_pull_request<S: EntityStore>(
    store: &mut S,
    pull_request_id: &str,
    now: DateTime<Utc>,
) -> Result<PullRequest, AppError> {
    require_id(pull_request_id, "pull_request_id")?;

    let pr = store
        .get_pull_request(pull_request_id)
        .await?
        .ok_or_else(|| AppError::not_found("PR", pull_request_id))?;

    match plan_merge(&pr, now) {
        MergeTransition::AlreadyMerged => {
            log::debug!("[review] PR {} already merged", pull_request_id);
            Ok(pr)
        }
        MergeTransition::Merge { merged_at } => {
            store
                .update_pull_request_status(
                    pull_request_id,
                    PullRequestStatus::Merged,
                    Some(merged_at),
                )
                .await?;

            log::info!("[review] Merged PR {}", pull_request_id);

            // Reload so both the first and any repeated merge report the
            // stored timestamp.
            store
                .get_pull_request(pull_request_id)
                .await?
                .ok_or_else(|| AppError::not_found("PR", pull_request_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::reassignment::reassign_reviewer;
    use crate::store::test_support::{seed, user};
    use crate::store::InMemoryStore;
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        "2026-04-01T09:00:00Z".parse().unwrap()
    }

    fn new_pr(id: &str, author: &str) -> NewPullRequest {
        NewPullRequest {
            pull_request_id: id.to_string(),
            pull_request_name: format!("Change {}", id),
            author_id: author.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_first_two_active_teammates() {
        let mut store = InMemoryStore::new();
        seed(&mut store).await;

        let pr = create_pull_request(&mut store, new_pr("pr-1", "A"), t0(), 2)
            .await
            .unwrap();

        assert_eq!(pr.assigned_reviewers, vec!["B", "C"]);
        assert_eq!(pr.status, PullRequestStatus::Open);
        assert_eq!(pr.created_at, t0());
        assert!(pr.merged_at.is_none());

        let stored = store.get_pull_request("pr-1").await.unwrap().unwrap();
        assert_eq!(stored, pr);
    }

    #[tokio::test]
    async fn test_create_never_assigns_author() {
        let mut store = InMemoryStore::new();
        seed(&mut store).await;

        for author in ["A", "B", "C", "D"] {
            let pr = create_pull_request(&mut store, new_pr(&format!("pr-{}", author), author), t0(), 2)
                .await
                .unwrap();
            assert_eq!(pr.assigned_reviewers.len(), 2);
            assert!(!pr.has_reviewer(author));
        }
    }

    #[tokio::test]
    async fn test_create_without_teammates() {
        let mut store = InMemoryStore::new();
        store.create_team("solo").await.unwrap();
        store.upsert_user(&user("S", "solo", true)).await.unwrap();
        store.upsert_user(&user("T", "solo", false)).await.unwrap();

        let pr = create_pull_request(&mut store, new_pr("pr-1", "S"), t0(), 2)
            .await
            .unwrap();
        assert!(pr.assigned_reviewers.is_empty());
    }

    #[tokio::test]
    async fn test_create_with_single_teammate() {
        let mut store = InMemoryStore::new();
        store.create_team("pair").await.unwrap();
        store.upsert_user(&user("P", "pair", true)).await.unwrap();
        store.upsert_user(&user("Q", "pair", true)).await.unwrap();

        let pr = create_pull_request(&mut store, new_pr("pr-1", "P"), t0(), 2)
            .await
            .unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["Q"]);
    }

    #[tokio::test]
    async fn test_create_duplicate_id() {
        let mut store = InMemoryStore::new();
        seed(&mut store).await;

        create_pull_request(&mut store, new_pr("pr-1", "A"), t0(), 2)
            .await
            .unwrap();
        let err = create_pull_request(&mut store, new_pr("pr-1", "X"), t0(), 2)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "PR_EXISTS");
    }

    #[tokio::test]
    async fn test_create_unknown_author() {
        let mut store = InMemoryStore::new();
        seed(&mut store).await;

        let err = create_pull_request(&mut store, new_pr("pr-1", "ghost"), t0(), 2)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
        assert!(store.get_pull_request("pr-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_empty_id() {
        let mut store = InMemoryStore::new();
        seed(&mut store).await;

        let err = create_pull_request(&mut store, new_pr("  ", "A"), t0(), 2)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_merge_is_idempotent() {
        let mut store = InMemoryStore::new();
        seed(&mut store).await;
        create_pull_request(&mut store, new_pr("pr-1", "A"), t0(), 2)
            .await
            .unwrap();

        let merged_at = t0() + Duration::hours(3);
        let first = merge_pull_request(&mut store, "pr-1", merged_at).await.unwrap();
        let second = merge_pull_request(&mut store, "pr-1", merged_at + Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(first.status, PullRequestStatus::Merged);
        assert_eq!(first.merged_at, Some(merged_at));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_merge_unknown_pr() {
        let mut store = InMemoryStore::new();
        let err = merge_pull_request(&mut store, "pr-404", t0()).await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_merge_freezes_reviewers() {
        let mut store = InMemoryStore::new();
        seed(&mut store).await;
        create_pull_request(&mut store, new_pr("pr-1", "A"), t0(), 2)
            .await
            .unwrap();
        merge_pull_request(&mut store, "pr-1", t0()).await.unwrap();

        let err = reassign_reviewer(&mut store, "pr-1", "B").await.unwrap_err();
        assert_eq!(err.code(), "PR_MERGED");

        let pr = store.get_pull_request("pr-1").await.unwrap().unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["B", "C"]);
    }

    #[test]
    fn test_plan_merge() {
        let mut pr = crate::store::test_support::open_pr("pr-1", "A");
        assert_eq!(
            plan_merge(&pr, t0()),
            MergeTransition::Merge { merged_at: t0() }
        );
        assert!(ensure_open(&pr).is_ok());

        pr.status = PullRequestStatus::Merged;
        assert_eq!(plan_merge(&pr, t0()), MergeTransition::AlreadyMerged);
        assert_eq!(ensure_open(&pr).unwrap_err().code(), "PR_MERGED");
    }
}
