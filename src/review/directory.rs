//! Team and user directory operations.

use serde::Serialize;

use super::require_id;
use crate::error::AppError;
use crate::models::{NewTeam, PullRequestShort, Team, User};
use crate::store::EntityStore;

/// Pull requests a user is assigned to review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserReviews {
    pub user_id: String,
    pub pull_requests: Vec<PullRequestShort>,
}

/// Create a team and upsert its members.
///
/// Members that already exist are moved into the new team and take the
/// name and activity flag from the request.
pub async fn add_team<S: EntityStore>(store: &mut S, input: NewTeam) -> Result<Team, AppError> {
    require_id(&input.team_name, "team_name")?;
    for member in &input.members {
        require_id(&member.user_id, "user_id")?;
    }

    if store.get_team(&input.team_name).await?.is_some() {
        return Err(AppError::team_exists());
    }

    store.create_team(&input.team_name).await?;

    let member_count = input.members.len();
    for member in input.members {
        store.upsert_user(&member.into_user(&input.team_name)).await?;
    }

    log::info!(
        "[directory] Added team {} with {} member(s)",
        input.team_name,
        member_count
    );

    store
        .get_team(&input.team_name)
        .await?
        .ok_or_else(|| AppError::not_found("team", input.team_name.as_str()))
}

/// Get a team with its members, ascending by `user_id`.
pub async fn get_team<S: EntityStore>(store: &mut S, team_name: &str) -> Result<Team, AppError> {
    require_id(team_name, "team_name")?;

    store
        .get_team(team_name)
        .await?
        .ok_or_else(|| AppError::not_found("team", team_name))
}

/// Flip a user's activity flag.
///
/// Existing reviewer assignments are left alone; the flag only affects
/// future selection and reassignment.
pub async fn set_user_active<S: EntityStore>(
    store: &mut S,
    user_id: &str,
    is_active: bool,
) -> Result<User, AppError> {
    require_id(user_id, "user_id")?;

    let user = store.set_user_active(user_id, is_active).await?;

    log::info!(
        "[directory] User {} is now {}",
        user.user_id,
        if user.is_active { "active" } else { "inactive" }
    );

    Ok(user)
}

/// List every pull request, open or merged, that `user_id` reviews.
pub async fn reviews_for_user<S: EntityStore>(
    store: &mut S,
    user_id: &str,
) -> Result<UserReviews, AppError> {
    require_id(user_id, "user_id")?;

    if store.get_user(user_id).await?.is_none() {
        return Err(AppError::not_found("user", user_id));
    }

    let pull_requests = store.list_reviews_for_user(user_id).await?;

    Ok(UserReviews {
        user_id: user_id.to_string(),
        pull_requests,
    })
}
