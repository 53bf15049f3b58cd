//! Team roster resolution.

use crate::error::AppError;
use crate::models::User;
use crate::store::EntityStore;

/// A user together with the active members of their team.
#[derive(Debug, Clone)]
pub struct Roster {
    pub user: User,
    pub team_name: String,
    /// Active teammates other than `user`, ascending by `user_id`.
    pub active_teammates: Vec<User>,
}

/// Resolve `user_id`'s team and its currently active members.
///
/// Fails with `NotFound` when the user does not exist, has no team, or the
/// team row is missing. Read-only.
pub async fn active_teammates<S: EntityStore>(
    store: &mut S,
    user_id: &str,
) -> Result<Roster, AppError> {
    let user = store
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user", user_id))?;

    let team_name = user
        .team_name
        .clone()
        .ok_or_else(|| AppError::not_found("team", format!("of user {}", user_id)))?;

    let team = store
        .get_team(&team_name)
        .await?
        .ok_or_else(|| AppError::not_found("team", team_name.as_str()))?;

    let active_teammates = team
        .members
        .into_iter()
        .filter(|m| m.is_active && m.user_id != user.user_id)
        .collect();

    Ok(Roster {
        user,
        team_name,
        active_teammates,
    })
}
