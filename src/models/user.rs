//! User model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A team member who can author pull requests and review them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: String,

    /// Display name.
    pub username: String,

    /// Team the user currently belongs to, if any.
    pub team_name: Option<String>,

    /// Only active users are picked as reviewers.
    pub is_active: bool,
}

impl User {
    /// Check whether the user belongs to `team_name`.
    pub fn is_member_of(&self, team_name: &str) -> bool {
        self.team_name.as_deref() == Some(team_name)
    }
}
