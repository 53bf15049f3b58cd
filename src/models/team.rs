//! Team model.

use serde::{Deserialize, Serialize};

use super::User;

/// A named team and its members.
///
/// Members reference the team by name; `members` is always sorted by
/// ascending `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub team_name: String,
    pub members: Vec<User>,
}

/// Member entry of a team creation request.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamMember {
    pub user_id: String,
    pub username: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Input for creating a team.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTeam {
    pub team_name: String,
    #[serde(default)]
    pub members: Vec<TeamMember>,
}

impl TeamMember {
    /// Build the stored user record for this member of `team_name`.
    pub fn into_user(self, team_name: &str) -> User {
        User {
            user_id: self.user_id,
            username: self.username,
            team_name: Some(team_name.to_string()),
            is_active: self.is_active,
        }
    }
}
