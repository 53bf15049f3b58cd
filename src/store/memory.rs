//! In-memory implementation of `EntityStore`.
//!
//! Holds every entity in ordered maps, so iteration already yields the
//! ascending `user_id` order the SQLite store produces. All state is lost
//! when the store is dropped.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::EntityStore;
use crate::db::DbError;
use crate::models::{PullRequest, PullRequestShort, PullRequestStatus, Team, User};

#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    teams: BTreeSet<String>,
    users: BTreeMap<String, User>,
    /// Pull requests without reviewers; see `reviewers`.
    pull_requests: BTreeMap<String, PullRequest>,
    /// Reviewer IDs per PR, in assignment order.
    reviewers: BTreeMap<String, Vec<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_reviewers(&self, pr: &PullRequest) -> PullRequest {
        let mut pr = pr.clone();
        pr.assigned_reviewers = self
            .reviewers
            .get(&pr.pull_request_id)
            .cloned()
            .unwrap_or_default();
        pr
    }
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn get_team(&mut self, team_name: &str) -> Result<Option<Team>, DbError> {
        if !self.teams.contains(team_name) {
            return Ok(None);
        }

        let members = self
            .users
            .values()
            .filter(|u| u.is_member_of(team_name))
            .cloned()
            .collect();

        Ok(Some(Team {
            team_name: team_name.to_string(),
            members,
        }))
    }

    async fn create_team(&mut self, team_name: &str) -> Result<(), DbError> {
        if !self.teams.insert(team_name.to_string()) {
            return Err(DbError::already_exists("team", team_name));
        }
        Ok(())
    }

    async fn get_user(&mut self, user_id: &str) -> Result<Option<User>, DbError> {
        Ok(self.users.get(user_id).cloned())
    }

    async fn upsert_user(&mut self, user: &User) -> Result<(), DbError> {
        if let Some(team) = &user.team_name {
            if !self.teams.contains(team) {
                return Err(DbError::not_found("team", team.as_str()));
            }
        }
        self.users.insert(user.user_id.clone(), user.clone());
        Ok(())
    }

    async fn set_user_active(
        &mut self,
        user_id: &str,
        is_active: bool,
    ) -> Result<User, DbError> {
        let user = self
            .users
            .get_mut(user_id)
            .ok_or_else(|| DbError::not_found("user", user_id))?;
        user.is_active = is_active;
        Ok(user.clone())
    }

    async fn users_by_team(
        &mut self,
        team_name: &str,
        is_active: bool,
    ) -> Result<Vec<User>, DbError> {
        Ok(self
            .users
            .values()
            .filter(|u| u.is_member_of(team_name) && u.is_active == is_active)
            .cloned()
            .collect())
    }

    async fn get_pull_request(
        &mut self,
        pull_request_id: &str,
    ) -> Result<Option<PullRequest>, DbError> {
        Ok(self
            .pull_requests
            .get(pull_request_id)
            .map(|pr| self.with_reviewers(pr)))
    }

    async fn create_pull_request(&mut self, pr: &PullRequest) -> Result<(), DbError> {
        if self.pull_requests.contains_key(&pr.pull_request_id) {
            return Err(DbError::already_exists("pull request", pr.pull_request_id.as_str()));
        }
        if !self.users.contains_key(&pr.author_id) {
            return Err(DbError::not_found("user", pr.author_id.as_str()));
        }

        let mut stored = pr.clone();
        stored.assigned_reviewers.clear();
        self.pull_requests.insert(pr.pull_request_id.clone(), stored);
        Ok(())
    }

    async fn update_pull_request_status(
        &mut self,
        pull_request_id: &str,
        status: PullRequestStatus,
        merged_at: Option<DateTime<Utc>>,
    ) -> Result<(), DbError> {
        let pr = self
            .pull_requests
            .get_mut(pull_request_id)
            .ok_or_else(|| DbError::not_found("pull request", pull_request_id))?;
        pr.status = status;
        pr.merged_at = merged_at;
        Ok(())
    }

    async fn list_reviewers(&mut self, pull_request_id: &str) -> Result<Vec<String>, DbError> {
        Ok(self
            .reviewers
            .get(pull_request_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_reviewer(
        &mut self,
        pull_request_id: &str,
        user_id: &str,
    ) -> Result<(), DbError> {
        if !self.pull_requests.contains_key(pull_request_id) {
            return Err(DbError::not_found("pull request", pull_request_id));
        }
        if !self.users.contains_key(user_id) {
            return Err(DbError::not_found("user", user_id));
        }

        let reviewers = self.reviewers.entry(pull_request_id.to_string()).or_default();
        if reviewers.iter().any(|r| r == user_id) {
            return Err(DbError::already_exists(
                "reviewer",
                format!("{}/{}", pull_request_id, user_id),
            ));
        }
        reviewers.push(user_id.to_string());
        Ok(())
    }

    async fn remove_reviewer(
        &mut self,
        pull_request_id: &str,
        user_id: &str,
    ) -> Result<(), DbError> {
        let missing = || DbError::not_found("reviewer", format!("{}/{}", pull_request_id, user_id));

        let reviewers = self.reviewers.get_mut(pull_request_id).ok_or_else(missing)?;
        let position = reviewers
            .iter()
            .position(|r| r == user_id)
            .ok_or_else(missing)?;
        reviewers.remove(position);
        Ok(())
    }

    async fn list_reviews_for_user(
        &mut self,
        user_id: &str,
    ) -> Result<Vec<PullRequestShort>, DbError> {
        let mut prs: Vec<&PullRequest> = self
            .pull_requests
            .values()
            .filter(|pr| {
                self.reviewers
                    .get(&pr.pull_request_id)
                    .is_some_and(|r| r.iter().any(|id| id == user_id))
            })
            .collect();
        prs.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.pull_request_id.cmp(&b.pull_request_id))
        });

        Ok(prs.into_iter().map(PullRequest::to_short).collect())
    }
}
