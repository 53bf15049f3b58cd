//! Entity store abstraction.
//!
//! This module defines the `EntityStore` trait that review operations use
//! to read and write teams, users, pull requests and reviewer associations.
//! Operations receive the store as a parameter; the SQLite implementation
//! wraps a single connection or transaction, the in-memory one backs unit
//! tests.
//!
//! Every implementation returns users in ascending `user_id` order and
//! reviewers in assignment order. Candidate selection depends on both.

mod memory;
mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::DbError;
use crate::models::{PullRequest, PullRequestShort, PullRequestStatus, Team, User};

/// Read/write access to persisted entities.
///
/// Lookups return `Ok(None)` when the key is unknown. Inserts fail with
/// [`DbError::AlreadyExists`] and updates of missing rows fail with
/// [`DbError::NotFound`].
#[async_trait]
pub trait EntityStore: Send {
    /// Get a team with its members.
    async fn get_team(&mut self, team_name: &str) -> Result<Option<Team>, DbError>;

    /// Create an empty team.
    async fn create_team(&mut self, team_name: &str) -> Result<(), DbError>;

    async fn get_user(&mut self, user_id: &str) -> Result<Option<User>, DbError>;

    /// Insert the user, or overwrite name, team and activity of an existing one.
    async fn upsert_user(&mut self, user: &User) -> Result<(), DbError>;

    /// Set a user's activity flag, returning the updated user.
    async fn set_user_active(&mut self, user_id: &str, is_active: bool)
        -> Result<User, DbError>;

    /// Members of `team_name` whose activity flag equals `is_active`.
    async fn users_by_team(
        &mut self,
        team_name: &str,
        is_active: bool,
    ) -> Result<Vec<User>, DbError>;

    /// Get a pull request, reviewers included.
    async fn get_pull_request(
        &mut self,
        pull_request_id: &str,
    ) -> Result<Option<PullRequest>, DbError>;

    /// Insert a pull request row. `assigned_reviewers` is ignored; reviewers
    /// are added with [`EntityStore::add_reviewer`].
    async fn create_pull_request(&mut self, pr: &PullRequest) -> Result<(), DbError>;

    async fn update_pull_request_status(
        &mut self,
        pull_request_id: &str,
        status: PullRequestStatus,
        merged_at: Option<DateTime<Utc>>,
    ) -> Result<(), DbError>;

    /// Reviewer user IDs in assignment order.
    async fn list_reviewers(&mut self, pull_request_id: &str) -> Result<Vec<String>, DbError>;

    async fn add_reviewer(&mut self, pull_request_id: &str, user_id: &str)
        -> Result<(), DbError>;

    async fn remove_reviewer(
        &mut self,
        pull_request_id: &str,
        user_id: &str,
    ) -> Result<(), DbError>;

    /// Pull requests `user_id` reviews, oldest first.
    async fn list_reviews_for_user(
        &mut self,
        user_id: &str,
    ) -> Result<Vec<PullRequestShort>, DbError>;
}
