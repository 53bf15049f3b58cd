//! Transactional entry point for review operations.
//!
//! Every mutating call takes the write gate and runs inside one SQLite
//! transaction. A call that fails drops the transaction, which rolls back
//! whatever it wrote. Reads open their own transaction so multi-query
//! lookups see a single snapshot, and never wait on the gate.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::config::ReviewConfig;
use crate::db::pool::DbPool;
use crate::error::AppError;
use crate::models::{NewPullRequest, NewTeam, PullRequest, Team, User};
use crate::review::{directory, lifecycle, reassignment, Reassignment, UserReviews};
use crate::store::SqliteStore;

/// Shared, cloneable handle used by the HTTP layer.
#[derive(Clone)]
pub struct ReviewService {
    pool: DbPool,
    write_gate: Arc<Mutex<()>>,
    max_reviewers: usize,
}

impl ReviewService {
    pub fn new(pool: DbPool, config: &ReviewConfig) -> Self {
        Self {
            pool,
            write_gate: Arc::new(Mutex::new(())),
            max_reviewers: config.max_reviewers,
        }
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Create a team and upsert its members.
    pub async fn add_team(&self, input: NewTeam) -> Result<Team, AppError> {
        let _gate = self.write_gate.lock().await;
        let mut tx = self.pool.begin().await?;

        let team = directory::add_team(&mut SqliteStore::new(&mut *tx), input).await?;

        tx.commit().await?;
        Ok(team)
    }

    pub async fn get_team(&self, team_name: &str) -> Result<Team, AppError> {
        let mut tx = self.pool.begin().await?;
        directory::get_team(&mut SqliteStore::new(&mut *tx), team_name).await
    }

    pub async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User, AppError> {
        let _gate = self.write_gate.lock().await;
        let mut tx = self.pool.begin().await?;

        let user =
            directory::set_user_active(&mut SqliteStore::new(&mut *tx), user_id, is_active).await?;

        tx.commit().await?;
        Ok(user)
    }

    pub async fn reviews_for_user(&self, user_id: &str) -> Result<UserReviews, AppError> {
        let mut tx = self.pool.begin().await?;
        directory::reviews_for_user(&mut SqliteStore::new(&mut *tx), user_id).await
    }

    /// Create a pull request and assign its reviewers.
    pub async fn create_pull_request(&self, input: NewPullRequest) -> Result<PullRequest, AppError> {
        let _gate = self.write_gate.lock().await;
        let mut tx = self.pool.begin().await?;

        let pr = lifecycle::create_pull_request(
            &mut SqliteStore::new(&mut *tx),
            input,
            Utc::now(),
            self.max_reviewers,
        )
        .await?;

        tx.commit().await?;
        Ok(pr)
    }

    pub async fn merge_pull_request(&self, pull_request_id: &str) -> Result<PullRequest, AppError> {
        let _gate = self.write_gate.lock().await;
        let mut tx = self.pool.begin().await?;

        let pr = lifecycle::merge_pull_request(
            &mut SqliteStore::new(&mut *tx),
            pull_request_id,
            Utc::now(),
        )
        .await?;

        tx.commit().await?;
        Ok(pr)
    }

    pub async fn reassign_reviewer(
        &self,
        pull_request_id: &str,
        old_user_id: &str,
    ) -> Result<Reassignment, AppError> {
        let _gate = self.write_gate.lock().await;
        let mut tx = self.pool.begin().await?;

        let result = reassignment::reassign_reviewer(
            &mut SqliteStore::new(&mut *tx),
            pull_request_id,
            old_user_id,
        )
        .await?;

        tx.commit().await?;
        Ok(result)
    }
}
