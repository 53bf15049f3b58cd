//! SQLite implementation of `EntityStore`.
//!
//! Wraps a borrowed connection so the same code runs on a plain pooled
//! connection or inside a transaction (`&mut *tx`).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use super::EntityStore;
use crate::db::DbError;
use crate::models::{PullRequest, PullRequestShort, PullRequestStatus, Team, User};

pub struct SqliteStore<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }
}

/// Translate constraint violations into store conditions.
fn map_write_error(err: sqlx::Error, entity: &'static str, key: &str) -> DbError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return DbError::already_exists(entity, key);
        }
        if db_err.is_foreign_key_violation() {
            return DbError::NotFound {
                entity: "referenced row",
                key: key.to_string(),
            };
        }
    }
    DbError::Sqlite(err)
}

fn parse_status(raw: &str) -> Result<PullRequestStatus, DbError> {
    raw.parse().map_err(DbError::InvalidData)
}

fn short_from_row(row: &SqliteRow) -> Result<PullRequestShort, DbError> {
    let status: String = row.try_get("status")?;
    Ok(PullRequestShort {
        pull_request_id: row.try_get("pull_request_id")?,
        pull_request_name: row.try_get("pull_request_name")?,
        author_id: row.try_get("author_id")?,
        status: parse_status(&status)?,
    })
}

#[async_trait]
impl<'c> EntityStore for SqliteStore<'c> {
    async fn get_team(&mut self, team_name: &str) -> Result<Option<Team>, DbError> {
        let exists: Option<(String,)> =
            sqlx::query_as("SELECT team_name FROM teams WHERE team_name = ?")
                .bind(team_name)
                .fetch_optional(&mut *self.conn)
                .await?;

        let Some((team_name,)) = exists else {
            return Ok(None);
        };

        let members: Vec<User> = sqlx::query_as(
            r#"
            SELECT user_id, username, team_name, is_active
            FROM users
            WHERE team_name = ?
            ORDER BY user_id
            "#,
        )
        .bind(&team_name)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(Some(Team { team_name, members }))
    }

    async fn create_team(&mut self, team_name: &str) -> Result<(), DbError> {
        sqlx::query("INSERT INTO teams (team_name) VALUES (?)")
            .bind(team_name)
            .execute(&mut *self.conn)
            .await
            .map_err(|e| map_write_error(e, "team", team_name))?;

        Ok(())
    }

    async fn get_user(&mut self, user_id: &str) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, username, team_name, is_active FROM users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(user)
    }

    async fn upsert_user(&mut self, user: &User) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, username, team_name, is_active)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                username = excluded.username,
                team_name = excluded.team_name,
                is_active = excluded.is_active
            "#,
        )
        .bind(&user.user_id)
        .bind(&user.username)
        .bind(&user.team_name)
        .bind(user.is_active)
        .execute(&mut *self.conn)
        .await
        .map_err(|e| map_write_error(e, "user", &user.user_id))?;

        Ok(())
    }

    async fn set_user_active(
        &mut self,
        user_id: &str,
        is_active: bool,
    ) -> Result<User, DbError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET is_active = ?
            WHERE user_id = ?
            RETURNING user_id, username, team_name, is_active
            "#,
        )
        .bind(is_active)
        .bind(user_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        user.ok_or_else(|| DbError::not_found("user", user_id))
    }

    async fn users_by_team(
        &mut self,
        team_name: &str,
        is_active: bool,
    ) -> Result<Vec<User>, DbError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, username, team_name, is_active
            FROM users
            WHERE team_name = ? AND is_active = ?
            ORDER BY user_id
            "#,
        )
        .bind(team_name)
        .bind(is_active)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(users)
    }

    async fn get_pull_request(
        &mut self,
        pull_request_id: &str,
    ) -> Result<Option<PullRequest>, DbError> {
        let row = sqlx::query(
            r#"
            SELECT pull_request_id, pull_request_name, author_id, status, created_at, merged_at
            FROM pull_requests
            WHERE pull_request_id = ?
            "#,
        )
        .bind(pull_request_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let status: String = row.try_get("status")?;
        let assigned_reviewers = self.list_reviewers(pull_request_id).await?;

        Ok(Some(PullRequest {
            pull_request_id: row.try_get("pull_request_id")?,
            pull_request_name: row.try_get("pull_request_name")?,
            author_id: row.try_get("author_id")?,
            status: parse_status(&status)?,
            assigned_reviewers,
            created_at: row.try_get("created_at")?,
            merged_at: row.try_get("merged_at")?,
        }))
    }

    async fn create_pull_request(&mut self, pr: &PullRequest) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO pull_requests
                (pull_request_id, pull_request_name, author_id, status, created_at, merged_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&pr.pull_request_id)
        .bind(&pr.pull_request_name)
        .bind(&pr.author_id)
        .bind(pr.status.as_str())
        .bind(pr.created_at)
        .bind(pr.merged_at)
        .execute(&mut *self.conn)
        .await
        .map_err(|e| map_write_error(e, "pull request", &pr.pull_request_id))?;

        Ok(())
    }

    async fn update_pull_request_status(
        &mut self,
        pull_request_id: &str,
        status: PullRequestStatus,
        merged_at: Option<DateTime<Utc>>,
    ) -> Result<(), DbError> {
        let result = sqlx::query(
            "UPDATE pull_requests SET status = ?, merged_at = ? WHERE pull_request_id = ?",
        )
        .bind(status.as_str())
        .bind(merged_at)
        .bind(pull_request_id)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("pull request", pull_request_id));
        }

        Ok(())
    }

    async fn list_reviewers(&mut self, pull_request_id: &str) -> Result<Vec<String>, DbError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT user_id FROM pr_reviewers WHERE pull_request_id = ? ORDER BY rowid",
        )
        .bind(pull_request_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn add_reviewer(
        &mut self,
        pull_request_id: &str,
        user_id: &str,
    ) -> Result<(), DbError> {
        sqlx::query("INSERT INTO pr_reviewers (pull_request_id, user_id) VALUES (?, ?)")
            .bind(pull_request_id)
            .bind(user_id)
            .execute(&mut *self.conn)
            .await
            .map_err(|e| {
                map_write_error(e, "reviewer", &format!("{}/{}", pull_request_id, user_id))
            })?;

        Ok(())
    }

    async fn remove_reviewer(
        &mut self,
        pull_request_id: &str,
        user_id: &str,
    ) -> Result<(), DbError> {
        let result =
            sqlx::query("DELETE FROM pr_reviewers WHERE pull_request_id = ? AND user_id = ?")
                .bind(pull_request_id)
                .bind(user_id)
                .execute(&mut *self.conn)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(
                "reviewer",
                format!("{}/{}", pull_request_id, user_id),
            ));
        }

        Ok(())
    }

    async fn list_reviews_for_user(
        &mut self,
        user_id: &str,
    ) -> Result<Vec<PullRequestShort>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT pr.pull_request_id, pr.pull_request_name, pr.author_id, pr.status
            FROM pull_requests pr
            JOIN pr_reviewers r ON r.pull_request_id = pr.pull_request_id
            WHERE r.user_id = ?
            ORDER BY pr.created_at, pr.pull_request_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.conn)
        .await?;

        rows.iter().map(short_from_row).collect()
    }
}
