//! Data models for the service.
//!
//! These models represent the entities held by the entity store and
//! returned over the HTTP API. Field names match the JSON wire format.

pub mod pull_request;
pub mod team;
pub mod user;

// Re-exports for convenient access
pub use pull_request::{NewPullRequest, PullRequest, PullRequestShort, PullRequestStatus};
pub use team::{NewTeam, Team, TeamMember};
pub use user::User;
