//! PR Reviewer - team rosters and pull request reviewer assignment.
//!
//! Teams and users are registered through the directory operations. A new
//! pull request gets up to two active teammates of its author as reviewers;
//! reviewers can be swapped for another active member of their team until
//! the pull request is merged.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod review;
pub mod services;
pub mod store;
