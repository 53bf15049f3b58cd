//! Service layer.
//!
//! `review_service` owns transactions and the write gate; `http_api` and
//! `http_server` expose it over HTTP.

pub mod http_api;
pub mod http_server;
pub mod review_service;

pub use review_service::ReviewService;
