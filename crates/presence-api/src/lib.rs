//! # presence-api
//!
//! HTTP surface of the presence relay built on Axum.
//!
//! Provides the point-in-time REST queries, the server-sent-events stream,
//! a health endpoint, the origin allow-list guard, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
