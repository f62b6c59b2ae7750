//! HTTP request handlers.

pub mod activities;
pub mod health;
pub mod stream;
