//! Auth and admin service for chess-arena
//!
//! - [`api`] - router and shared state
//! - [`auth`] - registration, login and token endpoints
//! - [`admin`] - user management for admins
//! - [`db`] - SQLite pool, schema and user rows
//! - [`token`] - JWT issue and verification
//! - [`config`] - settings read from the environment
//! - [`error`] - [`ApiError`](error::ApiError) and its JSON response

pub mod admin;
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod token;
