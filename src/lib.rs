//! Leitner-box spaced repetition for solved coding problems.
//!
//! The crate is layered bottom-up:
//! - [`database`]: SQLite handle and schema
//! - [`cards`]: scheduler, validation and card storage
//! - [`users`]: accounts and sessions
//! - [`service`]: the [`service::Tracker`] used by both binaries
//! - [`server`]: JSON HTTP API
//! - [`backup`]: CSV export and restore

pub mod backup;
pub mod cards;
pub mod config;
pub mod database;
pub mod server;
pub mod service;
pub mod users;
