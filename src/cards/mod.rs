//! Problem cards and Leitner-box scheduling
//!
//! This module provides:
//! - Card models (a solved problem and its review schedule)
//! - The fixed-interval Leitner scheduler
//! - Input validation shared by the HTTP API and the CLI
//! - Title derivation from problem links
//! - Owner-scoped SQLite storage

pub mod algorithm;
pub mod errors;
pub mod models;
pub mod storage;
pub mod title;
pub mod validate;

pub use errors::{CardError, CardResult};
pub use models::*;
pub use storage::CardStorage;
pub use title::{LeetCodeSlugTitle, NoTitleResolver, TitleResolver};
