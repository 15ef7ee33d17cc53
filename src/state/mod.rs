//! State management module
//!
//! This module handles all persistent and session state, including:
//! - The project record store (library.rs)
//! - Shared data structures (data.rs) and partial edits (edit.rs)
//! - Persistence backends (backend.rs, catalog.rs) and seed data (seed.rs)
//! - Change subscriptions (subscription.rs)
//! - The admin permission gate (session.rs)

pub mod backend;
pub mod catalog;
pub mod data;
pub mod edit;
pub mod library;
pub mod seed;
pub mod session;
pub mod subscription;
