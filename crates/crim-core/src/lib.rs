//! Core types and trait definitions for the CRIM catalog data layer.
//!
//! This crate is deliberately free of database dependencies. The SQLite
//! backend and the import tooling both depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod catalog;
pub mod date;
pub mod error;
pub mod relationship;
pub mod slug;
pub mod store;

pub use error::{Error, Result};
