//! Core types, calendar bucketing, and the streak engine for Cadence.
//!
//! This crate is deliberately free of database and CLI dependencies.
//! Storage backends implement [`store::HabitStore`]; reporting layers call
//! into [`engine::StreakEngine`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod bucket;
pub mod completion;
pub mod engine;
pub mod error;
pub mod habit;
pub mod store;
pub mod streak;

pub use error::{Error, Result};
