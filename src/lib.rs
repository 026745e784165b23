//! Model artifact fetcher library
//!
//! This library provides the core functionality for the `mtfetch` CLI:
//! batch fetching of model files, archive installation and the built-in
//! translation model sets.

pub mod commands;
pub mod core;
pub mod error;
pub mod utils;
