//! easyjob timecard CLI library.
//!
//! This crate provides the command-line interface around the API client
//! and the polling coordinator.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;
