//! CLI subcommand implementations.

pub mod calendar;
pub mod check;
pub mod resource;
pub mod status;
pub mod watch;
pub mod work;
