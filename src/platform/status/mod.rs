//! Platform status

mod api;
pub mod commands;

pub use commands::run_status_command;
