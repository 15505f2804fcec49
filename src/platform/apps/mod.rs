//! Application token operations: users and cross-user queries

mod api;
pub mod commands;

pub use commands::run_users_command;
