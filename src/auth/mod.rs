//! Token activation: installing, inspecting and removing the activated token

pub mod commands;
mod store;

pub use commands::run_auth_command;
pub use store::{activate_token, active_token_path, deactivate_token, load_token, TokenStore};
