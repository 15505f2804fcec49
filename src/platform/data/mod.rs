//! Data uploaded to the Platform

mod api;
pub mod commands;
pub mod models;

pub use commands::run_data_command;
pub use models::{Data, PostDataUrl};
