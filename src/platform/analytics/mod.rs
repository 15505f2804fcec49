//! Analytics

mod api;
pub mod commands;
pub mod models;

pub use commands::run_analytics_command;
pub use models::{Analytic, ImageType};
