//! Application user command arguments

use clap::Subcommand;

use super::common::OutputFormat;

/// Actions for the 'users' command
#[derive(Subcommand, Debug)]
pub enum UsersAction {
    /// List application users
    List {
        /// Output format
        #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },

    /// Create an application user
    Create {
        /// Username for the new user
        username: String,
    },
}
