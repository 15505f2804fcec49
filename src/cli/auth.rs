//! Auth command arguments

use clap::Subcommand;
use std::path::PathBuf;

/// Actions for the 'auth' command
#[derive(Subcommand, Debug)]
pub enum AuthAction {
    /// Show the activated token
    Show,

    /// Install a downloaded token file as the activated token
    Activate {
        /// Path to the token JSON file
        path: PathBuf,
    },

    /// Remove the activated token
    Deactivate {
        /// Skip confirmation prompt
        #[arg(short = 'y', long, default_value_t = false)]
        yes: bool,
    },
}
