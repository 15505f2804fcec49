//! CLI argument parsing

mod analytics;
mod auth;
mod common;
mod data;
mod jobs;
mod users;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::defaults;
use crate::platform::credentials::TokenKind;

pub use analytics::{AnalyticsAction, AnalyticsListArgs};
pub use auth::AuthAction;
pub use common::{ListArgs, OutputFormat};
pub use data::{DataAction, PostUrlArgs};
pub use jobs::{JobsAction, JobsListArgs, JobsUploadArgs, WaitArgs};
pub use users::UsersAction;

/// Voxel51 Platform command-line tool
#[derive(Parser, Debug)]
#[command(name = "voxctl")]
#[command(version)]
#[command(about = "Work with data, jobs and analytics on the Voxel51 Platform", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Token file to use instead of the environment or the activated token
    #[arg(long, global = true, value_name = "PATH")]
    pub token: Option<PathBuf>,

    /// Authenticate with the application token
    #[arg(long, global = true, default_value_t = false)]
    pub app: bool,

    /// API base URL including the version path (overrides the token's)
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, global = true, default_value = defaults::LOG_LEVEL)]
    pub log_level: String,

    /// Batch mode: no prompts or spinners
    #[arg(long, global = true, default_value_t = false)]
    pub batch: bool,

    /// Omit table headers and counts
    #[arg(long, global = true, default_value_t = false)]
    pub no_header: bool,
}

impl Cli {
    /// Token kind selected by `--app`
    pub fn token_kind(&self) -> TokenKind {
        if self.app {
            TokenKind::Application
        } else {
            TokenKind::User
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage the activated token
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Upload, inspect and delete data
    Data {
        #[command(subcommand)]
        action: DataAction,
    },

    /// Create, run and inspect jobs
    #[command(visible_alias = "job")]
    Jobs {
        #[command(subcommand)]
        action: JobsAction,
    },

    /// Browse and deploy analytics
    #[command(visible_alias = "analytic")]
    Analytics {
        #[command(subcommand)]
        action: AnalyticsAction,
    },

    /// Manage application users (application token only)
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },

    /// Show Platform service status
    Status {
        /// Output format
        #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
}
