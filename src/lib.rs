//! voxctl - Voxel51 Platform client SDK and command-line tool
//!
//! The library wraps the Platform REST API: token resolution, data upload
//! and download, job requests and lifecycle, analytics, platform status and
//! application users. The `voxctl` binary drives it from the shell.
//!
//! # Example
//!
//! ```bash
//! # Install a downloaded token
//! voxctl auth activate ~/Downloads/api-token.json
//!
//! # Upload a video and list your data
//! voxctl data upload video.mp4
//! voxctl data list --search name:video -c
//!
//! # Upload a job request, start it and wait for it
//! voxctl jobs upload job.json --name "vehicle sense" --auto-start
//! voxctl jobs wait <job-id>
//! voxctl jobs download <job-id> -p labels.json
//! ```

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod platform;
pub mod ui;

pub use auth::run_auth_command;
pub use cli::{Cli, Command, OutputFormat};
pub use error::{PlatformError, Result};
pub use platform::{
    run_analytics_command, run_data_command, run_jobs_command, run_status_command,
    run_users_command, ClientConfig, Deferred, JobRequest, JobState, PlatformClient,
    RemoteDataPath, Token, TokenKind, TokenResolver,
};
