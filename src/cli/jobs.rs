//! Jobs command arguments

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use std::path::PathBuf;

use super::common::{parse_ttl, ListArgs, OutputFormat};
use crate::config::jobs;
use crate::platform::jobs::JobState;

/// Actions for the 'jobs' command
#[derive(Subcommand, Debug)]
pub enum JobsAction {
    /// List jobs (archived jobs are hidden unless searched for)
    #[command(visible_alias = "ls")]
    List(JobsListArgs),

    /// Show details of jobs
    Info {
        /// Job IDs
        #[arg(required = true)]
        ids: Vec<String>,

        /// Output format
        #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },

    /// Upload a job request
    Upload(JobsUploadArgs),

    /// Start jobs
    Start {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Archive jobs
    Archive {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Unarchive jobs
    Unarchive {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Force kill queued or scheduled jobs
    Kill {
        #[arg(required = true)]
        ids: Vec<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long, default_value_t = false)]
        yes: bool,
    },

    /// Delete jobs that have not been started
    #[command(visible_alias = "rm")]
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long, default_value_t = false)]
        yes: bool,
    },

    /// Extend or shorten the expiration of jobs
    Ttl {
        #[arg(required = true)]
        ids: Vec<String>,

        /// Days to add (negative to shorten)
        #[arg(long, allow_hyphen_values = true)]
        days: i64,
    },

    /// Print the request a job was created from
    Request {
        /// Job ID
        id: String,
    },

    /// Print the status document of a job
    Status {
        /// Job ID
        id: String,
    },

    /// Download the logfile of a job (private analytics only)
    Log {
        /// Job ID
        id: String,

        /// Write to this path instead of printing
        #[arg(short = 'p', long)]
        path: Option<PathBuf>,
    },

    /// Print a signed URL to download the logfile of a job
    LogUrl {
        /// Job ID
        id: String,
    },

    /// Download the output of a job
    Download {
        /// Job ID
        id: String,

        /// Output path
        #[arg(short = 'p', long)]
        path: PathBuf,
    },

    /// Print a signed URL to download the output of a job
    DownloadUrl {
        /// Job ID
        id: String,
    },

    /// Wait for a job to complete
    Wait(WaitArgs),
}

/// Arguments for 'jobs list'
#[derive(Args, Debug)]
pub struct JobsListArgs {
    #[command(flatten)]
    pub list: ListArgs,

    /// Only jobs in this state (repeatable)
    #[arg(long = "state", value_name = "STATE")]
    pub states: Vec<JobState>,
}

/// Arguments for 'jobs upload'
#[derive(Args, Debug)]
pub struct JobsUploadArgs {
    /// Job request JSON file
    pub request: PathBuf,

    /// Name for the job
    #[arg(long)]
    pub name: String,

    /// Start the job immediately
    #[arg(long, default_value_t = false)]
    pub auto_start: bool,

    /// Expiration date of the job output (YYYY-MM-DD or RFC 3339)
    #[arg(long, value_name = "DATE", value_parser = parse_ttl)]
    pub ttl: Option<DateTime<Utc>>,
}

/// Arguments for 'jobs wait'
#[derive(Args, Debug)]
pub struct WaitArgs {
    /// Job ID
    pub id: String,

    /// Seconds between state checks
    #[arg(long, default_value_t = jobs::POLL_INTERVAL_SECS)]
    pub interval: u64,

    /// Seconds before giving up
    #[arg(long, default_value_t = jobs::MAX_WAIT_SECS)]
    pub max_wait: u64,
}
