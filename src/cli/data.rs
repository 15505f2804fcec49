//! Data command arguments

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use std::path::PathBuf;

use super::common::{parse_ttl, ListArgs, OutputFormat};

/// Actions for the 'data' command
#[derive(Subcommand, Debug)]
pub enum DataAction {
    /// List uploaded data
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show details of data
    Info {
        /// Data IDs
        #[arg(required = true)]
        ids: Vec<String>,

        /// Output format
        #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },

    /// Upload files
    Upload {
        /// Files to upload
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Expiration date (YYYY-MM-DD or RFC 3339)
        #[arg(long, value_name = "DATE", value_parser = parse_ttl)]
        ttl: Option<DateTime<Utc>>,
    },

    /// Register data that is reachable through a signed URL
    PostUrl(PostUrlArgs),

    /// Download data
    Download {
        /// Data ID
        id: String,

        /// Output path (defaults to the uploaded file name)
        #[arg(short = 'p', long)]
        path: Option<PathBuf>,
    },

    /// Print a signed URL to download data
    DownloadUrl {
        /// Data ID
        id: String,
    },

    /// Extend or shorten the expiration of data
    Ttl {
        /// Data IDs
        #[arg(required = true)]
        ids: Vec<String>,

        /// Days to add (negative to shorten)
        #[arg(long, allow_hyphen_values = true)]
        days: i64,
    },

    /// Delete data
    #[command(visible_alias = "rm")]
    Delete {
        /// Data IDs
        #[arg(required = true)]
        ids: Vec<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long, default_value_t = false)]
        yes: bool,
    },
}

/// Arguments for 'data post-url'
#[derive(Args, Debug)]
pub struct PostUrlArgs {
    /// Signed URL with read access to the data
    pub url: String,

    /// File name of the data
    #[arg(long)]
    pub filename: String,

    /// MIME type of the data
    #[arg(long)]
    pub mime_type: String,

    /// Size of the data in bytes
    #[arg(long)]
    pub size: u64,

    /// Content encoding of the data
    #[arg(long)]
    pub encoding: Option<String>,

    /// Expiration date (YYYY-MM-DD or RFC 3339)
    #[arg(long, value_name = "DATE", value_parser = parse_ttl)]
    pub ttl: Option<DateTime<Utc>>,
}
