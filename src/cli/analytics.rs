//! Analytics command arguments

use clap::{Args, Subcommand};
use std::path::PathBuf;

use super::common::ListArgs;
use crate::platform::analytics::ImageType;

/// Actions for the 'analytics' command
#[derive(Subcommand, Debug)]
pub enum AnalyticsAction {
    /// List analytics
    #[command(visible_alias = "ls")]
    List(AnalyticsListArgs),

    /// Print the documentation of an analytic
    Docs {
        /// Analytic ID
        id: String,
    },

    /// Upload documentation for a new analytic
    UploadDocs {
        /// Analytic documentation JSON file
        path: PathBuf,

        /// Analytic type, e.g. PLATFORM or IMAGE_TO_VIDEO
        #[arg(long)]
        analytic_type: Option<String>,
    },

    /// Upload a Docker image for an analytic
    UploadImage {
        /// Analytic ID
        id: String,

        /// Docker image tarball (.tar or .tar.gz)
        #[arg(short = 'i', long)]
        image_path: PathBuf,

        /// Image flavour (cpu or gpu)
        #[arg(short = 't', long)]
        image_type: ImageType,
    },

    /// Delete analytics
    #[command(visible_alias = "rm")]
    Delete {
        /// Analytic IDs
        #[arg(required = true)]
        ids: Vec<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long, default_value_t = false)]
        yes: bool,
    },
}

/// Arguments for 'analytics list'
#[derive(Args, Debug)]
pub struct AnalyticsListArgs {
    #[command(flatten)]
    pub list: ListArgs,

    /// Include every version of each analytic
    #[arg(short = 'a', long, default_value_t = false)]
    pub all_versions: bool,
}
