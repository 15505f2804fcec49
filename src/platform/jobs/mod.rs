//! Jobs: requests, lifecycle actions and completion polling

mod api;
pub mod commands;
pub mod models;
pub mod polling;

pub use commands::run_jobs_command;
pub use models::{
    Job, JobComputeMode, JobFailureType, JobParameter, JobRequest, JobState, RemoteDataPath,
};
pub use polling::{check_complete, wait_for_completion, JobStateSource};
