//! Job completion polling

use log::debug;
use std::future::Future;
use std::time::{Duration, Instant};

use crate::error::{PlatformError, Result};

use super::models::JobState;

/// Anything that can report the current state of a job
pub trait JobStateSource {
    fn job_state(&self, job_id: &str) -> impl Future<Output = Result<JobState>> + Send;
}

/// Interpret a state for completion: FAILED is an error, COMPLETE is `true`
pub fn check_complete(job_id: &str, state: JobState) -> Result<bool> {
    match state {
        JobState::Failed => Err(PlatformError::JobFailed {
            job_id: job_id.to_string(),
        }),
        JobState::Complete => Ok(true),
        _ => Ok(false),
    }
}

/// Poll `source` every `interval` until the job completes
///
/// Errors with [`PlatformError::JobFailed`] as soon as the job is seen in
/// the FAILED state, and with [`PlatformError::JobTimeout`] once more than
/// `max_wait` has elapsed.
pub async fn wait_for_completion<S: JobStateSource>(
    source: &S,
    job_id: &str,
    interval: Duration,
    max_wait: Duration,
) -> Result<()> {
    let start = Instant::now();
    let mut polls = 0u32;

    loop {
        let state = source.job_state(job_id).await?;
        polls += 1;
        debug!("Job {} is {} (poll {})", job_id, state, polls);

        if check_complete(job_id, state)? {
            return Ok(());
        }

        tokio::time::sleep(interval).await;

        let waited = start.elapsed();
        if waited > max_wait {
            return Err(PlatformError::JobTimeout {
                job_id: job_id.to_string(),
                waited,
            });
        }
    }
}
