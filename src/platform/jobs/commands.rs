//! Jobs command handlers

use log::debug;
use std::time::Duration;

use crate::cli::{Cli, Command, JobsAction, JobsListArgs, JobsUploadArgs};
use crate::config::defaults;
use crate::error::Result;
use crate::output::{
    output_batch_results, output_item_results, output_job_details, output_jobs, print_json,
};
use crate::platform::batch::{BatchAction, BatchResponse};
use crate::platform::client::take_typed;
use crate::platform::helpers::{ensure_all_succeeded, map_concurrent};
use crate::platform::query::JobsQuery;
use crate::platform::serializable::Serializable;
use crate::platform::PlatformClient;
use crate::ui::{confirm_action, create_spinner, finish_spinner};

use super::models::{Job, JobRequest};

/// Run the jobs command
pub async fn run_jobs_command(
    client: &PlatformClient,
    cli: &Cli,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let Command::Jobs { action } = &cli.command else {
        unreachable!()
    };

    match action {
        JobsAction::List(args) => {
            let query = jobs_list_query(args)?;
            debug!("Jobs query: {}", query.to_query_string());

            let spinner = create_spinner("Fetching jobs...", cli.batch);
            let response = client.query_jobs(&query).await;
            finish_spinner(spinner);

            let jobs: Vec<Job> = take_typed(response?, "jobs")?;
            output_jobs(
                &jobs,
                args.list.output,
                cli.no_header,
                args.list.count && !cli.no_header,
            );
        }
        JobsAction::Info { ids, output } => {
            let results = map_concurrent(ids.iter(), defaults::MAX_WORKERS, |id| {
                client.get_job_details(id)
            })
            .await;

            let mut jobs = Vec::new();
            let mut failures = 0;
            for (id, result) in ids.iter().zip(results) {
                match result {
                    Ok(job) => jobs.push(job),
                    Err(e) => {
                        eprintln!("✗ Job '{}': {}", id, e);
                        failures += 1;
                    }
                }
            }
            output_job_details(&jobs, *output);
            ensure_all_succeeded(failures, ids.len())?;
        }
        JobsAction::Upload(args) => {
            let job = upload_request(client, args).await?;
            println!("✓ Uploaded job request as job '{}' ({})", job.id, job.name);
            if args.auto_start {
                println!("  Job will start automatically");
            }
        }
        JobsAction::Start { ids } => {
            run_state_action(client, ids, BatchAction::Start).await?;
        }
        JobsAction::Archive { ids } => {
            run_state_action(client, ids, BatchAction::Archive).await?;
        }
        JobsAction::Unarchive { ids } => {
            run_state_action(client, ids, BatchAction::Unarchive).await?;
        }
        JobsAction::Kill { ids, yes } => {
            let prompt = format!("Force kill {} job(s): {}?", ids.len(), ids.join(", "));
            if !confirm_action(&prompt, *yes || cli.batch)? {
                println!("Cancelled");
                return Ok(());
            }
            run_state_action(client, ids, BatchAction::Kill).await?;
        }
        JobsAction::Delete { ids, yes } => {
            let prompt = format!("Delete {} job(s): {}?", ids.len(), ids.join(", "));
            if !confirm_action(&prompt, *yes || cli.batch)? {
                println!("Cancelled");
                return Ok(());
            }
            run_state_action(client, ids, BatchAction::Delete).await?;
        }
        JobsAction::Ttl { ids, days } => {
            let failures = match u32::try_from(*days) {
                Ok(days) if ids.len() > 1 => {
                    let response = client.batch_update_jobs_ttl(ids, days).await?;
                    output_batch_results(ids, &response, BatchAction::Ttl { days }, "Job")
                }
                _ => {
                    let results = map_concurrent(ids.iter(), defaults::MAX_WORKERS, |id| {
                        client.update_job_ttl(id, *days)
                    })
                    .await;
                    output_item_results(ids, &results, "Job", "updated")
                }
            };
            ensure_all_succeeded(failures, ids.len())?;
        }
        JobsAction::Request { id } => {
            let request = client.get_job_request(id).await?;
            println!("{}", request);
        }
        JobsAction::Status { id } => {
            print_json(&client.get_job_status(id).await?);
        }
        JobsAction::Log { id, path } => match path {
            Some(path) => {
                client.download_job_logfile(id, path).await?;
                println!("✓ Logfile of job '{}' written to {}", id, path.display());
            }
            None => print!("{}", client.get_job_logfile(id).await?),
        },
        JobsAction::LogUrl { id } => {
            println!("{}", client.get_job_logfile_download_url(id).await?);
        }
        JobsAction::Download { id, path } => {
            let spinner = create_spinner(&format!("Downloading output of job '{}'...", id), cli.batch);
            let result = client.download_job_output(id, path).await;
            finish_spinner(spinner);

            result?;
            println!("✓ Output of job '{}' written to {}", id, path.display());
        }
        JobsAction::DownloadUrl { id } => {
            println!("{}", client.get_job_output_download_url(id).await?);
        }
        JobsAction::Wait(args) => {
            let spinner = create_spinner(&format!("Waiting for job '{}'...", args.id), cli.batch);
            let result = client
                .wait_until_job_completes(
                    &args.id,
                    Duration::from_secs(args.interval),
                    Duration::from_secs(args.max_wait),
                )
                .await;
            finish_spinner(spinner);

            result?;
            println!("✓ Job '{}' complete", args.id);
        }
    }

    Ok(())
}

/// Build the jobs listing query
///
/// Archived jobs are hidden unless a search predicate targets `archived`.
fn jobs_list_query(args: &JobsListArgs) -> Result<JobsQuery> {
    let mut query: JobsQuery = args.list.to_query();
    if !args.states.is_empty() {
        query = query.add_search_or("state", args.states.iter().map(|s| s.as_str()))?;
    }
    if !args.list.search.iter().any(|s| s.starts_with("archived:")) {
        query = query.add_search("archived", "false")?;
    }
    Ok(query)
}

async fn upload_request(client: &PlatformClient, args: &JobsUploadArgs) -> Result<Job> {
    let request = JobRequest::from_json(&args.request)?;
    debug!(
        "Uploading request for analytic '{}' as job '{}'",
        request.analytic(),
        args.name
    );
    client
        .upload_job_request(&request, &args.name, args.auto_start, args.ttl)
        .await
}

/// Apply a state action to one job directly, or to several through the batch endpoint
async fn run_state_action(
    client: &PlatformClient,
    ids: &[String],
    action: BatchAction,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    if let [id] = ids {
        match action {
            BatchAction::Start => client.start_job(id).await?,
            BatchAction::Archive => client.archive_job(id).await?,
            BatchAction::Unarchive => client.unarchive_job(id).await?,
            BatchAction::Kill => client.kill_job(id).await?,
            BatchAction::Delete => client.delete_job(id).await?,
            BatchAction::Ttl { days } => client.update_job_ttl(id, i64::from(days)).await?,
        }
        println!("✓ Job '{}' {}", id, action.past_tense());
        return Ok(());
    }

    let response: BatchResponse = match action {
        BatchAction::Start => client.batch_start_jobs(ids).await?,
        BatchAction::Archive => client.batch_archive_jobs(ids).await?,
        BatchAction::Unarchive => client.batch_unarchive_jobs(ids).await?,
        BatchAction::Kill => client.batch_kill_jobs(ids).await?,
        BatchAction::Delete => client.batch_delete_jobs(ids).await?,
        BatchAction::Ttl { days } => client.batch_update_jobs_ttl(ids, days).await?,
    };
    let failures = output_batch_results(ids, &response, action, "Job");
    ensure_all_succeeded(failures, ids.len())
}
