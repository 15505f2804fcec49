//! Jobs output formatter

use comfy_table::{presets::NOTHING, Table};

use super::common::{cell, flag, output_key_values, print_json, truncate_name};
use crate::cli::OutputFormat;
use crate::platform::jobs::Job;

/// Output a jobs listing
pub fn output_jobs(jobs: &[Job], format: OutputFormat, no_header: bool, show_count: bool) {
    match format {
        OutputFormat::Json => print_json(jobs),
        OutputFormat::Table => {
            let mut table = Table::new();
            table.load_preset(NOTHING);
            if !no_header {
                table.set_header(vec![
                    "id",
                    "name",
                    "state",
                    "archived",
                    "upload date",
                    "expiration date",
                ]);
            }
            for job in jobs {
                table.add_row(vec![
                    job.id.clone(),
                    truncate_name(&job.name),
                    job.state_str().to_string(),
                    flag(job.archived),
                    cell(job.upload_date.as_deref()),
                    cell(job.expiration_date.as_deref()),
                ]);
            }
            println!("{table}");
        }
    }
    if show_count {
        println!("Found {} jobs", jobs.len());
    }
}

/// Output job records, one key/value block per job
pub fn output_job_details(jobs: &[Job], format: OutputFormat) {
    if format == OutputFormat::Json {
        print_json(jobs);
        return;
    }
    for (i, job) in jobs.iter().enumerate() {
        if i > 0 {
            println!();
        }
        output_key_values(&[
            ("id", job.id.clone()),
            ("name", job.name.clone()),
            ("state", job.state_str().to_string()),
            ("archived", flag(job.archived)),
            ("analytic id", cell(job.analytic_id.as_deref())),
            (
                "compute mode",
                job.compute_mode.map(|m| m.to_string()).unwrap_or_default(),
            ),
            (
                "failure type",
                job.failure_type.map(|t| t.to_string()).unwrap_or_default(),
            ),
            ("upload date", cell(job.upload_date.as_deref())),
            ("expiration date", cell(job.expiration_date.as_deref())),
        ]);
    }
}
