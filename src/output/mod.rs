//! Output formatting
//!
//! Records print as borderless tables by default or as pretty JSON.

mod analytics;
mod common;
mod data;
mod jobs;

pub use analytics::output_analytics;
pub use common::{
    output_batch_results, output_item_results, output_key_values, output_users, print_json,
    truncate_name,
};
pub use data::{output_data, output_data_details};
pub use jobs::{output_job_details, output_jobs};
