//! Platform status command handler

use serde_json::Value;

use crate::cli::{Cli, Command, OutputFormat};
use crate::output::{output_key_values, print_json};
use crate::platform::PlatformClient;

/// Run the status command
pub async fn run_status_command(
    client: &PlatformClient,
    cli: &Cli,
) -> Result<(), Box<dyn std::error::Error>> {
    let Command::Status { output } = &cli.command else {
        unreachable!()
    };

    let statuses = client.get_platform_status().await?;
    match output {
        OutputFormat::Json => print_json(&statuses),
        OutputFormat::Table => {
            let rows = status_rows(&statuses);
            let rows: Vec<(&str, String)> =
                rows.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();
            output_key_values(&rows);
        }
    }

    Ok(())
}

/// One row per service; nested values are shown as compact JSON
fn status_rows(statuses: &Value) -> Vec<(String, String)> {
    match statuses {
        Value::Object(map) => map
            .iter()
            .map(|(service, status)| {
                let status = match status {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (service.clone(), status)
            })
            .collect(),
        other => vec![("status".to_string(), other.to_string())],
    }
}
