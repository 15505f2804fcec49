//! Helpers shared by the resource formatters

use comfy_table::{presets::NOTHING, Table};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::config::defaults;
use crate::error::Result;
use crate::platform::batch::{partition_batch, BatchAction, BatchResponse};

/// Shorten `name` to fit a table column, marking the cut with " ..."
pub fn truncate_name(name: &str) -> String {
    if name.chars().count() <= defaults::MAX_NAME_WIDTH {
        return name.to_string();
    }
    let keep = defaults::MAX_NAME_WIDTH - 4;
    format!("{} ...", name.chars().take(keep).collect::<String>())
}

/// Pretty-print any serializable value as JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: failed to serialize JSON: {}", e),
    }
}

/// Print a two-column key/value table
pub fn output_key_values(rows: &[(&str, String)]) {
    let mut table = Table::new();
    table.load_preset(NOTHING);
    for (key, value) in rows {
        table.add_row(vec![key.to_string(), value.clone()]);
    }
    println!("{table}");
}

/// Print one line per requested id of a batch and return the number of failures
pub fn output_batch_results(
    ids: &[String],
    response: &BatchResponse,
    action: BatchAction,
    noun: &str,
) -> usize {
    let (succeeded, failed) = partition_batch(ids, response);
    for id in &succeeded {
        println!("✓ {} '{}' {}", noun, id, action.past_tense());
    }
    for (id, message) in &failed {
        eprintln!("✗ {} '{}' not {}: {}", noun, id, action.past_tense(), message);
    }
    failed.len()
}

/// Print one line per id of individually issued requests and return the number of failures
pub fn output_item_results<T>(ids: &[String], results: &[Result<T>], noun: &str, past: &str) -> usize {
    let mut failures = 0;
    for (id, result) in ids.iter().zip(results) {
        match result {
            Ok(_) => println!("✓ {} '{}' {}", noun, id, past),
            Err(e) => {
                eprintln!("✗ {} '{}' not {}: {}", noun, id, past, e);
                failures += 1;
            }
        }
    }
    failures
}

/// Print application usernames
pub fn output_users(users: &[String], format: OutputFormat, no_header: bool) {
    match format {
        OutputFormat::Json => print_json(users),
        OutputFormat::Table => {
            let mut table = Table::new();
            table.load_preset(NOTHING);
            if !no_header {
                table.set_header(vec!["username"]);
            }
            for user in users {
                table.add_row(vec![user]);
            }
            println!("{table}");
            if !no_header {
                println!("\nFound {} user(s)", users.len());
            }
        }
    }
}

/// Render an optional string cell
pub(crate) fn cell(value: Option<&str>) -> String {
    value.unwrap_or("").to_string()
}

/// Render an optional flag cell
pub(crate) fn flag(value: Option<bool>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
