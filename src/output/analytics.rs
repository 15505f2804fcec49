//! Analytics output formatter

use comfy_table::{presets::NOTHING, Table};

use super::common::{cell, print_json, truncate_name};
use crate::cli::OutputFormat;
use crate::platform::analytics::Analytic;

/// Output an analytics listing
pub fn output_analytics(
    analytics: &[Analytic],
    format: OutputFormat,
    no_header: bool,
    show_count: bool,
) {
    match format {
        OutputFormat::Json => print_json(analytics),
        OutputFormat::Table => {
            let mut table = Table::new();
            table.load_preset(NOTHING);
            if !no_header {
                table.set_header(vec![
                    "id",
                    "name",
                    "version",
                    "type",
                    "supports cpu",
                    "supports gpu",
                    "pending",
                    "upload date",
                ]);
            }
            for analytic in analytics {
                table.add_row(vec![
                    analytic.id.clone(),
                    truncate_name(&analytic.name),
                    cell(analytic.version.as_deref()),
                    cell(analytic.scope.as_deref()),
                    analytic.supports_cpu().to_string(),
                    analytic.supports_gpu().to_string(),
                    analytic.is_pending().to_string(),
                    cell(analytic.upload_date.as_deref()),
                ]);
            }
            println!("{table}");
        }
    }
    if show_count {
        println!("Found {} analytics", analytics.len());
    }
}
