//! Data output formatter

use comfy_table::{presets::NOTHING, Table};

use super::common::{cell, output_key_values, print_json, truncate_name};
use crate::cli::OutputFormat;
use crate::platform::data::Data;

/// Output a data listing
pub fn output_data(data: &[Data], format: OutputFormat, no_header: bool, show_count: bool) {
    match format {
        OutputFormat::Json => print_json(data),
        OutputFormat::Table => output_table(data, no_header),
    }
    if show_count {
        println!("Found {} data", data.len());
    }
}

/// Output full data records, one key/value block per item
pub fn output_data_details(records: &[Data], format: OutputFormat) {
    if format == OutputFormat::Json {
        print_json(records);
        return;
    }
    for (i, data) in records.iter().enumerate() {
        if i > 0 {
            println!();
        }
        output_key_values(&[
            ("id", data.id.clone()),
            ("name", data.name.clone()),
            ("filename", cell(data.filename.as_deref())),
            ("encoding", cell(data.encoding.as_deref())),
            ("type", cell(data.mime_type.as_deref())),
            ("size", data.size.map(|s| s.to_string()).unwrap_or_default()),
            ("upload date", cell(data.upload_date.as_deref())),
            ("expiration date", cell(data.expiration_date.as_deref())),
        ]);
    }
}

fn output_table(data: &[Data], no_header: bool) {
    let mut table = Table::new();
    table.load_preset(NOTHING);
    if !no_header {
        table.set_header(vec![
            "id",
            "name",
            "size",
            "type",
            "upload date",
            "expiration date",
        ]);
    }

    for item in data {
        table.add_row(vec![
            item.id.clone(),
            truncate_name(&item.name),
            item.size.map(|s| s.to_string()).unwrap_or_default(),
            cell(item.mime_type.as_deref()),
            cell(item.upload_date.as_deref()),
            cell(item.expiration_date.as_deref()),
        ]);
    }

    println!("{table}");
}
