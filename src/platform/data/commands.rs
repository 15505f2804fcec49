//! Data command handlers

use log::debug;

use crate::cli::{Cli, Command, DataAction, PostUrlArgs};
use crate::config::defaults;
use crate::output::{
    output_batch_results, output_data, output_data_details, output_item_results,
};
use crate::platform::batch::BatchAction;
use crate::platform::client::take_typed;
use crate::platform::helpers::{ensure_all_succeeded, format_ttl, map_concurrent};
use crate::platform::query::DataQuery;
use crate::platform::PlatformClient;
use crate::ui::{confirm_action, create_spinner, finish_spinner};

use super::models::{Data, PostDataUrl};

/// Run the data command
pub async fn run_data_command(
    client: &PlatformClient,
    cli: &Cli,
) -> Result<(), Box<dyn std::error::Error>> {
    let Command::Data { action } = &cli.command else {
        unreachable!()
    };

    match action {
        DataAction::List(args) => {
            let query: DataQuery = args.to_query();
            debug!("Data query: {}", query.to_query_string());

            let spinner = create_spinner("Fetching data...", cli.batch);
            let response = client.query_data(&query).await;
            finish_spinner(spinner);

            let data: Vec<Data> = take_typed(response?, "data")?;
            output_data(&data, args.output, cli.no_header, args.count && !cli.no_header);
        }
        DataAction::Info { ids, output } => {
            let spinner = create_spinner(&format!("Fetching {} data record(s)...", ids.len()), cli.batch);
            let results = map_concurrent(ids.iter(), defaults::MAX_WORKERS, |id| {
                client.get_data_details(id)
            })
            .await;
            finish_spinner(spinner);

            let mut records = Vec::new();
            let mut failures = 0;
            for (id, result) in ids.iter().zip(results) {
                match result {
                    Ok(data) => records.push(data),
                    Err(e) => {
                        eprintln!("✗ Data '{}': {}", id, e);
                        failures += 1;
                    }
                }
            }
            output_data_details(&records, *output);
            ensure_all_succeeded(failures, ids.len())?;
        }
        DataAction::Upload { paths, ttl } => {
            let spinner = create_spinner(&format!("Uploading {} file(s)...", paths.len()), cli.batch);
            let results = map_concurrent(paths.iter(), defaults::MAX_WORKERS, |path| {
                client.upload_data(path, *ttl)
            })
            .await;
            finish_spinner(spinner);

            let mut failures = 0;
            for (path, result) in paths.iter().zip(results) {
                match result {
                    Ok(data) => println!("✓ Uploaded '{}' as data '{}'", path.display(), data.id),
                    Err(e) => {
                        eprintln!("✗ Failed to upload '{}': {}", path.display(), e);
                        failures += 1;
                    }
                }
            }
            ensure_all_succeeded(failures, paths.len())?;
        }
        DataAction::PostUrl(args) => {
            let data = client.post_data_as_url(&post_url_request(args)).await?;
            println!("✓ Registered '{}' as data '{}'", args.filename, data.id);
        }
        DataAction::Download { id, path } => {
            let spinner = create_spinner(&format!("Downloading data '{}'...", id), cli.batch);
            let result = client.download_data(id, path.as_deref()).await;
            finish_spinner(spinner);

            let written = result?;
            println!("✓ Downloaded data '{}' to {}", id, written.display());
        }
        DataAction::DownloadUrl { id } => {
            println!("{}", client.get_data_download_url(id).await?);
        }
        DataAction::Ttl { ids, days } => {
            let failures = match u32::try_from(*days) {
                Ok(days) if ids.len() > 1 => {
                    let action = BatchAction::Ttl { days };
                    let response = client.batch_update_data_ttl(ids, days).await?;
                    output_batch_results(ids, &response, action, "Data")
                }
                _ => {
                    let results = map_concurrent(ids.iter(), defaults::MAX_WORKERS, |id| {
                        client.update_data_ttl(id, *days)
                    })
                    .await;
                    output_item_results(ids, &results, "Data", "updated")
                }
            };
            ensure_all_succeeded(failures, ids.len())?;
        }
        DataAction::Delete { ids, yes } => {
            let prompt = format!("Delete {} data item(s): {}?", ids.len(), ids.join(", "));
            if !confirm_action(&prompt, *yes || cli.batch)? {
                println!("Cancelled");
                return Ok(());
            }

            if let [id] = ids.as_slice() {
                client.delete_data(id).await?;
                println!("✓ Data '{}' deleted", id);
            } else {
                let response = client.batch_delete_data(ids).await?;
                let failures = output_batch_results(ids, &response, BatchAction::Delete, "Data");
                ensure_all_succeeded(failures, ids.len())?;
            }
        }
    }

    Ok(())
}

fn post_url_request(args: &PostUrlArgs) -> PostDataUrl {
    PostDataUrl {
        signed_url: args.url.clone(),
        filename: args.filename.clone(),
        mimetype: args.mime_type.clone(),
        size: args.size,
        encoding: args.encoding.clone(),
        data_ttl: args.ttl.as_ref().map(format_ttl),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_post_url_request_formats_ttl() {
        let cli = Cli::parse_from([
            "voxctl",
            "data",
            "post-url",
            "https://bucket/video.mp4?sig=1",
            "--filename",
            "video.mp4",
            "--mime-type",
            "video/mp4",
            "--size",
            "2048",
            "--ttl",
            "2030-01-02",
        ]);
        let Command::Data {
            action: DataAction::PostUrl(args),
        } = &cli.command
        else {
            panic!("expected data post-url");
        };

        let request = post_url_request(args);
        assert_eq!(request.signed_url, "https://bucket/video.mp4?sig=1");
        assert_eq!(request.mimetype, "video/mp4");
        assert_eq!(request.size, 2048);
        assert!(request.encoding.is_none());
        assert_eq!(request.data_ttl.as_deref(), Some("2030-01-02T00:00:00.000Z"));
    }
}
