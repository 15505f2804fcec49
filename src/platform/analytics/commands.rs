//! Analytics command handlers

use log::debug;

use crate::cli::{AnalyticsAction, AnalyticsListArgs, Cli, Command};
use crate::output::{output_analytics, output_batch_results, output_key_values, print_json};
use crate::platform::batch::BatchAction;
use crate::platform::client::take_typed;
use crate::platform::helpers::ensure_all_succeeded;
use crate::platform::query::{AnalyticsQuery, AnalyticsResource};
use crate::platform::PlatformClient;
use crate::ui::{confirm_action, create_spinner, finish_spinner};

use super::models::{Analytic, ImageType};

/// Run the analytics command
pub async fn run_analytics_command(
    client: &PlatformClient,
    cli: &Cli,
) -> Result<(), Box<dyn std::error::Error>> {
    let Command::Analytics { action } = &cli.command else {
        unreachable!()
    };

    match action {
        AnalyticsAction::List(args) => {
            let query = analytics_list_query(args);
            debug!("Analytics query: {}", query.to_query_string());

            let spinner = create_spinner("Fetching analytics...", cli.batch);
            let response = client.query_analytics(&query).await;
            finish_spinner(spinner);

            let analytics: Vec<Analytic> = take_typed(response?, "analytics")?;
            output_analytics(
                &analytics,
                args.list.output,
                cli.no_header,
                args.list.count && !cli.no_header,
            );
        }
        AnalyticsAction::Docs { id } => {
            print_json(&client.get_analytic_doc(id).await?);
        }
        AnalyticsAction::UploadDocs {
            path,
            analytic_type,
        } => {
            let analytic = client
                .upload_analytic(path, analytic_type.as_deref())
                .await?;
            output_key_values(&[
                ("id", analytic.id.clone()),
                ("name", analytic.name.clone()),
                ("version", analytic.version.clone().unwrap_or_default()),
                ("pending", analytic.is_pending().to_string()),
            ]);
        }
        AnalyticsAction::UploadImage {
            id,
            image_path,
            image_type,
        } => {
            let spinner = create_spinner(
                &format!("Uploading {} image for analytic '{}'...", image_type, id),
                cli.batch,
            );
            let result = client
                .upload_analytic_image(id, image_path, *image_type)
                .await;
            finish_spinner(spinner);

            result?;
            println!("✓ {} image for analytic '{}' uploaded", image_label(*image_type), id);
        }
        AnalyticsAction::Delete { ids, yes } => {
            let prompt = format!("Delete {} analytic(s): {}?", ids.len(), ids.join(", "));
            if !confirm_action(&prompt, *yes || cli.batch)? {
                println!("Cancelled");
                return Ok(());
            }

            if let [id] = ids.as_slice() {
                client.delete_analytic(id).await?;
                println!("✓ Analytic '{}' deleted", id);
            } else {
                let response = client.batch_delete_analytics(ids).await?;
                let failures = output_batch_results(ids, &response, BatchAction::Delete, "Analytic");
                ensure_all_succeeded(failures, ids.len())?;
            }
        }
    }

    Ok(())
}

fn analytics_list_query(args: &AnalyticsListArgs) -> AnalyticsQuery {
    args.list
        .to_query::<AnalyticsResource>()
        .set_all_versions(args.all_versions)
}

fn image_label(image_type: ImageType) -> &'static str {
    match image_type {
        ImageType::Cpu => "CPU",
        ImageType::Gpu => "GPU",
    }
}
