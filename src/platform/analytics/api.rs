//! Analytics API operations
//!
//! Paths are routed through the application namespace when the client holds
//! an application token.

use log::debug;
use reqwest::multipart::Form;
use serde_json::Value;
use std::path::Path;

use crate::config::api;
use crate::error::{PlatformError, Result};
use crate::platform::batch::{BatchAction, BatchResponse};
use crate::platform::client::{segment, take_typed};
use crate::platform::query::AnalyticsQuery;
use crate::platform::transfer::file_part;
use crate::platform::PlatformClient;

use super::models::{Analytic, ImageType};

#[derive(serde::Serialize)]
struct ListAnalyticsBody {
    all_versions: bool,
}

impl PlatformClient {
    fn analytics_path(&self, suffix: &str) -> String {
        let path = if suffix.is_empty() {
            api::ANALYTICS.to_string()
        } else {
            format!("{}/{}", api::ANALYTICS, suffix)
        };
        self.endpoint(&self.scoped(&path))
    }

    /// List available analytics, optionally including every version
    pub async fn list_analytics(&self, all_versions: bool) -> Result<Vec<Analytic>> {
        let url = self.analytics_path("list");
        let value = self
            .send_json(self.get(&url).json(&ListAnalyticsBody { all_versions }))
            .await?;
        let analytics: Vec<Analytic> = take_typed(value, "analytics")?;
        debug!("Fetched {} analytics", analytics.len());
        Ok(analytics)
    }

    /// Run an analytics query, returning the full response envelope
    pub async fn query_analytics(&self, query: &AnalyticsQuery) -> Result<Value> {
        let url = self.analytics_path("");
        self.send_json(self.get(&url).query(&query.to_params()))
            .await
    }

    /// Analytic metadata record (application tokens)
    pub async fn get_analytic_details(&self, analytic_id: &str) -> Result<Analytic> {
        if !self.is_application() {
            return Err(PlatformError::Config(
                "Analytic details are only available to application tokens; use get_analytic_doc"
                    .to_string(),
            ));
        }
        let value = self
            .send_json(self.get(&self.analytics_path(&segment(analytic_id))))
            .await?;
        take_typed(value, "analytic")
    }

    /// Documentation JSON of an analytic
    pub async fn get_analytic_doc(&self, analytic_id: &str) -> Result<Value> {
        let suffix = if self.is_application() {
            format!("{}/doc", segment(analytic_id))
        } else {
            segment(analytic_id)
        };
        self.send_json(self.get(&self.analytics_path(&suffix)))
            .await
    }

    /// Upload the documentation file describing a new analytic
    pub async fn upload_analytic(
        &self,
        doc_path: &Path,
        analytic_type: Option<&str>,
    ) -> Result<Analytic> {
        let url = self.analytics_path("");
        let mut form = Form::new().part("file", file_part(doc_path).await?);
        if let Some(analytic_type) = analytic_type {
            form = form.text("analytic_type", analytic_type.to_string());
        }
        let value = self.send_json(self.post(&url).multipart(form)).await?;
        take_typed(value, "analytic")
    }

    /// Upload a Docker image tarball for an analytic, streaming it from disk
    pub async fn upload_analytic_image(
        &self,
        analytic_id: &str,
        image_path: &Path,
        image_type: ImageType,
    ) -> Result<()> {
        let url = self.analytics_path(&format!("{}/images", segment(analytic_id)));
        let form = Form::new().part("file", file_part(image_path).await?);
        self.send_empty(
            self.post(&url)
                .query(&[("type", image_type.as_str())])
                .multipart(form),
        )
        .await
    }

    /// Delete an analytic you own
    pub async fn delete_analytic(&self, analytic_id: &str) -> Result<()> {
        self.send_empty(self.delete(&self.analytics_path(&segment(analytic_id))))
            .await
    }

    pub async fn batch_delete_analytics<S: AsRef<str>>(&self, ids: &[S]) -> Result<BatchResponse> {
        self.batch_request(&self.scoped(api::ANALYTICS), BatchAction::Delete, ids)
            .await
    }
}
