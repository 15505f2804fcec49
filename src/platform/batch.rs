//! Batch actions over many resource ids in one request
//!
//! The server answers with one record per id. Per-id failures are data, not
//! errors: only a failure of the whole request is returned as `Err`.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::api;
use crate::error::Result;
use crate::platform::client::take_typed;
use crate::platform::PlatformClient;

/// Action applied to every id of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchAction {
    Delete,
    Start,
    Archive,
    Unarchive,
    Kill,
    Ttl { days: u32 },
}

impl BatchAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchAction::Delete => "delete",
            BatchAction::Start => "start",
            BatchAction::Archive => "archive",
            BatchAction::Unarchive => "unarchive",
            BatchAction::Kill => "kill",
            BatchAction::Ttl { .. } => "ttl",
        }
    }

    /// Past-tense verb for user-facing messages
    pub fn past_tense(&self) -> &'static str {
        match self {
            BatchAction::Delete => "deleted",
            BatchAction::Start => "started",
            BatchAction::Archive => "archived",
            BatchAction::Unarchive => "unarchived",
            BatchAction::Kill => "killed",
            BatchAction::Ttl { .. } => "updated",
        }
    }
}

#[derive(Serialize, Debug)]
struct BatchRequest<'a> {
    action: &'static str,
    ids: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    days: Option<u32>,
}

/// Outcome for a single id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItemResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Outcomes keyed by id
pub type BatchResponse = BTreeMap<String, BatchItemResult>;

/// Split the requested `ids` into succeeded ids and failed `(id, message)` pairs
///
/// An id the server did not answer counts as failed.
pub fn partition_batch<'a, S: AsRef<str>>(
    ids: &'a [S],
    response: &'a BatchResponse,
) -> (Vec<&'a str>, Vec<(&'a str, &'a str)>) {
    let mut succeeded = Vec::new();
    let mut failed = Vec::new();
    for id in ids.iter().map(AsRef::as_ref) {
        match response.get(id) {
            Some(result) if result.success => succeeded.push(id),
            Some(result) => {
                failed.push((id, result.message.as_deref().unwrap_or("unknown error")))
            }
            None => failed.push((id, "no response for id")),
        }
    }
    (succeeded, failed)
}

impl PlatformClient {
    /// POST `{resource}/batch` for `ids`
    pub(crate) async fn batch_request<S: AsRef<str>>(
        &self,
        resource: &str,
        action: BatchAction,
        ids: &[S],
    ) -> Result<BatchResponse> {
        let url = self.endpoint(&format!("{}/{}", resource, api::BATCH));
        let body = BatchRequest {
            action: action.as_str(),
            ids: ids.iter().map(AsRef::as_ref).collect(),
            days: match action {
                BatchAction::Ttl { days } => Some(days),
                _ => None,
            },
        };
        debug!(
            "Batch '{}' on {} {} id(s)",
            body.action,
            body.ids.len(),
            resource
        );

        let value = self.send_json(self.post(&url).json(&body)).await?;
        take_typed(value, "responses")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlatformError;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_partition_batch() {
        let mut response = BatchResponse::new();
        response.insert(
            "a".to_string(),
            BatchItemResult {
                success: true,
                message: None,
            },
        );
        response.insert(
            "b".to_string(),
            BatchItemResult {
                success: false,
                message: Some("not found".to_string()),
            },
        );
        let (ok, failed) = partition_batch(&["a", "b"], &response);
        assert_eq!(ok, vec!["a"]);
        assert_eq!(failed, vec![("b", "not found")]);
    }

    #[test]
    fn test_partition_batch_counts_unanswered_ids_as_failed() {
        let mut response = BatchResponse::new();
        response.insert(
            "j1".to_string(),
            BatchItemResult {
                success: true,
                message: None,
            },
        );
        let ids = vec!["j1".to_string(), "j2".to_string(), "j3".to_string()];
        let (ok, failed) = partition_batch(&ids, &response);
        assert_eq!(ok, vec!["j1"]);
        assert_eq!(
            failed,
            vec![("j2", "no response for id"), ("j3", "no response for id")]
        );
    }

    #[tokio::test]
    async fn test_partial_failure_does_not_raise() {
        let mock_server = MockServer::start().await;
        let client = PlatformClient::test_client(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/jobs/batch"))
            .and(body_json(serde_json::json!({
                "action": "archive",
                "ids": ["a", "b", "c"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "responses": {
                    "a": {"success": true},
                    "b": {"success": false, "message": "Job 'b' not found"},
                    "c": {"success": true}
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let response = client
            .batch_request("jobs", BatchAction::Archive, &["a", "b", "c"])
            .await
            .unwrap();

        assert!(response["a"].success);
        assert!(response["c"].success);
        assert!(!response["b"].success);
        assert_eq!(response["b"].message.as_deref(), Some("Job 'b' not found"));
    }

    #[tokio::test]
    async fn test_ttl_action_sends_days() {
        let mock_server = MockServer::start().await;
        let client = PlatformClient::test_client(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/data/batch"))
            .and(body_json(serde_json::json!({
                "action": "ttl",
                "ids": ["d1"],
                "days": 7
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "responses": {"d1": {"success": true}}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let response = client
            .batch_request("data", BatchAction::Ttl { days: 7 }, &["d1".to_string()])
            .await
            .unwrap();
        assert_eq!(response.len(), 1);
    }

    #[tokio::test]
    async fn test_whole_batch_failure_raises() {
        let mock_server = MockServer::start().await;
        let client = PlatformClient::test_client(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/data/batch"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": {"message": "Batch failed"}
            })))
            .mount(&mock_server)
            .await;

        let err = client
            .batch_request("data", BatchAction::Delete, &["d1"])
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::Api { status: 500, .. }));
    }
}
