//! Jobs API operations

use chrono::{DateTime, Utc};
use log::debug;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

use crate::config::{api, jobs};
use crate::error::{PlatformError, Result};
use crate::platform::batch::{BatchAction, BatchResponse};
use crate::platform::client::{segment, take_typed, validate_response};
use crate::platform::helpers::format_ttl;
use crate::platform::query::JobsQuery;
use crate::platform::serializable::Serializable;
use crate::platform::PlatformClient;

use super::models::{Job, JobRequest, JobState};
use super::polling::{check_complete, wait_for_completion, JobStateSource};

impl PlatformClient {
    fn job_path(&self, id: &str, action: Option<&str>) -> String {
        match action {
            Some(action) => self.endpoint(&format!("{}/{}/{}", api::JOBS, segment(id), action)),
            None => self.endpoint(&format!("{}/{}", api::JOBS, segment(id))),
        }
    }

    async fn job_action(&self, job_id: &str, action: &str) -> Result<()> {
        self.send_empty(self.put(&self.job_path(job_id, Some(action))))
            .await
    }

    async fn job_url(&self, job_id: &str, action: &str) -> Result<String> {
        let value = self
            .send_json(self.get(&self.job_path(job_id, Some(action))))
            .await?;
        take_typed(value, "url")
    }

    /// List all jobs
    pub async fn list_jobs(&self) -> Result<Vec<Job>> {
        let url = self.endpoint(&format!("{}/list", api::JOBS));
        let value = self.send_json(self.get(&url)).await?;
        let jobs: Vec<Job> = take_typed(value, "jobs")?;
        debug!("Fetched {} jobs", jobs.len());
        Ok(jobs)
    }

    /// Run a jobs query, returning the full response envelope
    pub async fn query_jobs(&self, query: &JobsQuery) -> Result<Value> {
        let url = self.endpoint(api::JOBS);
        self.send_json(self.get(&url).query(&query.to_params()))
            .await
    }

    /// Upload a job request under `job_name`
    ///
    /// With `auto_start` the job is queued immediately. `ttl` sets the
    /// expiration of the job output; the server default applies otherwise.
    pub async fn upload_job_request(
        &self,
        request: &JobRequest,
        job_name: &str,
        auto_start: bool,
        ttl: Option<DateTime<Utc>>,
    ) -> Result<Job> {
        let url = self.endpoint(api::JOBS);
        let request_part = Part::text(request.to_json_string()?)
            .file_name(jobs::REQUEST_FILE_NAME)
            .mime_str(mime::APPLICATION_JSON.as_ref())?;

        let mut form = Form::new()
            .part("file", request_part)
            .text("job_name", job_name.to_string())
            .text("auto_start", if auto_start { "True" } else { "False" });
        if let Some(ttl) = ttl {
            form = form.text("job_ttl", format_ttl(&ttl));
        }

        let value = self.send_json(self.post(&url).multipart(form)).await?;
        take_typed(value, "job")
    }

    pub async fn get_job_details(&self, job_id: &str) -> Result<Job> {
        let value = self
            .send_json(self.get(&self.job_path(job_id, None)))
            .await?;
        take_typed(value, "job")
    }

    /// The request the job was created from
    pub async fn get_job_request(&self, job_id: &str) -> Result<JobRequest> {
        let value = self
            .send_json(self.get(&self.job_path(job_id, Some("request"))))
            .await?;
        JobRequest::from_dict(&value)
    }

    pub async fn start_job(&self, job_id: &str) -> Result<()> {
        self.job_action(job_id, "start").await
    }

    pub async fn archive_job(&self, job_id: &str) -> Result<()> {
        self.job_action(job_id, "archive").await
    }

    pub async fn unarchive_job(&self, job_id: &str) -> Result<()> {
        self.job_action(job_id, "unarchive").await
    }

    /// Force-kill a queued or scheduled job
    pub async fn kill_job(&self, job_id: &str) -> Result<()> {
        self.job_action(job_id, "kill").await
    }

    /// Extend or shorten the job's expiration by `days`
    ///
    /// A job whose new expiration is in the past is deleted.
    pub async fn update_job_ttl(&self, job_id: &str, days: i64) -> Result<()> {
        let url = self.job_path(job_id, Some("ttl"));
        self.send_empty(self.put(&url).form(&[("days", days.to_string())]))
            .await
    }

    pub async fn get_job_state(&self, job_id: &str) -> Result<JobState> {
        self.get_job_details(job_id)
            .await?
            .state
            .ok_or_else(|| PlatformError::Json(format!("Job '{}' has no state", job_id)))
    }

    /// Whether the job is complete; a failed job is an error
    pub async fn is_job_complete(&self, job_id: &str) -> Result<bool> {
        check_complete(job_id, self.get_job_state(job_id).await?)
    }

    /// Poll until the job completes, fails or exceeds `max_wait`
    pub async fn wait_until_job_completes(
        &self,
        job_id: &str,
        interval: Duration,
        max_wait: Duration,
    ) -> Result<()> {
        wait_for_completion(self, job_id, interval, max_wait).await
    }

    /// Detailed status document of a job
    pub async fn get_job_status(&self, job_id: &str) -> Result<Value> {
        self.send_json(self.get(&self.job_path(job_id, Some("status"))))
            .await
    }

    pub async fn download_job_output(&self, job_id: &str, output: &Path) -> Result<()> {
        self.stream_download(&self.job_path(job_id, Some("output")), output)
            .await
    }

    pub async fn get_job_output_download_url(&self, job_id: &str) -> Result<String> {
        self.job_url(job_id, "output-url").await
    }

    /// Download the job logfile (private analytics only)
    pub async fn download_job_logfile(&self, job_id: &str, output: &Path) -> Result<()> {
        self.stream_download(&self.job_path(job_id, Some("log")), output)
            .await
    }

    /// Logfile contents as text (private analytics only)
    pub async fn get_job_logfile(&self, job_id: &str) -> Result<String> {
        let response =
            validate_response(self.get(&self.job_path(job_id, Some("log"))).send().await?).await?;
        Ok(response.text().await?)
    }

    pub async fn get_job_logfile_download_url(&self, job_id: &str) -> Result<String> {
        self.job_url(job_id, "log-url").await
    }

    /// Delete a job that has not been started
    pub async fn delete_job(&self, job_id: &str) -> Result<()> {
        self.send_empty(self.delete(&self.job_path(job_id, None)))
            .await
    }

    pub async fn batch_start_jobs<S: AsRef<str>>(&self, ids: &[S]) -> Result<BatchResponse> {
        self.batch_request(api::JOBS, BatchAction::Start, ids).await
    }

    pub async fn batch_archive_jobs<S: AsRef<str>>(&self, ids: &[S]) -> Result<BatchResponse> {
        self.batch_request(api::JOBS, BatchAction::Archive, ids)
            .await
    }

    pub async fn batch_unarchive_jobs<S: AsRef<str>>(&self, ids: &[S]) -> Result<BatchResponse> {
        self.batch_request(api::JOBS, BatchAction::Unarchive, ids)
            .await
    }

    pub async fn batch_kill_jobs<S: AsRef<str>>(&self, ids: &[S]) -> Result<BatchResponse> {
        self.batch_request(api::JOBS, BatchAction::Kill, ids).await
    }

    pub async fn batch_delete_jobs<S: AsRef<str>>(&self, ids: &[S]) -> Result<BatchResponse> {
        self.batch_request(api::JOBS, BatchAction::Delete, ids)
            .await
    }

    pub async fn batch_update_jobs_ttl<S: AsRef<str>>(
        &self,
        ids: &[S],
        days: u32,
    ) -> Result<BatchResponse> {
        self.batch_request(api::JOBS, BatchAction::Ttl { days }, ids)
            .await
    }
}

impl JobStateSource for PlatformClient {
    fn job_state(&self, job_id: &str) -> impl Future<Output = Result<JobState>> + Send {
        self.get_job_state(job_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::jobs::models::{JobComputeMode, JobFailureType, RemoteDataPath};
    use tempfile::TempDir;
    use wiremock::matchers::{body_string, body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn job_json(id: &str, state: &str) -> Value {
        serde_json::json!({
            "id": id,
            "name": "test-job",
            "state": state,
            "archived": false,
            "upload_date": "2019-06-04T15:47:59.190Z"
        })
    }

    #[tokio::test]
    async fn test_list_jobs() {
        let mock_server = MockServer::start().await;
        let client = PlatformClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/jobs/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jobs": [job_json("j1", "READY"), job_json("j2", "RUNNING")]
            })))
            .mount(&mock_server)
            .await;

        let jobs = client.list_jobs().await.unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[1].state, Some(JobState::Running));
    }

    #[tokio::test]
    async fn test_list_jobs_with_unrecognized_failure_type() {
        let mock_server = MockServer::start().await;
        let client = PlatformClient::test_client(&mock_server.uri());

        let mut failed = job_json("j2", "FAILED");
        failed["failure_type"] = serde_json::json!("TIMEOUT");
        Mock::given(method("GET"))
            .and(path("/jobs/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jobs": [job_json("j1", "COMPLETE"), failed]
            })))
            .mount(&mock_server)
            .await;

        let jobs = client.list_jobs().await.unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[1].state, Some(JobState::Failed));
        assert_eq!(jobs[1].failure_type, Some(JobFailureType::Unknown));
    }

    #[tokio::test]
    async fn test_upload_job_request_form_fields() {
        let mock_server = MockServer::start().await;
        let client = PlatformClient::test_client(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/jobs"))
            .and(body_string_contains("filename=\"job.json\""))
            .and(body_string_contains("application/json"))
            .and(body_string_contains("\"analytic\": \"voxel51/vehicle-sense\""))
            .and(body_string_contains("name=\"job_name\""))
            .and(body_string_contains("nightly"))
            .and(body_string_contains("name=\"auto_start\""))
            .and(body_string_contains("True"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "job": job_json("j7", "QUEUED")
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut request = JobRequest::new("voxel51/vehicle-sense")
            .unwrap()
            .with_compute_mode(JobComputeMode::Gpu);
        request.set_input("video", RemoteDataPath::new("d-1").unwrap());

        let job = client
            .upload_job_request(&request, "nightly", true, None)
            .await
            .unwrap();
        assert_eq!(job.id, "j7");
        assert_eq!(job.state, Some(JobState::Queued));
    }

    #[tokio::test]
    async fn test_get_job_request_parses_dto() {
        let mock_server = MockServer::start().await;
        let client = PlatformClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/jobs/j1/request"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "analytic": "voxel51/vehicle-sense",
                "inputs": {"video": {"data-id": "d-1"}},
                "parameters": {"fps": 5, "mask": {"data-id": "d-2"}}
            })))
            .mount(&mock_server)
            .await;

        let request = client.get_job_request("j1").await.unwrap();
        assert_eq!(request.analytic(), "voxel51/vehicle-sense");
        assert_eq!(request.inputs()["video"].data_id(), "d-1");
        assert_eq!(request.parameters().len(), 2);
    }

    #[tokio::test]
    async fn test_job_actions_use_put() {
        let mock_server = MockServer::start().await;
        let client = PlatformClient::test_client(&mock_server.uri());

        for action in ["start", "archive", "unarchive", "kill"] {
            Mock::given(method("PUT"))
                .and(path(format!("/jobs/j1/{}", action)))
                .respond_with(ResponseTemplate::new(200))
                .expect(1)
                .mount(&mock_server)
                .await;
        }

        client.start_job("j1").await.unwrap();
        client.archive_job("j1").await.unwrap();
        client.unarchive_job("j1").await.unwrap();
        client.kill_job("j1").await.unwrap();
    }

    #[tokio::test]
    async fn test_update_job_ttl() {
        let mock_server = MockServer::start().await;
        let client = PlatformClient::test_client(&mock_server.uri());

        Mock::given(method("PUT"))
            .and(path("/jobs/j1/ttl"))
            .and(body_string("days=30"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        client.update_job_ttl("j1", 30).await.unwrap();
    }

    #[tokio::test]
    async fn test_is_job_complete_failed_is_error() {
        let mock_server = MockServer::start().await;
        let client = PlatformClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/jobs/done"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "job": job_json("done", "COMPLETE")
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/jobs/broken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "job": job_json("broken", "FAILED")
            })))
            .mount(&mock_server)
            .await;

        assert!(client.is_job_complete("done").await.unwrap());
        let err = client.is_job_complete("broken").await.unwrap_err();
        assert!(matches!(err, PlatformError::JobFailed { .. }));
    }

    #[tokio::test]
    async fn test_wait_until_job_completes_against_server() {
        let mock_server = MockServer::start().await;
        let client = PlatformClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/jobs/j1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "job": job_json("j1", "RUNNING")
            })))
            .up_to_n_times(2)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/jobs/j1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "job": job_json("j1", "COMPLETE")
            })))
            .mount(&mock_server)
            .await;

        client
            .wait_until_job_completes("j1", Duration::from_millis(5), Duration::from_secs(5))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_output_and_log_downloads() {
        let mock_server = MockServer::start().await;
        let client = PlatformClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/jobs/j1/output"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"frames\": []}"))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/jobs/j1/log"))
            .respond_with(ResponseTemplate::new(200).set_body_string("started\nfinished\n"))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/jobs/j1/log-url"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"url": "https://signed/log"})),
            )
            .mount(&mock_server)
            .await;

        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out/labels.json");
        let log = dir.path().join("job.log");

        client.download_job_output("j1", &output).await.unwrap();
        client.download_job_logfile("j1", &log).await.unwrap();

        assert_eq!(std::fs::read_to_string(&output).unwrap(), "{\"frames\": []}");
        assert!(std::fs::read_to_string(&log).unwrap().contains("finished"));
        assert_eq!(client.get_job_logfile("j1").await.unwrap(), "started\nfinished\n");
        assert_eq!(
            client.get_job_logfile_download_url("j1").await.unwrap(),
            "https://signed/log"
        );
    }

    #[tokio::test]
    async fn test_batch_kill_jobs() {
        let mock_server = MockServer::start().await;
        let client = PlatformClient::test_client(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/jobs/batch"))
            .and(body_string_contains("\"action\":\"kill\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "responses": {
                    "j1": {"success": true},
                    "j2": {"success": false, "message": "Job 'j2' is running"}
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let response = client.batch_kill_jobs(&["j1", "j2"]).await.unwrap();
        assert!(response["j1"].success);
        assert!(!response["j2"].success);
    }
}
