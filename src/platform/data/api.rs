//! Data API operations

use chrono::{DateTime, Utc};
use log::debug;
use reqwest::multipart::Form;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::config::api;
use crate::error::Result;
use crate::platform::batch::{BatchAction, BatchResponse};
use crate::platform::client::{segment, take_typed};
use crate::platform::helpers::format_ttl;
use crate::platform::query::DataQuery;
use crate::platform::transfer::file_part;
use crate::platform::PlatformClient;

use super::models::{Data, PostDataUrl};

impl PlatformClient {
    fn data_path(&self, id: &str, action: Option<&str>) -> String {
        match action {
            Some(action) => self.endpoint(&format!("{}/{}/{}", api::DATA, segment(id), action)),
            None => self.endpoint(&format!("{}/{}", api::DATA, segment(id))),
        }
    }

    /// List all uploaded data
    pub async fn list_data(&self) -> Result<Vec<Data>> {
        let url = self.endpoint(&format!("{}/list", api::DATA));
        let value = self.send_json(self.get(&url)).await?;
        let data: Vec<Data> = take_typed(value, "data")?;
        debug!("Fetched {} data records", data.len());
        Ok(data)
    }

    /// Run a data query, returning the full response envelope
    pub async fn query_data(&self, query: &DataQuery) -> Result<Value> {
        let url = self.endpoint(api::DATA);
        self.send_json(self.get(&url).query(&query.to_params()))
            .await
    }

    /// Upload a file, streaming it from disk
    pub async fn upload_data(&self, path: &Path, ttl: Option<DateTime<Utc>>) -> Result<Data> {
        let url = self.endpoint(api::DATA);
        let mut form = Form::new().part("file", file_part(path).await?);
        if let Some(ttl) = ttl {
            form = form.text("data_ttl", format_ttl(&ttl));
        }
        let value = self.send_json(self.post(&url).multipart(form)).await?;
        take_typed(value, "data")
    }

    /// Register data that already lives behind a signed URL
    pub async fn post_data_as_url(&self, request: &PostDataUrl) -> Result<Data> {
        let url = self.endpoint(&format!("{}/url", api::DATA));
        let value = self.send_json(self.post(&url).json(request)).await?;
        take_typed(value, "data")
    }

    pub async fn get_data_details(&self, data_id: &str) -> Result<Data> {
        let value = self
            .send_json(self.get(&self.data_path(data_id, None)))
            .await?;
        take_typed(value, "data")
    }

    /// Download data to `output`, or to its uploaded file name when `None`
    ///
    /// Returns the path written.
    pub async fn download_data(&self, data_id: &str, output: Option<&Path>) -> Result<PathBuf> {
        let output = match output {
            Some(path) => path.to_path_buf(),
            None => self.get_data_details(data_id).await?.download_name(),
        };
        self.stream_download(&self.data_path(data_id, Some("download")), &output)
            .await?;
        Ok(output)
    }

    /// Signed URL with read access to the data
    pub async fn get_data_download_url(&self, data_id: &str) -> Result<String> {
        let value = self
            .send_json(self.get(&self.data_path(data_id, Some("download-url"))))
            .await?;
        take_typed(value, "url")
    }

    /// Extend or shorten the data's expiration by `days`
    pub async fn update_data_ttl(&self, data_id: &str, days: i64) -> Result<()> {
        let url = self.data_path(data_id, Some("ttl"));
        self.send_empty(self.put(&url).form(&[("days", days.to_string())]))
            .await
    }

    pub async fn delete_data(&self, data_id: &str) -> Result<()> {
        self.send_empty(self.delete(&self.data_path(data_id, None)))
            .await
    }

    pub async fn batch_delete_data<S: AsRef<str>>(&self, ids: &[S]) -> Result<BatchResponse> {
        self.batch_request(api::DATA, BatchAction::Delete, ids)
            .await
    }

    pub async fn batch_update_data_ttl<S: AsRef<str>>(
        &self,
        ids: &[S],
        days: u32,
    ) -> Result<BatchResponse> {
        self.batch_request(api::DATA, BatchAction::Ttl { days }, ids)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlatformError;
    use tempfile::TempDir;
    use wiremock::matchers::{body_string, body_string_contains, header_regex, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn data_json(id: &str, name: &str) -> Value {
        serde_json::json!({
            "id": id,
            "name": name,
            "filename": name,
            "type": "video/mp4",
            "size": 4,
            "upload_date": "2019-06-04T15:47:59.190Z"
        })
    }

    #[tokio::test]
    async fn test_list_data() {
        let mock_server = MockServer::start().await;
        let client = PlatformClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/data/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [data_json("d1", "a.mp4"), data_json("d2", "b.mp4")]
            })))
            .mount(&mock_server)
            .await;

        let data = client.list_data().await.unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[1].id, "d2");
    }

    #[tokio::test]
    async fn test_query_data_sends_params() {
        let mock_server = MockServer::start().await;
        let client = PlatformClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/data"))
            .and(query_param("fields", "id,name"))
            .and(query_param("search", "name:video"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"id": "d1", "name": "video.mp4"}],
                "count": 1
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let query = DataQuery::new()
            .add_fields(["id", "name"])
            .add_search("name", "video")
            .unwrap()
            .set_limit(10);
        let body = client.query_data(&query).await.unwrap();
        assert_eq!(body["count"], 1);
        assert_eq!(body["data"][0]["id"], "d1");
    }

    #[tokio::test]
    async fn test_upload_data_streams_multipart() {
        let mock_server = MockServer::start().await;
        let client = PlatformClient::test_client(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/data"))
            .and(header_regex("content-type", "^multipart/form-data; boundary="))
            .and(body_string_contains("filename=\"clip.mp4\""))
            .and(body_string_contains("video/mp4"))
            .and(body_string_contains("frame-bytes"))
            .and(body_string_contains("name=\"data_ttl\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": data_json("d9", "clip.mp4")
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let dir = TempDir::new().unwrap();
        let file = dir.path().join("clip.mp4");
        std::fs::write(&file, "frame-bytes").unwrap();

        let ttl = chrono::Utc::now() + chrono::Duration::days(3);
        let data = client.upload_data(&file, Some(ttl)).await.unwrap();
        assert_eq!(data.id, "d9");
    }

    #[tokio::test]
    async fn test_upload_data_sends_multi_chunk_file_intact() {
        let mock_server = MockServer::start().await;
        let client = PlatformClient::test_client(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": data_json("d10", "big.bin")
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let dir = TempDir::new().unwrap();
        let file = dir.path().join("big.bin");
        let size = crate::config::transfer::UPLOAD_CHUNK_SIZE * 5 + 321;
        let content: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
        std::fs::write(&file, &content).unwrap();

        client.upload_data(&file, None).await.unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        let body = &requests[0].body;
        let marker = b"filename=\"big.bin\"";
        let part_start = body
            .windows(marker.len())
            .position(|w| w == marker)
            .unwrap();
        let header_end = body[part_start..]
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .unwrap();
        let payload_start = part_start + header_end + 4;
        assert_eq!(&body[payload_start..payload_start + size], &content[..]);
        assert_eq!(&body[payload_start + size..payload_start + size + 2], b"\r\n");
    }

    #[tokio::test]
    async fn test_post_data_as_url() {
        let mock_server = MockServer::start().await;
        let client = PlatformClient::test_client(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/data/url"))
            .and(body_string_contains("\"signed_url\":\"https://bucket/x.mp4\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": data_json("d3", "x.mp4")
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let request = PostDataUrl {
            signed_url: "https://bucket/x.mp4".to_string(),
            filename: "x.mp4".to_string(),
            mimetype: "video/mp4".to_string(),
            size: 100,
            encoding: None,
            data_ttl: None,
        };
        let data = client.post_data_as_url(&request).await.unwrap();
        assert_eq!(data.id, "d3");
    }

    #[tokio::test]
    async fn test_download_data_to_explicit_path() {
        let mock_server = MockServer::start().await;
        let client = PlatformClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/data/d1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": data_json("d1", "remote.mp4")
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/data/d1/download"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abcd".to_vec()))
            .mount(&mock_server)
            .await;

        let dir = TempDir::new().unwrap();
        let explicit = dir.path().join("sub/local.mp4");
        let written = client.download_data("d1", Some(&explicit)).await.unwrap();
        assert_eq!(written, explicit);
        assert_eq!(std::fs::read(&explicit).unwrap(), b"abcd");

        // Explicit output skips the details lookup
        let details = client.get_data_details("d1").await.unwrap();
        assert_eq!(details.download_name(), PathBuf::from("remote.mp4"));
    }

    #[tokio::test]
    async fn test_download_url_and_ttl() {
        let mock_server = MockServer::start().await;
        let client = PlatformClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/data/d1/download-url"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"url": "https://signed/d1"})),
            )
            .mount(&mock_server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/data/d1/ttl"))
            .and(body_string("days=-2"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        assert_eq!(
            client.get_data_download_url("d1").await.unwrap(),
            "https://signed/d1"
        );
        client.update_data_ttl("d1", -2).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_data_not_found() {
        let mock_server = MockServer::start().await;
        let client = PlatformClient::test_client(&mock_server.uri());

        Mock::given(method("DELETE"))
            .and(path("/data/nope"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": {"code": 404, "message": "No data with ID 'nope'"}
            })))
            .mount(&mock_server)
            .await;

        match client.delete_data("nope").await.unwrap_err() {
            PlatformError::Api { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("nope"));
            }
            other => panic!("Expected PlatformError::Api, got {:?}", other),
        }
    }
}
