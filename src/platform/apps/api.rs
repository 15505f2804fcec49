//! Application-only API operations

use log::debug;
use serde::Serialize;
use serde_json::Value;

use crate::config::api;
use crate::error::{PlatformError, Result};
use crate::platform::client::take_typed;
use crate::platform::query::{DataQuery, JobsQuery};
use crate::platform::PlatformClient;

#[derive(Serialize)]
struct NewUser<'a> {
    username: &'a str,
}

impl PlatformClient {
    fn apps_endpoint(&self, path: &str) -> Result<String> {
        if !self.is_application() {
            return Err(PlatformError::Config(format!(
                "'{}/{}' requires an application token",
                api::APPS,
                path
            )));
        }
        Ok(self.endpoint(&format!("{}/{}", api::APPS, path)))
    }

    /// Create a new application user
    pub async fn create_user(&self, username: &str) -> Result<()> {
        let url = self.apps_endpoint("users")?;
        self.send_empty(self.post(&url).json(&NewUser { username }))
            .await?;
        debug!("Created application user '{}'", username);
        Ok(())
    }

    /// Usernames of all application users
    pub async fn list_users(&self) -> Result<Vec<String>> {
        let url = self.apps_endpoint("users/list")?;
        let value = self.send_json(self.get(&url)).await?;
        take_typed(value, "users")
    }

    /// Data query across every user of the application
    pub async fn query_application_data(&self, query: &DataQuery) -> Result<Value> {
        let url = self.apps_endpoint(api::DATA)?;
        self.send_json(self.get(&url).query(&query.to_params()))
            .await
    }

    /// Jobs query across every user of the application
    pub async fn query_application_jobs(&self, query: &JobsQuery) -> Result<Value> {
        let url = self.apps_endpoint(api::JOBS)?;
        self.send_json(self.get(&url).query(&query.to_params()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::credentials;
    use crate::platform::credentials::TokenKind;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app_client(uri: &str) -> PlatformClient {
        PlatformClient::test_client_with(uri, TokenKind::Application)
    }

    #[tokio::test]
    async fn test_create_and_list_users() {
        let mock_server = MockServer::start().await;
        let client = app_client(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/apps/users"))
            .and(header(credentials::APP_KEY_HEADER, "test-key"))
            .and(body_json(serde_json::json!({"username": "alice"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/apps/users/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "users": ["alice", "bob"]
            })))
            .mount(&mock_server)
            .await;

        client.create_user("alice").await.unwrap();
        assert_eq!(client.list_users().await.unwrap(), vec!["alice", "bob"]);
    }

    #[tokio::test]
    async fn test_application_queries() {
        let mock_server = MockServer::start().await;
        let client = app_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/apps/jobs"))
            .and(query_param("search", "state:RUNNING|QUEUED"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jobs": [{"id": "j1"}],
                "count": 1
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/apps/data"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [],
                "count": 0
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let jobs_query = JobsQuery::new()
            .add_search_or("state", ["RUNNING", "QUEUED"])
            .unwrap();
        let jobs = client.query_application_jobs(&jobs_query).await.unwrap();
        assert_eq!(jobs["count"], 1);

        let data = client
            .query_application_data(&DataQuery::new().set_limit(5))
            .await
            .unwrap();
        assert_eq!(data["count"], 0);
    }

    #[tokio::test]
    async fn test_user_token_rejected() {
        let client = PlatformClient::test_client("http://127.0.0.1:1");
        assert!(matches!(
            client.list_users().await,
            Err(PlatformError::Config(_))
        ));
    }
}
