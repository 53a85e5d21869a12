//! HTTP adapter for the CRM activity resource.
//!
//! Every call is addressed as `{base_url}/v1/activities[/{id}]` with the API
//! token carried as the `api_token` query parameter. Responses are classified
//! against the status each operation expects; a mismatch is reported through
//! [`ApiResponse::remote_error`] rather than failing the call.

use async_trait::async_trait;
use pipeshell_core::config::CrmConfig;
use pipeshell_core::{ActivityApi, ActivityDraft, ActivityId, ApiResponse, ShellError};
use reqwest::{Client, Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

const STATUS_OK: u16 = 200;
const STATUS_CREATED: u16 = 201;

pub struct HttpActivityClient {
    client: Client,
    base_url: String,
    api_token: SecretString,
}

impl HttpActivityClient {
    pub fn new(base_url: impl Into<String>, api_token: SecretString) -> Self {
        Self::with_client(Client::new(), base_url, api_token)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, api_token: SecretString) -> Self {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        Self { client, base_url, api_token }
    }

    pub fn from_config(config: &CrmConfig) -> Self {
        Self::new(config.base_url.clone(), config.api_token.clone())
    }

    pub fn collection_url(&self) -> String {
        format!("{}/v1/activities", self.base_url)
    }

    pub fn item_url(&self, id: ActivityId) -> String {
        format!("{}/v1/activities/{id}", self.base_url)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .query(&[("api_token", self.api_token.expose_secret())])
    }

    async fn execute(
        &self,
        operation: &'static str,
        expected_status: u16,
        request: RequestBuilder,
    ) -> Result<ApiResponse, ShellError> {
        debug!(event_name = "crm.request.sent", operation, "sending activity request");

        let response = request.send().await.map_err(|error| {
            let message = redacted(error);
            warn!(event_name = "crm.request.failed", operation, error = %message);
            ShellError::Transport(message)
        })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|error| {
            ShellError::Transport(format!("failed to read response body: {}", redacted(error)))
        })?;

        let decoded = ApiResponse::from_raw(expected_status, status, text);
        if decoded.remote_error.is_some() {
            warn!(
                event_name = "crm.request.remote_error",
                operation,
                status,
                expected_status,
                "activity request returned unexpected status"
            );
        } else {
            debug!(event_name = "crm.request.completed", operation, status);
        }
        Ok(decoded)
    }
}

/// Renders a reqwest error with its URL stripped; the URL carries the api token.
fn redacted(error: reqwest::Error) -> String {
    error.without_url().to_string()
}

#[async_trait]
impl ActivityApi for HttpActivityClient {
    async fn list_all(&self) -> Result<ApiResponse, ShellError> {
        let request = self.request(Method::GET, &self.collection_url());
        self.execute("list_all", STATUS_OK, request).await
    }

    async fn get_by_id(&self, id: ActivityId) -> Result<ApiResponse, ShellError> {
        let request = self.request(Method::GET, &self.item_url(id));
        self.execute("get_by_id", STATUS_OK, request).await
    }

    async fn create(&self, draft: &ActivityDraft) -> Result<ApiResponse, ShellError> {
        let request = self.request(Method::POST, &self.collection_url()).json(draft);
        self.execute("create", STATUS_CREATED, request).await
    }

    async fn update(
        &self,
        id: ActivityId,
        draft: &ActivityDraft,
    ) -> Result<ApiResponse, ShellError> {
        let request = self.request(Method::PUT, &self.item_url(id)).json(draft);
        self.execute("update", STATUS_OK, request).await
    }

    async fn delete(&self, id: ActivityId) -> Result<ApiResponse, ShellError> {
        let request = self.request(Method::DELETE, &self.item_url(id));
        self.execute("delete", STATUS_OK, request).await
    }
}
