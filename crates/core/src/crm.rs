use async_trait::async_trait;
use serde_json::Value;

use crate::domain::activity::{ActivityDraft, ActivityId};
use crate::errors::{RemoteError, ShellError};

/// Decoded response from the activity resource.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<Value>,
    pub remote_error: Option<RemoteError>,
}

impl ApiResponse {
    /// Classifies a raw response against the status the operation expects.
    pub fn from_raw(expected_status: u16, status: u16, text: String) -> Self {
        let body = serde_json::from_str::<Value>(&text).ok();
        let remote_error =
            (status != expected_status).then(|| RemoteError { status, body: text });
        Self { status, body, remote_error }
    }

    pub fn is_success(&self) -> bool {
        self.remote_error.is_none()
    }
}

/// Operations against the remote activity resource. Implementations perform
/// no validation of draft contents beyond serialization and never retry.
#[async_trait]
pub trait ActivityApi: Send + Sync {
    async fn list_all(&self) -> Result<ApiResponse, ShellError>;
    async fn get_by_id(&self, id: ActivityId) -> Result<ApiResponse, ShellError>;
    async fn create(&self, draft: &ActivityDraft) -> Result<ApiResponse, ShellError>;
    async fn update(&self, id: ActivityId, draft: &ActivityDraft)
        -> Result<ApiResponse, ShellError>;
    async fn delete(&self, id: ActivityId) -> Result<ApiResponse, ShellError>;
}
