use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::{debug, instrument};

use crate::backend::{AgentBackend, KnowledgeBase};
use crate::error::AgentError;
use crate::types::{AgentRequest, AgentResponse, DeleteDocumentsRequest, UploadFile};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Client for the agent and knowledge-base endpoints.
#[derive(Debug, Clone)]
pub struct AgentClient {
    http: reqwest::Client,
    base_url: String,
}

impl AgentClient {
    /// Creates a new client against [`DEFAULT_BASE_URL`].
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn agent_url(&self) -> String {
        format!("{}/api/agent", self.base_url)
    }

    fn rag_url(&self) -> String {
        format!("{}/api/rag", self.base_url)
    }

    /// Sends the transcript to the agent and returns its response envelope.
    #[instrument(skip(self, request), fields(agent_id = %request.agent_id))]
    pub async fn invoke(&self, request: &AgentRequest) -> Result<AgentResponse, AgentError> {
        debug!(chars = request.message.len(), "Sending request to agent");

        let response = self
            .http
            .post(self.agent_url())
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let response = error_for_status(response).await?;
        let body: AgentResponse = serde_json::from_slice(&response.bytes().await?)?;

        debug!(success = body.success, "Received agent response");
        Ok(body)
    }

    /// Uploads a file to the knowledge base as multipart form data.
    #[instrument(skip(self, file), fields(name = %file.name, bytes = file.bytes.len()))]
    pub async fn upload_document(&self, rag_id: &str, file: &UploadFile) -> Result<(), AgentError> {
        let mut part = Part::bytes(file.bytes.clone()).file_name(file.name.clone());
        if let Some(mime) = &file.mime_type {
            part = part.mime_str(mime)?;
        }
        let form = Form::new()
            .part("file", part)
            .text("ragId", rag_id.to_string());

        debug!("Uploading document");

        let response = self.http.post(self.rag_url()).multipart(form).send().await?;
        error_for_status(response).await?;

        debug!("Upload accepted");
        Ok(())
    }

    /// Deletes documents from the knowledge base by name.
    #[instrument(skip(self))]
    pub async fn delete_documents(&self, rag_id: &str, names: &[String]) -> Result<(), AgentError> {
        let body = DeleteDocumentsRequest {
            rag_id: rag_id.to_string(),
            documents: names.to_vec(),
        };

        let response = self
            .http
            .delete(self.rag_url())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;
        error_for_status(response).await?;

        debug!("Deletion accepted");
        Ok(())
    }
}

impl Default for AgentClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Turns a non-2xx response into [`AgentError::Api`] carrying the body text.
async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, AgentError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or(text);

    Err(AgentError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl AgentBackend for AgentClient {
    async fn invoke(&self, request: &AgentRequest) -> Result<AgentResponse, AgentError> {
        AgentClient::invoke(self, request).await
    }
}

#[async_trait]
impl KnowledgeBase for AgentClient {
    async fn upload_document(&self, rag_id: &str, file: &UploadFile) -> Result<(), AgentError> {
        AgentClient::upload_document(self, rag_id, file).await
    }

    async fn delete_documents(&self, rag_id: &str, names: &[String]) -> Result<(), AgentError> {
        AgentClient::delete_documents(self, rag_id, names).await
    }
}
