use async_trait::async_trait;

use crate::error::AgentError;
use crate::types::{AgentRequest, AgentResponse, UploadFile};

/// Something that can answer an agent invocation.
#[async_trait]
pub trait AgentBackend: Send + Sync {
    async fn invoke(&self, request: &AgentRequest) -> Result<AgentResponse, AgentError>;
}

/// Remote document store backing retrieval-augmented replies.
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Ingests one file into the store identified by `rag_id`.
    async fn upload_document(&self, rag_id: &str, file: &UploadFile) -> Result<(), AgentError>;

    /// Removes documents by name from the store identified by `rag_id`.
    async fn delete_documents(&self, rag_id: &str, names: &[String]) -> Result<(), AgentError>;
}
