use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of an agent invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentRequest {
    /// Full conversation transcript; the agent keeps no state between calls.
    pub message: String,
    pub agent_id: String,
}

impl AgentRequest {
    pub fn new(message: impl Into<String>, agent_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            agent_id: agent_id.into(),
        }
    }
}

/// Envelope returned by the agent endpoint.
///
/// The shape of `response` differs between agent configurations, so it is kept
/// as raw JSON and interpreted by [`interpret_response`](crate::interpret_response).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AgentResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub response: Option<Value>,
    #[serde(default)]
    pub raw_response: Option<Value>,
}

/// A file to be ingested into the knowledge base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub mime_type: Option<String>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
            mime_type: None,
        }
    }

    /// Reads a file from disk, naming it after the last path component.
    pub fn read(path: impl AsRef<std::path::Path>) -> Result<Self, crate::AgentError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        let bytes = std::fs::read(path)?;
        Ok(Self::new(name, bytes))
    }
}

/// Body of a knowledge-base deletion. The remote store is keyed by document name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteDocumentsRequest {
    #[serde(rename = "ragId")]
    pub rag_id: String,
    pub documents: Vec<String>,
}
