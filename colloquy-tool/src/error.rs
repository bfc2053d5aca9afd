use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Knowledge base id not found. Pass --rag-id, set COLLOQUY_RAG_ID or configure ~/.config/colloquy/config.toml")]
    RagIdNotConfigured,

    #[error("Upload of {name} failed: {reason}")]
    UploadFailed { name: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Agent error: {0}")]
    Agent(#[from] colloquy_agent::AgentError),

    #[error("{0}")]
    Session(#[from] colloquy_session::SessionError),
}
