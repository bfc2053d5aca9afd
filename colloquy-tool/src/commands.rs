use std::path::Path;
use std::sync::Arc;

use colloquy_agent::{AgentClient, UploadFile};
use colloquy_session::{knowledge, Orchestrator, SessionState, UploadStatus};

use crate::config::Settings;
use crate::error::ToolError;

/// Sends one message in a fresh conversation and prints the reply.
pub async fn ask(settings: &Settings, message: &str) -> Result<(), ToolError> {
    let client = Arc::new(AgentClient::with_base_url(&settings.base_url));
    let orchestrator = Orchestrator::new(client, &settings.agent_id);

    let state = SessionState::new().shared();
    let id = state.lock().await.create_conversation().id();

    if let Some(reply) = orchestrator.send(&state, id, message).await? {
        println!("{}", reply.content);
    }
    Ok(())
}

/// Uploads one file to the knowledge base and reports the outcome.
pub async fn upload(settings: &Settings, path: &Path) -> Result<(), ToolError> {
    let rag_id = settings.require_rag_id()?;
    let file = UploadFile::read(path)?;
    let client = Arc::new(AgentClient::with_base_url(&settings.base_url));

    let state = SessionState::new().shared();
    let id = knowledge::upload_document(&state, client, rag_id, file).await;

    let guard = state.lock().await;
    let Some(document) = guard.documents.get(id) else {
        return Ok(());
    };
    match &document.status {
        UploadStatus::Error(reason) => Err(ToolError::UploadFailed {
            name: document.name.clone(),
            reason: reason.clone(),
        }),
        _ => {
            println!("Uploaded {}", document.name);
            Ok(())
        }
    }
}
