//! Upload and deletion flows against the remote knowledge base.
//!
//! Each flow is a synchronous start step, one remote call, and a synchronous
//! finish step. The async entry points run the call and the finish step on
//! their own task and release the lock while the call is in flight; an event
//! loop can call the steps directly around its own spawned call.

use std::sync::Arc;

use chrono::Utc;
use colloquy_agent::{AgentError, KnowledgeBase, UploadFile};
use tracing::{info, instrument, warn};

use crate::document::{Document, UploadOutcome};
use crate::error::SessionError;
use crate::id::Id;
use crate::state::{SessionState, SharedState};
use crate::task::detached;

/// Maps an upload transfer result to the registry's terminal state.
pub fn upload_outcome(result: Result<(), AgentError>) -> UploadOutcome {
    match result {
        Ok(()) => UploadOutcome::Success,
        Err(e) => UploadOutcome::Error(e.to_string()),
    }
}

/// Registers a document as uploading and returns its id.
pub fn register_upload(state: &mut SessionState, name: impl Into<String>) -> Id {
    let id = state.ids.next_id();
    state.documents.begin_upload(id, name, Utc::now())
}

/// Records the outcome of an upload transfer.
pub fn finish_upload(state: &mut SessionState, id: Id, result: Result<(), AgentError>) {
    let outcome = upload_outcome(result);
    info!(%id, ?outcome, "Upload finished");
    state.documents.complete_upload(id, outcome);
}

/// Removes a document once its remote deletion has been attempted.
///
/// If the remote call failed the registry is left untouched and the error is
/// returned.
pub fn finish_delete(
    state: &mut SessionState,
    id: Id,
    result: Result<(), AgentError>,
) -> Result<Document, SessionError> {
    if let Err(e) = result {
        warn!(%id, error = %e, "Remote deletion failed, keeping document");
        return Err(e.into());
    }

    state
        .documents
        .remove(id)
        .ok_or(SessionError::DocumentNotFound(id))
}

/// Registers `file`, uploads it, and records the outcome. Returns the document id.
///
/// Transfer failures end up as an `Error` status on the document, never as an
/// `Err` here.
#[instrument(skip(state, kb, file), fields(name = %file.name))]
pub async fn upload_document(
    state: &SharedState,
    kb: Arc<dyn KnowledgeBase>,
    rag_id: &str,
    file: UploadFile,
) -> Id {
    let id = register_upload(&mut *state.lock().await, file.name.clone());

    let state = Arc::clone(state);
    let rag_id = rag_id.to_string();
    let flow = tokio::spawn(async move {
        let result = detached(async move { kb.upload_document(&rag_id, &file).await }).await;
        finish_upload(&mut *state.lock().await, id, result);
    });
    if let Err(e) = flow.await {
        warn!(%id, error = %e, "Upload task did not finish");
    }
    id
}

/// Deletes a document remotely, then locally.
#[instrument(skip(state, kb))]
pub async fn delete_document(
    state: &SharedState,
    kb: Arc<dyn KnowledgeBase>,
    rag_id: &str,
    id: Id,
) -> Result<Document, SessionError> {
    let name = state.lock().await.documents.prepare_delete(id)?;

    let state = Arc::clone(state);
    let rag_id = rag_id.to_string();
    let flow = tokio::spawn(async move {
        let result = detached(async move { kb.delete_documents(&rag_id, &[name]).await }).await;
        finish_delete(&mut *state.lock().await, id, result)
    });

    flow.await
        .map_err(|e| SessionError::Remote(AgentError::Interrupted(e.to_string())))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::UploadStatus;

    #[test]
    fn test_finish_upload_records_error() {
        let mut state = SessionState::new();
        let id = register_upload(&mut state, "a.pdf");
        assert_eq!(state.documents.get(id).unwrap().status, UploadStatus::Uploading);

        finish_upload(
            &mut state,
            id,
            Err(AgentError::Api {
                status: 413,
                message: "too large".to_string(),
            }),
        );
        assert!(state.documents.get(id).unwrap().error().unwrap().contains("413"));
    }

    #[test]
    fn test_finish_delete_outcomes() {
        let mut state = SessionState::new();
        let id = register_upload(&mut state, "a.pdf");
        finish_upload(&mut state, id, Ok(()));

        let failed = finish_delete(&mut state, id, Err(AgentError::Interrupted("gone".to_string())));
        assert!(matches!(failed, Err(SessionError::Remote(_))));
        assert!(state.documents.get(id).is_some());

        assert_eq!(finish_delete(&mut state, id, Ok(())).unwrap().name, "a.pdf");
        assert!(matches!(
            finish_delete(&mut state, id, Ok(())),
            Err(SessionError::DocumentNotFound(_))
        ));
    }
}
