//! Local registry of knowledge-base uploads.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::SessionError;
use crate::id::Id;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Uploading,
    Success,
    Error(String),
}

impl UploadStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, UploadStatus::Uploading)
    }
}

/// Result of an upload transfer, as reported to [`DocumentRegistry::complete_upload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Success,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: Id,
    pub name: String,
    pub uploaded_at: DateTime<Utc>,
    pub status: UploadStatus,
}

impl Document {
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            UploadStatus::Error(detail) => Some(detail),
            _ => None,
        }
    }
}

/// Uploaded documents, most recently registered first.
#[derive(Debug, Default)]
pub struct DocumentRegistry {
    documents: Vec<Document>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a document in the `Uploading` state. No network happens here.
    pub fn begin_upload(&mut self, id: Id, name: impl Into<String>, now: DateTime<Utc>) -> Id {
        let name = name.into();
        debug!(%id, %name, "Registering upload");
        self.documents.insert(
            0,
            Document {
                id,
                name,
                uploaded_at: now,
                status: UploadStatus::Uploading,
            },
        );
        id
    }

    /// Moves the document to its terminal state. Unknown ids are ignored.
    pub fn complete_upload(&mut self, id: Id, outcome: UploadOutcome) {
        let Some(document) = self.documents.iter_mut().find(|d| d.id == id) else {
            debug!(%id, "Upload completed for a document no longer registered");
            return;
        };

        document.status = match outcome {
            UploadOutcome::Success => UploadStatus::Success,
            UploadOutcome::Error(detail) => {
                warn!(%id, name = %document.name, %detail, "Upload failed");
                UploadStatus::Error(detail)
            }
        };
    }

    /// Checks a document may be deleted and returns the name the remote store knows it by.
    pub fn prepare_delete(&self, id: Id) -> Result<String, SessionError> {
        let document = self.get(id).ok_or(SessionError::DocumentNotFound(id))?;
        if !document.status.is_terminal() {
            return Err(SessionError::UploadInProgress(id));
        }
        Ok(document.name.clone())
    }

    /// Drops a document locally. Only call once the remote deletion succeeded.
    pub fn remove(&mut self, id: Id) -> Option<Document> {
        let index = self.documents.iter().position(|d| d.id == id)?;
        Some(self.documents.remove(index))
    }

    pub fn get(&self, id: Id) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn list(&self) -> &[Document] {
        &self.documents
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
