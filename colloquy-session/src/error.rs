use colloquy_agent::AgentError;
use thiserror::Error;

use crate::id::Id;

/// Errors surfaced by session operations.
///
/// Validation variants are returned before any network call and leave state
/// untouched. `Remote` is only returned where the caller must decide what to
/// show, e.g. a failed document deletion.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("message cannot be empty")]
    EmptyMessage,

    #[error("no active conversation")]
    NoActiveConversation,

    #[error("conversation not found: {0}")]
    ConversationNotFound(Id),

    #[error("a message is already being sent in conversation {0}")]
    SendInProgress(Id),

    #[error("document not found: {0}")]
    DocumentNotFound(Id),

    #[error("document {0} is still uploading")]
    UploadInProgress(Id),

    #[error("recipient email address is required")]
    EmptyRecipient,

    #[error("conversation has no messages to send")]
    EmptyConversation,

    #[error("email is already being sent")]
    EmailInProgress,

    #[error("email has already been sent")]
    EmailAlreadySent,

    #[error("remote error: {0}")]
    Remote(#[from] AgentError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(SessionError::EmptyMessage.to_string(), "message cannot be empty");
        assert_eq!(
            SessionError::EmptyRecipient.to_string(),
            "recipient email address is required"
        );

        let id = Id::new(1700000000000);
        assert_eq!(
            SessionError::ConversationNotFound(id).to_string(),
            "conversation not found: 1700000000000"
        );
        assert_eq!(
            SessionError::UploadInProgress(id.reply()).to_string(),
            "document 1700000000000.1 is still uploading"
        );

        let err = SessionError::from(AgentError::Api {
            status: 500,
            message: "boom".to_string(),
        });
        assert_eq!(err.to_string(), "remote error: API error: 500 - boom");
    }
}
