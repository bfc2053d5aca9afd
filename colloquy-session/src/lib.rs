//! In-memory chat session state and the request flows that mutate it.
//!
//! [`SessionState`] holds conversations, uploaded documents and the set of
//! conversations awaiting a reply. [`Orchestrator`] runs send cycles against
//! an [`AgentBackend`](colloquy_agent::AgentBackend); [`knowledge`] runs
//! uploads and deletions against a [`KnowledgeBase`](colloquy_agent::KnowledgeBase);
//! [`EmailDialog`] routes a transcript through the agent as an email request.
//!
//! Nothing here is persisted.

mod conversation;
mod document;
mod email;
mod error;
mod id;
pub mod knowledge;
mod orchestrator;
mod state;
mod task;
mod time;
mod transcript;

pub use conversation::{
    Conversation, ConversationStore, Message, Sender, PLACEHOLDER_TITLE, TITLE_MAX_CHARS,
};
pub use document::{Document, DocumentRegistry, UploadOutcome, UploadStatus};
pub use email::{email_instruction, EmailDialog, EmailStatus, EmailTicket, EMAIL_CLOSE_DELAY};
pub use error::SessionError;
pub use id::{Id, IdGenerator};
pub use orchestrator::{reply_text, Orchestrator, SendTicket, ERROR_REPLY};
pub use state::{PendingSends, SessionState, SharedState};
pub use task::detached;
pub use time::format_relative;
pub use transcript::{agent_transcript, email_transcript};
