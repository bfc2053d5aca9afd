use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::conversation::{Conversation, ConversationStore};
use crate::document::DocumentRegistry;
use crate::id::{Id, IdGenerator};

/// Conversations with a send cycle in flight.
#[derive(Debug, Default)]
pub struct PendingSends {
    ids: HashSet<Id>,
}

impl PendingSends {
    pub fn is_sending(&self, conversation_id: Id) -> bool {
        self.ids.contains(&conversation_id)
    }

    pub fn any(&self) -> bool {
        !self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns `false` if the conversation was already sending.
    pub(crate) fn insert(&mut self, conversation_id: Id) -> bool {
        self.ids.insert(conversation_id)
    }

    pub(crate) fn remove(&mut self, conversation_id: Id) {
        self.ids.remove(&conversation_id);
    }
}

/// Session state shared between a caller and the tasks that finish its requests.
pub type SharedState = Arc<Mutex<SessionState>>;

/// Everything a chat session holds in memory.
///
/// Owned by the presentation layer for the lifetime of the process and handed
/// to the orchestrator and the document flows by reference.
#[derive(Debug, Default)]
pub struct SessionState {
    pub conversations: ConversationStore,
    pub documents: DocumentRegistry,
    pub pending: PendingSends,
    pub ids: IdGenerator,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }

    pub fn create_conversation(&mut self) -> &Conversation {
        let id = self.ids.next_id();
        self.conversations.create_conversation(id, Utc::now())
    }

    /// Whether the current conversation has a send in flight.
    pub fn current_is_sending(&self) -> bool {
        self.conversations
            .current_id()
            .is_some_and(|id| self.pending.is_sending(id))
    }
}
