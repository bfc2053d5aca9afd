//! Conversations and the store that owns them.
//!
//! The store keeps a single ordered set of conversations; the "current"
//! conversation is only an id into that set, so there is no second copy that
//! could fall out of sync.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::SessionError;
use crate::id::Id;

/// Title shown until the first message fixes it.
pub const PLACEHOLDER_TITLE: &str = "New Conversation";

/// Maximum number of characters taken from the first message for the title.
pub const TITLE_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    User,
    Agent,
}

/// A single chat message. Never modified after it is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Id,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(id: Id, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            content: content.into(),
            sender: Sender::User,
            timestamp,
        }
    }

    pub fn agent(id: Id, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            content: content.into(),
            sender: Sender::Agent,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    id: Id,
    title: String,
    messages: Vec<Message>,
    created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(id: Id, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: PLACEHOLDER_TITLE.to_string(),
            messages: Vec::new(),
            created_at,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Messages in append order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn push(&mut self, message: Message) {
        if self.messages.is_empty() {
            self.title = message.content.chars().take(TITLE_MAX_CHARS).collect();
        }
        self.messages.push(message);
    }
}

/// The session's conversations, most recent first, plus the current selection.
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    current: Option<Id>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty conversation at the head of the set and makes it current.
    pub fn create_conversation(&mut self, id: Id, now: DateTime<Utc>) -> &Conversation {
        debug!(%id, "Creating conversation");
        self.conversations.insert(0, Conversation::new(id, now));
        self.current = Some(id);
        &self.conversations[0]
    }

    pub fn select_conversation(&mut self, id: Id) -> Result<(), SessionError> {
        if self.get(id).is_none() {
            return Err(SessionError::ConversationNotFound(id));
        }
        self.current = Some(id);
        Ok(())
    }

    /// Removes a conversation. If it was current, the new head becomes current.
    ///
    /// Returns `false` when no conversation had that id.
    pub fn delete_conversation(&mut self, id: Id) -> bool {
        let before = self.conversations.len();
        self.conversations.retain(|c| c.id != id);
        let removed = self.conversations.len() != before;

        if removed && self.current == Some(id) {
            self.current = self.conversations.first().map(|c| c.id);
        }
        if removed {
            debug!(%id, "Deleted conversation");
        }
        removed
    }

    /// Appends a message to the conversation with the given id.
    ///
    /// The first message fixes the title. Returns `None` if the conversation
    /// no longer exists, e.g. it was deleted while a reply was in flight.
    pub fn append_message(&mut self, conversation_id: Id, message: Message) -> Option<&Conversation> {
        let conversation = self
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)?;
        conversation.push(message);
        Some(conversation)
    }

    pub fn get(&self, id: Id) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    /// The current conversation, looked up in the set on every call.
    pub fn current(&self) -> Option<&Conversation> {
        self.current.and_then(|id| self.get(id))
    }

    pub fn current_id(&self) -> Option<Id> {
        self.current
    }

    pub fn list(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(ids: &[u64]) -> ConversationStore {
        let mut store = ConversationStore::new();
        for &id in ids {
            store.create_conversation(Id::new(id), Utc::now());
        }
        store
    }

    #[test]
    fn test_create_prepends_and_selects() {
        let store = store_with(&[1, 2, 3]);
        let order: Vec<u64> = store.list().iter().map(|c| c.id().seq()).collect();
        assert_eq!(order, vec![3, 2, 1]);
        assert_eq!(store.current_id(), Some(Id::new(3)));

        let current = store.current().unwrap();
        assert_eq!(current.title(), PLACEHOLDER_TITLE);
        assert!(current.is_empty());
    }

    #[test]
    fn test_select_unknown_is_error() {
        let mut store = store_with(&[1]);
        let result = store.select_conversation(Id::new(99));
        assert!(matches!(result, Err(SessionError::ConversationNotFound(_))));
        assert_eq!(store.current_id(), Some(Id::new(1)));
    }

    #[test]
    fn test_delete_current_moves_to_head() {
        let mut store = store_with(&[1, 2, 3]);
        store.select_conversation(Id::new(2)).unwrap();

        assert!(store.delete_conversation(Id::new(2)));
        assert_eq!(store.current_id(), Some(Id::new(3)));
    }

    #[test]
    fn test_delete_other_keeps_current() {
        let mut store = store_with(&[1, 2]);
        assert!(store.delete_conversation(Id::new(1)));
        assert_eq!(store.current_id(), Some(Id::new(2)));
        assert!(!store.delete_conversation(Id::new(1)));
    }

    #[test]
    fn test_delete_last_clears_current() {
        let mut store = store_with(&[1]);
        store.delete_conversation(Id::new(1));
        assert!(store.is_empty());
        assert_eq!(store.current_id(), None);
        assert!(store.current().is_none());
    }

    #[test]
    fn test_first_message_fixes_title() {
        let mut store = store_with(&[1]);
        let now = Utc::now();
        let long = "x".repeat(80);

        let conv = store
            .append_message(Id::new(1), Message::user(Id::new(10), long.clone(), now))
            .unwrap();
        assert_eq!(conv.title(), "x".repeat(TITLE_MAX_CHARS));

        let conv = store
            .append_message(Id::new(1), Message::agent(Id::new(10).reply(), "different", now))
            .unwrap();
        assert_eq!(conv.title(), "x".repeat(TITLE_MAX_CHARS));
        assert_eq!(conv.messages().len(), 2);
    }

    #[test]
    fn test_title_truncates_by_character() {
        let mut store = store_with(&[1]);
        let text = "é".repeat(60);
        let conv = store
            .append_message(Id::new(1), Message::user(Id::new(2), text, Utc::now()))
            .unwrap();
        assert_eq!(conv.title().chars().count(), TITLE_MAX_CHARS);
    }

    #[test]
    fn test_append_visible_through_current_and_set() {
        let mut store = store_with(&[1, 2]);
        store.select_conversation(Id::new(1)).unwrap();
        store.append_message(Id::new(1), Message::user(Id::new(5), "Hello", Utc::now()));

        assert_eq!(store.current().unwrap().messages().len(), 1);
        assert_eq!(store.get(Id::new(1)).unwrap().messages().len(), 1);
        assert_eq!(store.current(), store.get(Id::new(1)));
    }

    #[test]
    fn test_append_to_missing_conversation_is_none() {
        let mut store = store_with(&[1]);
        let result = store.append_message(Id::new(7), Message::user(Id::new(8), "hi", Utc::now()));
        assert!(result.is_none());
    }
}
