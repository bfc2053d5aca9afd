//! Send cycle: optimistic user append, one agent call, one reply folded back.
//!
//! A cycle is split into [`Orchestrator::begin`], [`Orchestrator::dispatch`]
//! and [`Orchestrator::finish`] so that an event loop can run the network call
//! on a spawned task while it keeps ownership of the session state.
//! [`Orchestrator::send`] runs all three against a shared state.

use std::sync::Arc;

use chrono::Utc;
use colloquy_agent::{interpret_response, AgentBackend, AgentError, AgentRequest, AgentResponse};
use tracing::{info, instrument, warn};

use crate::conversation::Message;
use crate::error::SessionError;
use crate::id::Id;
use crate::state::{SessionState, SharedState};
use crate::task::detached;
use crate::transcript::agent_transcript;

/// Reply appended when the agent call fails or reports failure.
pub const ERROR_REPLY: &str =
    "Sorry, I encountered an error processing your message. Please try again.";

/// An issued send, carrying everything needed to fold the reply back.
#[derive(Debug, Clone)]
pub struct SendTicket {
    conversation_id: Id,
    reply_id: Id,
    request: AgentRequest,
}

impl SendTicket {
    /// Conversation the reply belongs to, captured when the send began.
    pub fn conversation_id(&self) -> Id {
        self.conversation_id
    }

    pub fn request(&self) -> &AgentRequest {
        &self.request
    }
}

#[derive(Clone)]
pub struct Orchestrator {
    backend: Arc<dyn AgentBackend>,
    agent_id: String,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn AgentBackend>, agent_id: impl Into<String>) -> Self {
        Self {
            backend,
            agent_id: agent_id.into(),
        }
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// Validates the send, appends the user message and marks the conversation pending.
    pub fn begin(
        &self,
        state: &mut SessionState,
        conversation_id: Id,
        text: &str,
    ) -> Result<SendTicket, SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        if state.conversations.get(conversation_id).is_none() {
            return Err(SessionError::ConversationNotFound(conversation_id));
        }
        if state.pending.is_sending(conversation_id) {
            return Err(SessionError::SendInProgress(conversation_id));
        }

        let message_id = state.ids.next_id();
        let message = Message::user(message_id, text, Utc::now());
        let conversation = state
            .conversations
            .append_message(conversation_id, message)
            .ok_or(SessionError::ConversationNotFound(conversation_id))?;

        let transcript = agent_transcript(conversation);
        state.pending.insert(conversation_id);

        info!(conversation = %conversation_id, message = %message_id, "Send started");

        Ok(SendTicket {
            conversation_id,
            reply_id: message_id.reply(),
            request: AgentRequest::new(transcript, self.agent_id.clone()),
        })
    }

    /// Like [`begin`](Self::begin), targeting the current conversation.
    pub fn begin_current(
        &self,
        state: &mut SessionState,
        text: &str,
    ) -> Result<SendTicket, SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        let id = state
            .conversations
            .current_id()
            .ok_or(SessionError::NoActiveConversation)?;
        self.begin(state, id, text)
    }

    /// Issues the agent call for a ticket. Touches no session state.
    #[instrument(skip(self, ticket), fields(conversation = %ticket.conversation_id))]
    pub async fn dispatch(&self, ticket: &SendTicket) -> Result<AgentResponse, AgentError> {
        self.backend.invoke(&ticket.request).await
    }

    /// Sends a free-text instruction with this orchestrator's agent id.
    #[instrument(skip(self, instruction))]
    pub async fn instruct(&self, instruction: String) -> Result<AgentResponse, AgentError> {
        let request = AgentRequest::new(instruction, self.agent_id.clone());
        self.backend.invoke(&request).await
    }

    /// Folds the outcome of a dispatch into the conversation it was issued for.
    ///
    /// Always clears the pending mark. Returns the appended message, or `None`
    /// if the conversation was deleted while the call was in flight.
    pub fn finish(
        state: &mut SessionState,
        ticket: SendTicket,
        result: Result<AgentResponse, AgentError>,
    ) -> Option<Message> {
        state.pending.remove(ticket.conversation_id);

        let content = reply_text(&result);
        let message = Message::agent(ticket.reply_id, content, Utc::now());

        match state
            .conversations
            .append_message(ticket.conversation_id, message.clone())
        {
            Some(_) => {
                info!(conversation = %ticket.conversation_id, "Send finished");
                Some(message)
            }
            None => {
                info!(conversation = %ticket.conversation_id, "Reply dropped, conversation was deleted");
                None
            }
        }
    }

    /// Runs a whole send cycle against a shared state.
    ///
    /// The lock is released while the agent call is in flight, so sends to
    /// other conversations can proceed concurrently. The call and the fold
    /// run on their own task: dropping this future, or a panicking backend,
    /// still ends the cycle with one reply and a cleared pending mark.
    pub async fn send(
        &self,
        state: &SharedState,
        conversation_id: Id,
        text: &str,
    ) -> Result<Option<Message>, SessionError> {
        let ticket = {
            let mut guard = state.lock().await;
            self.begin(&mut guard, conversation_id, text)?
        };

        let orchestrator = self.clone();
        let state = Arc::clone(state);
        let cycle = tokio::spawn(async move {
            let request = ticket.clone();
            let result = detached(async move { orchestrator.dispatch(&request).await }).await;
            let mut guard = state.lock().await;
            Self::finish(&mut guard, ticket, result)
        });

        cycle
            .await
            .map_err(|e| SessionError::Remote(AgentError::Interrupted(e.to_string())))
    }
}

/// Text of the reply message for a dispatch outcome.
pub fn reply_text(result: &Result<AgentResponse, AgentError>) -> String {
    match result {
        Ok(response) if response.success => interpret_response(response),
        Ok(_) => {
            warn!("Agent reported an unsuccessful response");
            ERROR_REPLY.to_string()
        }
        Err(e) => {
            warn!(error = %e, "Agent call failed");
            ERROR_REPLY.to_string()
        }
    }
}
