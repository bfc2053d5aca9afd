//! Emailing a conversation summary through the agent.
//!
//! The agent does the formatting and delivery from a free-text instruction.
//! A `success: true` envelope is the only acknowledgment there is.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use colloquy_agent::{AgentError, AgentResponse};
use tracing::{info, warn};

use crate::conversation::Conversation;
use crate::error::SessionError;
use crate::orchestrator::Orchestrator;
use crate::transcript::email_transcript;

/// How long a successful dialog stays open before closing itself.
pub const EMAIL_CLOSE_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailStatus {
    Idle,
    Sending,
    Success { close_at: DateTime<Utc> },
    Error(String),
}

/// A validated email request, ready to hand to [`Orchestrator::instruct`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailTicket {
    pub recipient: String,
    pub instruction: String,
}

pub fn email_instruction(recipient: &str, transcript: &str) -> String {
    format!(
        "Please send an email to {} with the following conversation summary. \
         Make it professional and well-formatted.\n\n{}",
        recipient, transcript
    )
}

#[derive(Debug, Clone)]
pub struct EmailDialog {
    pub recipient: String,
    status: EmailStatus,
}

impl Default for EmailDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl EmailDialog {
    pub fn new() -> Self {
        Self {
            recipient: String::new(),
            status: EmailStatus::Idle,
        }
    }

    pub fn status(&self) -> &EmailStatus {
        &self.status
    }

    pub fn is_sending(&self) -> bool {
        self.status == EmailStatus::Sending
    }

    /// Validates the request and moves to `Sending`.
    ///
    /// Rejected while a send is in flight or once one has succeeded. Any other
    /// validation failure clears a previous error back to `Idle`.
    pub fn begin(
        &mut self,
        conversation: Option<&Conversation>,
        now: DateTime<Utc>,
    ) -> Result<EmailTicket, SessionError> {
        match self.status {
            EmailStatus::Sending => return Err(SessionError::EmailInProgress),
            EmailStatus::Success { .. } => return Err(SessionError::EmailAlreadySent),
            EmailStatus::Idle | EmailStatus::Error(_) => {}
        }

        match self.build_ticket(conversation, now) {
            Ok(ticket) => {
                self.status = EmailStatus::Sending;
                Ok(ticket)
            }
            Err(e) => {
                self.status = EmailStatus::Idle;
                Err(e)
            }
        }
    }

    fn build_ticket(
        &self,
        conversation: Option<&Conversation>,
        now: DateTime<Utc>,
    ) -> Result<EmailTicket, SessionError> {
        let recipient = self.recipient.trim();
        if recipient.is_empty() {
            return Err(SessionError::EmptyRecipient);
        }
        let conversation = conversation.ok_or(SessionError::NoActiveConversation)?;
        if conversation.is_empty() {
            return Err(SessionError::EmptyConversation);
        }

        let transcript = email_transcript(conversation, now);
        Ok(EmailTicket {
            recipient: recipient.to_string(),
            instruction: email_instruction(recipient, &transcript),
        })
    }

    pub fn finish(&mut self, result: Result<AgentResponse, AgentError>, now: DateTime<Utc>) {
        self.status = match result {
            Ok(response) if response.success => {
                info!("Email handed to agent");
                let delay = TimeDelta::from_std(EMAIL_CLOSE_DELAY).unwrap_or(TimeDelta::zero());
                EmailStatus::Success {
                    close_at: now + delay,
                }
            }
            Ok(_) => {
                warn!("Agent declined the email request");
                EmailStatus::Error("The agent could not send the email. Please try again.".to_string())
            }
            Err(e) => {
                warn!(error = %e, "Email request failed");
                EmailStatus::Error(format!("Failed to send email: {}", e))
            }
        };
    }

    /// Returns `true` once a successful dialog should close.
    pub fn tick(&self, now: DateTime<Utc>) -> bool {
        matches!(self.status, EmailStatus::Success { close_at } if now >= close_at)
    }

    /// Runs the whole workflow: validate, send the instruction, record the outcome.
    pub async fn send(
        &mut self,
        orchestrator: &Orchestrator,
        conversation: Option<&Conversation>,
    ) -> Result<(), SessionError> {
        let ticket = self.begin(conversation, Utc::now())?;
        let result = orchestrator.instruct(ticket.instruction).await;
        self.finish(result, Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{ConversationStore, Message};
    use crate::id::Id;
    use serde_json::json;

    fn conversation_with_message() -> ConversationStore {
        let mut store = ConversationStore::new();
        store.create_conversation(Id::new(1), Utc::now());
        store.append_message(Id::new(1), Message::user(Id::new(2), "Hello", Utc::now()));
        store
    }

    #[test]
    fn test_empty_recipient_rejected() {
        let store = conversation_with_message();
        let mut dialog = EmailDialog::new();
        dialog.recipient = "   ".to_string();

        let result = dialog.begin(store.current(), Utc::now());
        assert!(matches!(result, Err(SessionError::EmptyRecipient)));
        assert_eq!(dialog.status(), &EmailStatus::Idle);
    }

    #[test]
    fn test_empty_conversation_rejected() {
        let mut store = ConversationStore::new();
        store.create_conversation(Id::new(1), Utc::now());
        let mut dialog = EmailDialog::new();
        dialog.recipient = "a@example.com".to_string();

        assert!(matches!(
            dialog.begin(store.current(), Utc::now()),
            Err(SessionError::EmptyConversation)
        ));
        assert!(matches!(
            dialog.begin(None, Utc::now()),
            Err(SessionError::NoActiveConversation)
        ));
    }

    #[test]
    fn test_begin_builds_instruction() {
        let store = conversation_with_message();
        let mut dialog = EmailDialog::new();
        dialog.recipient = "  a@example.com ".to_string();

        let ticket = dialog.begin(store.current(), Utc::now()).unwrap();
        assert_eq!(ticket.recipient, "a@example.com");
        assert!(ticket.instruction.starts_with("Please send an email to a@example.com "));
        assert!(ticket.instruction.contains("Conversation: Hello\n"));
        assert!(ticket.instruction.ends_with("You: Hello"));
        assert!(dialog.is_sending());

        assert!(matches!(
            dialog.begin(store.current(), Utc::now()),
            Err(SessionError::EmailInProgress)
        ));
    }

    #[test]
    fn test_success_closes_after_delay() {
        let store = conversation_with_message();
        let mut dialog = EmailDialog::new();
        dialog.recipient = "a@example.com".to_string();
        let now = Utc::now();
        dialog.begin(store.current(), now).unwrap();

        let response: AgentResponse = serde_json::from_value(json!({"success": true})).unwrap();
        dialog.finish(Ok(response), now);

        assert!(!dialog.tick(now));
        assert!(!dialog.tick(now + TimeDelta::milliseconds(1999)));
        assert!(dialog.tick(now + TimeDelta::seconds(2)));
    }

    #[test]
    fn test_no_second_send_while_closing() {
        let store = conversation_with_message();
        let mut dialog = EmailDialog::new();
        dialog.recipient = "a@example.com".to_string();
        let now = Utc::now();
        dialog.begin(store.current(), now).unwrap();
        dialog.finish(Ok(serde_json::from_value(json!({"success": true})).unwrap()), now);

        assert!(matches!(
            dialog.begin(store.current(), now),
            Err(SessionError::EmailAlreadySent)
        ));
        assert!(matches!(dialog.status(), EmailStatus::Success { .. }));
    }

    #[test]
    fn test_failed_revalidation_clears_old_error() {
        let store = conversation_with_message();
        let mut dialog = EmailDialog::new();
        dialog.recipient = "a@example.com".to_string();
        let now = Utc::now();
        dialog.begin(store.current(), now).unwrap();
        dialog.finish(Ok(AgentResponse::default()), now);
        assert!(matches!(dialog.status(), EmailStatus::Error(_)));

        dialog.recipient.clear();
        assert!(matches!(
            dialog.begin(store.current(), now),
            Err(SessionError::EmptyRecipient)
        ));
        assert_eq!(dialog.status(), &EmailStatus::Idle);
    }

    #[test]
    fn test_failure_stays_open() {
        let store = conversation_with_message();
        let mut dialog = EmailDialog::new();
        dialog.recipient = "a@example.com".to_string();
        let now = Utc::now();
        dialog.begin(store.current(), now).unwrap();

        dialog.finish(
            Err(AgentError::Api {
                status: 500,
                message: "down".to_string(),
            }),
            now,
        );

        match dialog.status() {
            EmailStatus::Error(msg) => assert!(msg.contains("500")),
            other => panic!("Expected error status, got {:?}", other),
        }
        assert!(!dialog.tick(now + TimeDelta::seconds(60)));

        // Retrying from an error is allowed.
        assert!(dialog.begin(store.current(), now).is_ok());
    }

    #[test]
    fn test_unsuccessful_flag_is_error() {
        let store = conversation_with_message();
        let mut dialog = EmailDialog::new();
        dialog.recipient = "a@example.com".to_string();
        dialog.begin(store.current(), Utc::now()).unwrap();

        dialog.finish(Ok(AgentResponse::default()), Utc::now());
        assert!(matches!(dialog.status(), EmailStatus::Error(_)));
    }
}
