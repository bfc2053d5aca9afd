use std::future::Future;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use colloquy_agent::{AgentClient, AgentError, AgentResponse, KnowledgeBase, UploadFile};
use colloquy_session::{
    detached, knowledge, Conversation, Document, EmailDialog, EmailStatus, Id, Orchestrator,
    SendTicket, SessionState,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use super::line::LineInput;
use crate::config::Settings;

/// How long a copied message keeps its check mark.
pub const COPIED_MARK_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Chat,
    SelectConversation,
    Documents,
    UploadPrompt,
    Email,
}

/// Result of a background network task, applied on the UI thread.
pub enum Completion {
    Reply {
        ticket: SendTicket,
        result: Result<AgentResponse, AgentError>,
    },
    Upload {
        id: Id,
        result: Result<(), AgentError>,
    },
    Delete {
        id: Id,
        result: Result<(), AgentError>,
    },
    Email {
        result: Result<AgentResponse, AgentError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopiedMark {
    pub message_id: Id,
    pub until: DateTime<Utc>,
}

pub struct ChatApp {
    pub mode: AppMode,
    pub should_quit: bool,
    pub state: SessionState,
    pub orchestrator: Orchestrator,
    pub knowledge_base: Arc<dyn KnowledgeBase>,
    pub rag_id: Option<String>,
    pub input: LineInput,
    /// Shared buffer for the upload path and email recipient prompts.
    pub prompt: LineInput,
    pub email: EmailDialog,
    pub sidebar_open: bool,
    pub messages_scroll: u16,
    pub last_error: Option<String>,
    pub copied: Option<CopiedMark>,

    // Popup state
    pub popup_selected: usize,

    completion_tx: UnboundedSender<Completion>,
    completion_rx: UnboundedReceiver<Completion>,
}

impl ChatApp {
    pub fn new(settings: Settings) -> Self {
        let client = Arc::new(AgentClient::with_base_url(&settings.base_url));
        let orchestrator = Orchestrator::new(client.clone(), &settings.agent_id);
        Self::with_backends(orchestrator, client, settings.rag_id)
    }

    pub fn with_backends(
        orchestrator: Orchestrator,
        knowledge_base: Arc<dyn KnowledgeBase>,
        rag_id: Option<String>,
    ) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();

        Self {
            mode: AppMode::Chat,
            should_quit: false,
            state: SessionState::new(),
            orchestrator,
            knowledge_base,
            rag_id,
            input: LineInput::default(),
            prompt: LineInput::default(),
            email: EmailDialog::new(),
            sidebar_open: true,
            messages_scroll: 0,
            last_error: None,
            copied: None,
            popup_selected: 0,
            completion_tx,
            completion_rx,
        }
    }

    pub fn current_conversation(&self) -> Option<&Conversation> {
        self.state.conversations.current()
    }

    /// Whether the input line accepts a send right now.
    pub fn input_enabled(&self) -> bool {
        self.mode == AppMode::Chat
            && self.current_conversation().is_some()
            && !self.state.current_is_sending()
    }

    /// Runs `task` on the runtime and reports its result as a [`Completion`].
    ///
    /// A panicking task still reports, as [`AgentError::Interrupted`], so no
    /// pending state is left behind.
    fn spawn<T, F>(&self, task: F, complete: impl FnOnce(Result<T, AgentError>) -> Completion + Send + 'static)
    where
        T: Send + 'static,
        F: Future<Output = Result<T, AgentError>> + Send + 'static,
    {
        let tx = self.completion_tx.clone();
        tokio::spawn(async move {
            let result = detached(task).await;
            let _ = tx.send(complete(result));
        });
    }

    pub fn send_message(&mut self) {
        if !self.input_enabled() {
            return;
        }
        if self.input.text.trim().is_empty() {
            return;
        }
        let text = self.input.text.clone();

        let ticket = match self.orchestrator.begin_current(&mut self.state, &text) {
            Ok(ticket) => ticket,
            Err(e) => {
                self.last_error = Some(e.to_string());
                return;
            }
        };

        self.input.clear();
        self.messages_scroll = 0;
        self.last_error = None;

        let orchestrator = self.orchestrator.clone();
        let request = ticket.clone();
        self.spawn(
            async move { orchestrator.dispatch(&request).await },
            move |result| Completion::Reply { ticket, result },
        );
    }

    /// Applies every finished background task.
    pub fn poll_completions(&mut self) {
        while let Ok(completion) = self.completion_rx.try_recv() {
            self.apply(completion);
        }

        self.tick(Utc::now());
    }

    /// Expires timed UI state: the email dialog after success, the copy mark.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if self.email.tick(now) {
            self.close_email();
        }
        if self.copied.is_some_and(|mark| now >= mark.until) {
            self.copied = None;
        }
    }

    pub fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Reply { ticket, result } => {
                let is_current = self.state.conversations.current_id() == Some(ticket.conversation_id());
                Orchestrator::finish(&mut self.state, ticket, result);
                if is_current {
                    self.messages_scroll = 0; // Scroll to bottom
                }
            }
            Completion::Upload { id, result } => {
                knowledge::finish_upload(&mut self.state, id, result);
            }
            Completion::Delete { id, result } => {
                let name = self
                    .state
                    .documents
                    .get(id)
                    .map(|d| d.name.clone())
                    .unwrap_or_else(|| id.to_string());
                match knowledge::finish_delete(&mut self.state, id, result) {
                    Ok(_) => self.clamp_popup(self.state.documents.list().len()),
                    Err(e) => self.last_error = Some(format!("Failed to delete {}: {}", name, e)),
                }
            }
            Completion::Email { result } => {
                self.email.finish(result, Utc::now());
            }
        }
    }

    pub fn new_conversation(&mut self) {
        self.state.create_conversation();
        self.input.clear();
        self.messages_scroll = 0;
        self.last_error = None;
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
    }

    pub fn open_conversation_picker(&mut self) {
        self.popup_selected = self
            .state
            .conversations
            .current_id()
            .and_then(|id| self.state.conversations.list().iter().position(|c| c.id() == id))
            .unwrap_or(0);
        self.mode = AppMode::SelectConversation;
    }

    pub fn open_documents(&mut self) {
        self.popup_selected = 0;
        self.mode = AppMode::Documents;
    }

    pub fn open_upload_prompt(&mut self) {
        self.prompt.clear();
        self.mode = AppMode::UploadPrompt;
    }

    pub fn open_email(&mut self) {
        self.email = EmailDialog::new();
        self.prompt.clear();
        self.last_error = None;
        self.mode = AppMode::Email;
    }

    /// Closes the email dialog unless a send is still in flight.
    pub fn close_email(&mut self) {
        if self.email.is_sending() {
            return;
        }
        self.email = EmailDialog::new();
        self.prompt.clear();
        self.mode = AppMode::Chat;
    }

    pub fn close_popup(&mut self) {
        self.mode = match self.mode {
            AppMode::UploadPrompt => AppMode::Documents,
            _ => AppMode::Chat,
        };
    }

    pub fn popup_len(&self) -> usize {
        match self.mode {
            AppMode::SelectConversation => self.state.conversations.len(),
            AppMode::Documents => self.state.documents.list().len(),
            _ => 0,
        }
    }

    fn clamp_popup(&mut self, len: usize) {
        if self.popup_selected >= len {
            self.popup_selected = len.saturating_sub(1);
        }
    }

    pub fn popup_up(&mut self) {
        if self.popup_selected > 0 {
            self.popup_selected -= 1;
        }
    }

    pub fn popup_down(&mut self) {
        if self.popup_selected + 1 < self.popup_len() {
            self.popup_selected += 1;
        }
    }

    pub fn popup_select(&mut self) {
        if self.mode == AppMode::SelectConversation {
            let selected = self
                .state
                .conversations
                .list()
                .get(self.popup_selected)
                .map(|c| c.id());
            if let Some(id) = selected {
                if let Err(e) = self.state.conversations.select_conversation(id) {
                    self.last_error = Some(e.to_string());
                }
                self.messages_scroll = 0;
            }
        }
        self.close_popup();
    }

    pub fn delete_selected_conversation(&mut self) {
        let selected = self
            .state
            .conversations
            .list()
            .get(self.popup_selected)
            .map(|c| c.id());
        if let Some(id) = selected {
            self.state.conversations.delete_conversation(id);
            self.clamp_popup(self.state.conversations.len());
        }
    }

    pub fn selected_document(&self) -> Option<&Document> {
        self.state.documents.list().get(self.popup_selected)
    }

    pub fn start_upload(&mut self) {
        let path = self.prompt.text.trim().to_string();
        if path.is_empty() {
            return;
        }
        let Some(rag_id) = self.rag_id.clone() else {
            self.last_error = Some("No knowledge base configured (--rag-id)".to_string());
            return;
        };
        let file = match UploadFile::read(Path::new(&path)) {
            Ok(file) => file,
            Err(e) => {
                self.last_error = Some(format!("Cannot read {}: {}", path, e));
                return;
            }
        };

        let id = knowledge::register_upload(&mut self.state, file.name.clone());
        debug!(%id, name = %file.name, "Upload queued");

        self.prompt.clear();
        self.last_error = None;
        self.popup_selected = 0;
        self.mode = AppMode::Documents;

        let kb = Arc::clone(&self.knowledge_base);
        self.spawn(
            async move { kb.upload_document(&rag_id, &file).await },
            move |result| Completion::Upload { id, result },
        );
    }

    pub fn delete_selected_document(&mut self) {
        let Some(id) = self.selected_document().map(|d| d.id) else {
            return;
        };
        let Some(rag_id) = self.rag_id.clone() else {
            self.last_error = Some("No knowledge base configured (--rag-id)".to_string());
            return;
        };
        let name = match self.state.documents.prepare_delete(id) {
            Ok(name) => name,
            Err(e) => {
                self.last_error = Some(e.to_string());
                return;
            }
        };

        self.last_error = None;
        let kb = Arc::clone(&self.knowledge_base);
        self.spawn(
            async move { kb.delete_documents(&rag_id, &[name]).await },
            move |result| Completion::Delete { id, result },
        );
    }

    pub fn send_email(&mut self) {
        self.email.recipient = self.prompt.text.clone();
        let ticket = match self
            .email
            .begin(self.state.conversations.current(), Utc::now())
        {
            Ok(ticket) => ticket,
            Err(e) => {
                self.last_error = Some(e.to_string());
                return;
            }
        };

        self.last_error = None;
        let orchestrator = self.orchestrator.clone();
        self.spawn(
            async move { orchestrator.instruct(ticket.instruction).await },
            |result| Completion::Email { result },
        );
    }

    pub fn email_status(&self) -> &EmailStatus {
        self.email.status()
    }

    /// Hands the last message of the current conversation to `write` and
    /// marks it as copied for [`COPIED_MARK_DELAY`].
    pub fn copy_last_message(
        &mut self,
        now: DateTime<Utc>,
        write: impl FnOnce(&str) -> io::Result<()>,
    ) {
        let Some(message) = self.current_conversation().and_then(|c| c.messages().last()) else {
            return;
        };
        let message_id = message.id;

        match write(&message.content) {
            Ok(()) => {
                let delay = TimeDelta::from_std(COPIED_MARK_DELAY).unwrap_or(TimeDelta::zero());
                self.copied = Some(CopiedMark {
                    message_id,
                    until: now + delay,
                });
            }
            Err(e) => {
                self.last_error = Some(format!("Copy failed: {}", e));
            }
        }
    }

    /// Id of the message currently showing the copied mark.
    pub fn copied_message(&self) -> Option<Id> {
        self.copied.map(|mark| mark.message_id)
    }

    pub fn scroll_up(&mut self) {
        self.messages_scroll = self.messages_scroll.saturating_add(1);
    }

    pub fn scroll_down(&mut self) {
        self.messages_scroll = self.messages_scroll.saturating_sub(1);
    }
}
