use chrono::{DateTime, Utc};

use crate::conversation::{Conversation, Sender};

/// Context sent to the agent: every message as `Role: content`, one per line.
pub fn agent_transcript(conversation: &Conversation) -> String {
    conversation
        .messages()
        .iter()
        .map(|m| {
            let role = match m.sender {
                Sender::User => "User",
                Sender::Agent => "Assistant",
            };
            format!("{}: {}", role, m.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Plaintext summary used for email dispatch.
pub fn email_transcript(conversation: &Conversation, now: DateTime<Utc>) -> String {
    let body = conversation
        .messages()
        .iter()
        .map(|m| {
            let role = match m.sender {
                Sender::User => "You",
                Sender::Agent => "Assistant",
            };
            format!("{}: {}", role, m.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Conversation: {}\nDate: {}\n\n{}",
        conversation.title(),
        now.format("%Y-%m-%d %H:%M:%S UTC"),
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::ConversationStore;
    use crate::conversation::Message;
    use crate::id::Id;
    use chrono::TimeZone;

    fn sample() -> ConversationStore {
        let mut store = ConversationStore::new();
        let now = Utc::now();
        store.create_conversation(Id::new(1), now);
        store.append_message(Id::new(1), Message::user(Id::new(2), "Hello", now));
        store.append_message(Id::new(1), Message::agent(Id::new(2).reply(), "Hi there", now));
        store.append_message(Id::new(1), Message::user(Id::new(3), "Bye", now));
        store
    }

    #[test]
    fn test_agent_transcript() {
        let store = sample();
        let conv = store.get(Id::new(1)).unwrap();
        assert_eq!(
            agent_transcript(conv),
            "User: Hello\nAssistant: Hi there\nUser: Bye"
        );
    }

    #[test]
    fn test_agent_transcript_empty() {
        let conv = Conversation::new(Id::new(1), Utc::now());
        assert_eq!(agent_transcript(&conv), "");
    }

    #[test]
    fn test_email_transcript() {
        let store = sample();
        let conv = store.get(Id::new(1)).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();

        assert_eq!(
            email_transcript(conv, now),
            "Conversation: Hello\nDate: 2024-05-01 09:30:00 UTC\n\n\
             You: Hello\n\nAssistant: Hi there\n\nYou: Bye"
        );
    }
}
