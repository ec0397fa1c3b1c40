use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest preview shown in the conversation list before it gets an ellipsis.
pub const PREVIEW_LEN: usize = 50;

/// Author of a message: the logged-in operator or the counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    CurrentUser,
    Participant(String),
}

impl Sender {
    pub fn participant(name: impl Into<String>) -> Self {
        Sender::Participant(name.into())
    }

    /// Name to render for this sender; `me` is the configured display name of the operator.
    pub fn display_name<'a>(&'a self, me: &'a str) -> &'a str {
        match self {
            Sender::CurrentUser => me,
            Sender::Participant(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub sender: Sender,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

impl Message {
    pub fn is_own(&self) -> bool {
        self.sender == Sender::CurrentUser
    }

    fn counts_as_unread(&self) -> bool {
        !self.read && !self.is_own()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: u64,
    pub participant: String,
    pub role: String,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn new(id: u64, participant: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id,
            participant: participant.into(),
            role: role.into(),
            messages: Vec::new(),
        }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Messages from the counterpart that have not been seen yet. Always derived, never stored.
    pub fn unread_count(&self) -> usize {
        self.messages.iter().filter(|m| m.counts_as_unread()).count()
    }

    /// Case-insensitive substring match on participant or role. `needle` must already be lowercase.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.participant.to_lowercase().contains(needle)
            || self.role.to_lowercase().contains(needle)
    }

    pub fn summary(&self) -> ConversationSummary {
        ConversationSummary {
            id: self.id,
            participant: self.participant.clone(),
            role: self.role.clone(),
            preview: preview(self.last_message()),
            last_activity: self.last_message().map(|m| m.timestamp),
            unread_count: self.unread_count(),
        }
    }
}

/// One row of the conversation list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub id: u64,
    pub participant: String,
    pub role: String,
    pub preview: String,
    pub last_activity: Option<DateTime<Utc>>,
    pub unread_count: usize,
}

fn preview(last: Option<&Message>) -> String {
    match last {
        None => "No messages".to_string(),
        Some(m) if m.content.chars().count() > PREVIEW_LEN => {
            let cut: String = m.content.chars().take(PREVIEW_LEN).collect();
            format!("{}...", cut)
        }
        Some(m) => m.content.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: u64, sender: Sender, content: &str, read: bool) -> Message {
        Message {
            id,
            sender,
            content: content.to_string(),
            timestamp: Utc::now(),
            read,
        }
    }

    #[test]
    fn unread_count_ignores_own_messages() {
        let mut conv = Conversation::new(1, "Dr. Sarah Johnson", "Cardiologist");
        conv.messages.push(msg(1, Sender::participant("Dr. Sarah Johnson"), "Hi", false));
        conv.messages.push(msg(2, Sender::CurrentUser, "Hello", false));
        conv.messages.push(msg(3, Sender::participant("Dr. Sarah Johnson"), "Still there?", true));
        assert_eq!(conv.unread_count(), 1);
    }

    #[test]
    fn summary_truncates_long_previews() {
        let mut conv = Conversation::new(2, "Dr. Michael Brown", "Neurologist");
        assert_eq!(conv.summary().preview, "No messages");

        let long = "x".repeat(PREVIEW_LEN + 10);
        conv.messages.push(msg(1, Sender::CurrentUser, &long, true));
        let summary = conv.summary();
        assert_eq!(summary.preview, format!("{}...", "x".repeat(PREVIEW_LEN)));
        assert_eq!(summary.unread_count, 0);
        assert!(summary.last_activity.is_some());
    }

    #[test]
    fn matches_participant_or_role() {
        let conv = Conversation::new(3, "Nurse Emma Wilson", "Head Nurse");
        assert!(conv.matches("emma"));
        assert!(conv.matches("head"));
        assert!(conv.matches(""));
        assert!(!conv.matches("cardio"));
    }

    #[test]
    fn sender_serializes_as_tagged_value() {
        let me = serde_json::to_value(Sender::CurrentUser).unwrap();
        assert_eq!(me, serde_json::json!("current_user"));
        let other = serde_json::to_value(Sender::participant("Dr. David Chen")).unwrap();
        assert_eq!(other, serde_json::json!({ "participant": "Dr. David Chen" }));
    }
}
