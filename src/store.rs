use crate::models::{Conversation, ConversationSummary, Message, Sender};
use crate::seed;
use crate::storage::Persistence;
use chrono::Utc;
use log::{debug, warn};
use thiserror::Error;

/// Why `send`/`receive` refused to append.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejected {
    #[error("message is empty")]
    EmptyMessage,
    #[error("no conversation with id {0}")]
    UnknownConversation(u64),
    #[error("message ids exhausted")]
    IdsExhausted,
}

/// Owns every conversation and is the only thing that mutates them.
///
/// Every mutation is applied in memory first and then written through to the
/// persistence adapter. A failed write is logged and otherwise ignored: the
/// in-memory state stays authoritative for the rest of the session.
pub struct ConversationStore<P: Persistence> {
    conversations: Vec<Conversation>,
    selected: Option<u64>,
    /// `None` once the id space is used up.
    next_message_id: Option<u64>,
    persistence: P,
}

/// One past the largest message id, or `None` when that would overflow.
fn next_id_after(conversations: &[Conversation]) -> Option<u64> {
    conversations
        .iter()
        .flat_map(|c| c.messages.iter().map(|m| m.id))
        .max()
        .map_or(Some(1), |max| max.checked_add(1))
}

impl<P: Persistence> ConversationStore<P> {
    /// Loads the persisted set, or seeds the defaults and persists them right away.
    pub fn open(persistence: P) -> Self {
        let loaded = match persistence.load() {
            Ok(found) => found,
            Err(e) => {
                warn!("discarding stored conversations: {}", e);
                None
            }
        };
        let loaded = loaded.filter(|convs| {
            let usable = next_id_after(convs).is_some();
            if !usable {
                warn!("discarding stored conversations: message ids exhausted");
            }
            usable
        });
        let (conversations, seeded) = match loaded {
            Some(convs) => (convs, false),
            None => (seed::default_conversations(Utc::now()), true),
        };
        Self::with_conversations(persistence, conversations, seeded)
    }

    /// Starts from an explicit conversation set, writing it through immediately.
    pub fn seeded(persistence: P, conversations: Vec<Conversation>) -> Self {
        Self::with_conversations(persistence, conversations, true)
    }

    fn with_conversations(persistence: P, conversations: Vec<Conversation>, persist: bool) -> Self {
        let next_message_id = next_id_after(&conversations);
        let store = Self {
            conversations,
            selected: None,
            next_message_id,
            persistence,
        };
        if persist {
            debug!("seeding {} conversations", store.conversations.len());
            store.persist();
        }
        store
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn conversation(&self, id: u64) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn selected_id(&self) -> Option<u64> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Conversation> {
        self.selected.and_then(|id| self.conversation(id))
    }

    /// Conversations whose participant or role contains `search_term`, ignoring case,
    /// in stored order. An empty term lists everything.
    pub fn list(&self, search_term: &str) -> Vec<ConversationSummary> {
        let needle = search_term.to_lowercase();
        self.conversations
            .iter()
            .filter(|c| c.matches(&needle))
            .map(Conversation::summary)
            .collect()
    }

    /// Makes `id` the selected conversation and marks all of its messages read.
    /// Unknown ids change nothing, including the current selection.
    pub fn select(&mut self, id: u64) -> Option<&Conversation> {
        let conv = self.conversations.iter_mut().find(|c| c.id == id)?;
        let mut marked = 0;
        for msg in conv.messages.iter_mut().filter(|m| !m.read) {
            msg.read = true;
            marked += 1;
        }
        debug!("selected conversation {} ({} marked read)", id, marked);
        self.selected = Some(id);
        self.persist();
        self.conversation(id)
    }

    /// Appends a message from the operator. Whitespace-only text is rejected.
    pub fn send(&mut self, id: u64, text: &str) -> Result<Message, Rejected> {
        self.append(id, Sender::CurrentUser, text)
    }

    /// Appends a message from the counterpart, as delivered by an incoming feed.
    /// It arrives unread unless the conversation is the one currently open.
    pub fn receive(&mut self, id: u64, text: &str) -> Result<Message, Rejected> {
        let participant = self
            .conversation(id)
            .ok_or(Rejected::UnknownConversation(id))?
            .participant
            .clone();
        self.append(id, Sender::Participant(participant), text)
    }

    pub fn unread_count(&self, id: u64) -> usize {
        self.conversation(id).map_or(0, Conversation::unread_count)
    }

    pub fn into_persistence(self) -> P {
        self.persistence
    }

    fn append(&mut self, id: u64, sender: Sender, text: &str) -> Result<Message, Rejected> {
        let content = text.trim();
        if content.is_empty() {
            return Err(Rejected::EmptyMessage);
        }
        let open = self.selected == Some(id);
        let conv = self
            .conversations
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(Rejected::UnknownConversation(id))?;
        let msg_id = self.next_message_id.ok_or(Rejected::IdsExhausted)?;

        // Keep timestamps non-decreasing even if the wall clock stepped back.
        let mut timestamp = Utc::now();
        if let Some(last) = conv.last_message() {
            timestamp = timestamp.max(last.timestamp);
        }
        let read = sender == Sender::CurrentUser || open;
        let msg = Message {
            id: msg_id,
            sender,
            content: content.to_string(),
            timestamp,
            read,
        };
        self.next_message_id = msg_id.checked_add(1);
        conv.messages.push(msg.clone());
        debug!("appended message {} to conversation {}", msg.id, id);
        self.persist();
        Ok(msg)
    }

    fn persist(&self) {
        if let Err(e) = self.persistence.save(&self.conversations) {
            warn!("could not persist conversations: {}", e);
        }
    }
}
