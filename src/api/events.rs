use crate::storage::Persistence;
use crate::store::ConversationStore;
use serde::{Deserialize, Serialize};

pub const NEW_MESSAGE: &str = "new-message";

#[derive(Debug, Serialize, Deserialize)]
pub struct IncomingEvent {
    pub event_type: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewMessage {
    conversation_id: u64,
    content: String,
}

/// Feeds one event from the server into the store. Returns true when a message was appended.
pub fn apply<P: Persistence>(store: &mut ConversationStore<P>, event: IncomingEvent) -> bool {
    if event.event_type != NEW_MESSAGE {
        log::debug!("ignoring event {}", event.event_type);
        return false;
    }
    let payload: NewMessage = match serde_json::from_value(event.data) {
        Ok(p) => p,
        Err(e) => {
            log::warn!("malformed {} event: {}", NEW_MESSAGE, e);
            return false;
        }
    };
    match store.receive(payload.conversation_id, &payload.content) {
        Ok(_) => true,
        Err(e) => {
            log::debug!("dropped incoming message: {}", e);
            false
        }
    }
}
