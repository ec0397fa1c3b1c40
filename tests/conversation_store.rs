use chrono::Utc;
use medidesk::{Conversation, ConversationStore, Message, Persistence, Sender, SqliteStorage};

fn sarah() -> Vec<Conversation> {
    let mut conv = Conversation::new(1, "Dr. Sarah Johnson", "Cardiologist");
    conv.messages.push(Message {
        id: 1,
        sender: Sender::participant("Dr. Sarah Johnson"),
        content: "Hi".to_string(),
        timestamp: Utc::now(),
        read: false,
    });
    vec![conv]
}

#[test]
fn read_state_and_sending_walkthrough() {
    let mut store = ConversationStore::seeded(SqliteStorage::in_memory().unwrap(), sarah());

    assert_eq!(store.unread_count(1), 1);

    store.select(1).unwrap();
    assert!(store.conversation(1).unwrap().messages[0].read);
    assert_eq!(store.unread_count(1), 0);

    assert!(store.send(1, "  ").is_err());
    assert_eq!(store.conversation(1).unwrap().messages.len(), 1);

    store.send(1, "Thanks!").unwrap();
    let conv = store.conversation(1).unwrap();
    assert_eq!(conv.messages.len(), 2);
    let last = conv.last_message().unwrap();
    assert_eq!(last.content, "Thanks!");
    assert_eq!(last.sender, Sender::CurrentUser);
}

#[test]
fn reopening_reproduces_the_same_conversations() {
    let mut store = ConversationStore::open(SqliteStorage::in_memory().unwrap());
    store.select(3);
    store.send(3, "Dosage confirmed, 5mg twice daily.").unwrap();
    store.receive(1, "Running ten minutes late.").unwrap();
    let before = store.conversations().to_vec();

    let storage = store.into_persistence();
    assert_eq!(storage.load().unwrap().as_ref(), Some(&before));

    let reopened = ConversationStore::open(storage);
    assert_eq!(reopened.conversations(), before.as_slice());
    assert_eq!(reopened.unread_count(1), 3);
    assert_eq!(reopened.unread_count(3), 0);
    assert_eq!(reopened.selected_id(), None);

    let ids: Vec<u64> = reopened.list("").iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[test]
fn message_ids_keep_increasing_across_sessions() {
    let mut store = ConversationStore::open(SqliteStorage::in_memory().unwrap());
    let first = store.send(2, "one").unwrap();
    let mut reopened = ConversationStore::open(store.into_persistence());
    let second = reopened.send(2, "two").unwrap();
    assert!(second.id > first.id);
}
