pub mod api;
pub mod app;
pub mod console;
pub mod models;
pub mod seed;
pub mod storage;
pub mod store;
pub mod utils;

pub use models::{Conversation, ConversationSummary, Message, Sender};
pub use storage::{MemoryStorage, Persistence, SqliteStorage, StorageError};
pub use store::{ConversationStore, Rejected};
