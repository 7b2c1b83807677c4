pub mod config;
pub mod constants;
pub mod error;
pub mod loader;
pub mod models;
pub mod origin;
pub mod progress;
pub mod store;
pub mod tree;
pub mod view;

// Re-export the main entry points at crate root for convenience
pub use config::{LoadStrategy, LoaderConfig};
pub use error::{LoadError, StoreError};
pub use loader::ConversationLoader;
pub use models::{Conversation, ConversationItem, ConversationOrder, NoteId, NoteOrder};
pub use progress::ProgressPublisher;
pub use tree::ConversationTreeBuilder;
pub use view::{ConversationRow, ViewOptions};
