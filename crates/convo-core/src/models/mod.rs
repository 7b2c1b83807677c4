pub mod conversation;
pub mod note;
pub mod order;

pub use conversation::Conversation;
pub use note::{ConversationId, ConversationItem, DownloadStatus, NoteId, Visibility};
pub use order::{ConversationOrder, NoteOrder};
