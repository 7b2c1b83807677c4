//! Collaborators the loader reads conversations through.
//!
//! The loader never talks to a database or a network directly: it asks a
//! [`NoteStore`] for notes and reply links, and hands note or conversation
//! requests to a [`NoteFetcher`]. Results of those requests come back later,
//! through whatever fills the shared [`NoteCache`].

pub mod cache;
pub mod memory;

pub use cache::NoteCache;
pub use memory::{MemoryStore, NoFetcher, RecordingFetcher};

use crate::error::StoreError;
use crate::models::{ConversationId, ConversationItem, NoteId};

/// Local storage of notes.
pub trait NoteStore {
    /// Conversation a note belongs to, if the note is known at all.
    fn conversation_id(&self, note_id: NoteId) -> Result<Option<ConversationId>, StoreError>;

    fn load_note(&self, note_id: NoteId) -> Result<Option<ConversationItem>, StoreError>;

    /// Ids of the direct replies to a note.
    fn reply_ids(&self, note_id: NoteId) -> Result<Vec<NoteId>, StoreError>;

    fn notes_in_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<ConversationItem>, StoreError>;

    /// Origin-side id of the conversation a note belongs to.
    fn conversation_oid(&self, note_id: NoteId) -> Result<Option<String>, StoreError>;

    /// Repair conversation links between the given notes, e.g. after the
    /// loader found them spread over several conversation ids.
    fn fix_conversation(&self, _note_ids: &[NoteId]) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Requests sent to the network layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchCommand {
    GetNote(NoteId),
    GetConversation(NoteId),
}

/// Fire-and-forget trigger for network downloads.
pub trait NoteFetcher {
    /// Whether the account's server can return a whole conversation.
    fn has_conversation_endpoint(&self) -> bool;

    fn send(&self, command: FetchCommand);
}

impl<T: NoteStore + ?Sized> NoteStore for &T {
    fn conversation_id(&self, note_id: NoteId) -> Result<Option<ConversationId>, StoreError> {
        (**self).conversation_id(note_id)
    }

    fn load_note(&self, note_id: NoteId) -> Result<Option<ConversationItem>, StoreError> {
        (**self).load_note(note_id)
    }

    fn reply_ids(&self, note_id: NoteId) -> Result<Vec<NoteId>, StoreError> {
        (**self).reply_ids(note_id)
    }

    fn notes_in_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<ConversationItem>, StoreError> {
        (**self).notes_in_conversation(conversation_id)
    }

    fn conversation_oid(&self, note_id: NoteId) -> Result<Option<String>, StoreError> {
        (**self).conversation_oid(note_id)
    }

    fn fix_conversation(&self, note_ids: &[NoteId]) -> Result<(), StoreError> {
        (**self).fix_conversation(note_ids)
    }
}

impl<T: NoteFetcher + ?Sized> NoteFetcher for &T {
    fn has_conversation_endpoint(&self) -> bool {
        (**self).has_conversation_endpoint()
    }

    fn send(&self, command: FetchCommand) {
        (**self).send(command)
    }
}
