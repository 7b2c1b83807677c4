use super::{FetchCommand, NoteFetcher, NoteStore};
use crate::error::StoreError;
use crate::models::{ConversationId, ConversationItem, DownloadStatus, NoteId};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;

/// In-memory [`NoteStore`], used by the CLI and by tests.
///
/// A note inserted with an `Unknown` status counts as downloaded: being in
/// the store is what "loaded" means here.
#[derive(Debug, Default)]
pub struct MemoryStore {
    notes: RwLock<HashMap<NoteId, ConversationItem>>,
    /// conversation id -> origin-side conversation id
    conversation_oids: RwLock<HashMap<ConversationId, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: impl IntoIterator<Item = ConversationItem>) -> Self {
        let store = Self::new();
        for item in items {
            store.insert(item);
        }
        store
    }

    pub fn insert(&self, mut item: ConversationItem) {
        if item.status == DownloadStatus::Unknown {
            item.status = DownloadStatus::Loaded;
        }
        self.notes.write().insert(item.note_id, item);
    }

    pub fn set_conversation_oid(&self, conversation_id: ConversationId, oid: impl Into<String>) {
        self.conversation_oids
            .write()
            .insert(conversation_id, oid.into());
    }

    pub fn len(&self) -> usize {
        self.notes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.read().is_empty()
    }
}

impl NoteStore for MemoryStore {
    fn conversation_id(&self, note_id: NoteId) -> Result<Option<ConversationId>, StoreError> {
        Ok(self.notes.read().get(&note_id).map(|n| n.conversation_id))
    }

    fn load_note(&self, note_id: NoteId) -> Result<Option<ConversationItem>, StoreError> {
        Ok(self.notes.read().get(&note_id).cloned())
    }

    fn reply_ids(&self, note_id: NoteId) -> Result<Vec<NoteId>, StoreError> {
        let mut ids: Vec<NoteId> = self
            .notes
            .read()
            .values()
            .filter(|n| n.is_reply_to(note_id))
            .map(|n| n.note_id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    fn notes_in_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<ConversationItem>, StoreError> {
        let mut notes: Vec<ConversationItem> = self
            .notes
            .read()
            .values()
            .filter(|n| n.conversation_id == conversation_id)
            .cloned()
            .collect();
        notes.sort_by_key(|n| n.note_id);
        Ok(notes)
    }

    fn conversation_oid(&self, note_id: NoteId) -> Result<Option<String>, StoreError> {
        let Some(conversation_id) = self.conversation_id(note_id)? else {
            return Ok(None);
        };
        Ok(self.conversation_oids.read().get(&conversation_id).cloned())
    }

    /// Moves every listed note into the smallest non-zero conversation id
    /// found among them.
    fn fix_conversation(&self, note_ids: &[NoteId]) -> Result<(), StoreError> {
        let mut notes = self.notes.write();
        let Some(target) = note_ids
            .iter()
            .filter_map(|id| notes.get(id))
            .map(|n| n.conversation_id)
            .filter(|id| *id != 0)
            .min()
        else {
            return Ok(());
        };

        for note_id in note_ids {
            if let Some(note) = notes.get_mut(note_id) {
                note.conversation_id = target;
            }
        }
        Ok(())
    }
}

/// Fetcher for offline use: no endpoint, every command dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFetcher;

impl NoteFetcher for NoFetcher {
    fn has_conversation_endpoint(&self) -> bool {
        false
    }

    fn send(&self, command: FetchCommand) {
        tracing::debug!("Offline, dropping {:?}", command);
    }
}

/// Fetcher that keeps every command it was asked to send.
#[derive(Debug, Default)]
pub struct RecordingFetcher {
    conversation_endpoint: bool,
    sent: Mutex<Vec<FetchCommand>>,
}

impl RecordingFetcher {
    pub fn new(conversation_endpoint: bool) -> Self {
        Self {
            conversation_endpoint,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<FetchCommand> {
        self.sent.lock().clone()
    }
}

impl NoteFetcher for RecordingFetcher {
    fn has_conversation_endpoint(&self) -> bool {
        self.conversation_endpoint
    }

    fn send(&self, command: FetchCommand) {
        self.sent.lock().push(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(note_id: NoteId, parent: NoteId, conversation_id: ConversationId) -> ConversationItem {
        let mut item = ConversationItem::non_loaded(note_id, conversation_id);
        item.in_reply_to_note_id = Some(parent);
        item
    }

    #[test]
    fn test_insert_marks_loaded() {
        let store = MemoryStore::from_items([ConversationItem::non_loaded(1, 1)]);
        assert!(store.load_note(1).unwrap().unwrap().is_loaded());
        assert!(store.load_note(2).unwrap().is_none());
    }

    #[test]
    fn test_reply_ids_sorted() {
        let store = MemoryStore::from_items([
            ConversationItem::non_loaded(1, 1),
            reply(5, 1, 1),
            reply(3, 1, 1),
            reply(4, 3, 1),
        ]);
        assert_eq!(store.reply_ids(1).unwrap(), vec![3, 5]);
        assert_eq!(store.reply_ids(3).unwrap(), vec![4]);
    }

    #[test]
    fn test_conversation_oid_via_note() {
        let store = MemoryStore::from_items([ConversationItem::non_loaded(1, 7)]);
        store.set_conversation_oid(7, "https://example.org/conversation/7");
        assert_eq!(
            store.conversation_oid(1).unwrap().as_deref(),
            Some("https://example.org/conversation/7")
        );
        assert_eq!(store.conversation_oid(2).unwrap(), None);
    }

    #[test]
    fn test_fix_conversation_merges_ids() {
        let store = MemoryStore::from_items([
            ConversationItem::non_loaded(1, 9),
            reply(2, 1, 4),
            reply(3, 2, 0),
        ]);
        store.fix_conversation(&[1, 2, 3]).unwrap();
        for id in 1..=3 {
            assert_eq!(store.conversation_id(id).unwrap(), Some(4));
        }
    }

    #[test]
    fn test_recording_fetcher() {
        let fetcher = RecordingFetcher::new(true);
        fetcher.send(FetchCommand::GetNote(3));
        assert!(fetcher.has_conversation_endpoint());
        assert_eq!(fetcher.sent(), vec![FetchCommand::GetNote(3)]);
    }
}
