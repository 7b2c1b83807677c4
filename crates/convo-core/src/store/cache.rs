use crate::models::{ConversationItem, NoteId};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Thread-safe cache of conversation items, keyed by note id.
///
/// Cloning shares the same map, so the code that receives notes from the
/// network can fill the cache while a loader reads from it.
#[derive(Debug, Clone, Default)]
pub struct NoteCache {
    inner: Arc<RwLock<HashMap<NoteId, ConversationItem>>>,
}

impl NoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, note_id: NoteId) -> Option<ConversationItem> {
        self.inner.read().get(&note_id).cloned()
    }

    pub fn contains(&self, note_id: NoteId) -> bool {
        self.inner.read().contains_key(&note_id)
    }

    /// Insert or replace; returns the previous entry.
    pub fn put(&self, item: ConversationItem) -> Option<ConversationItem> {
        self.inner.write().insert(item.note_id, item)
    }

    pub fn remove(&self, note_id: NoteId) -> Option<ConversationItem> {
        self.inner.write().remove(&note_id)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Cached items whose ids are not in `known`, sorted by note id.
    pub fn missing_from(&self, known: &HashSet<NoteId>) -> Vec<ConversationItem> {
        let cache = self.inner.read();
        let mut missed: Vec<ConversationItem> = cache
            .values()
            .filter(|cached| !known.contains(&cached.note_id))
            .cloned()
            .collect();
        missed.sort_by_key(|item| item.note_id);
        missed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_shared_between_clones() {
        let cache = NoteCache::new();
        let writer = cache.clone();
        writer.put(ConversationItem::non_loaded(5, 1));

        assert!(cache.contains(5));
        assert_eq!(cache.get(5).map(|i| i.conversation_id), Some(1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_missing_from() {
        let cache = NoteCache::new();
        for id in [3, 1, 2] {
            cache.put(ConversationItem::non_loaded(id, 1));
        }
        let known = HashSet::from([2]);
        let missed: Vec<NoteId> = cache.missing_from(&known).iter().map(|i| i.note_id).collect();
        assert_eq!(missed, vec![1, 3]);
    }

    #[test]
    fn test_concurrent_writers() {
        let cache = NoteCache::new();
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        cache.put(ConversationItem::non_loaded(t * 100 + i + 1, 1));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 400);
    }
}
