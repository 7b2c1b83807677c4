//! Collects the notes of one conversation and orders them.
//!
//! Loading starts from a selected note. Depending on [`LoadStrategy`] the
//! loader either walks reply links outward from that note or asks the store
//! for the whole conversation. Notes the store cannot provide stay stubs and
//! may be requested from the network. Notes delivered later through the
//! shared [`NoteCache`] are merged in on the next load when they belong to
//! the loaded conversation or reply to one of its notes. The collected
//! items are then handed to the [`ConversationTreeBuilder`].

use crate::config::{LoadStrategy, LoaderConfig};
use crate::error::LoadError;
use crate::models::{Conversation, ConversationId, ConversationItem, NoteId};
use crate::origin::is_downloadable;
use crate::progress::ProgressPublisher;
use crate::store::{FetchCommand, NoteCache, NoteFetcher, NoteStore};
use crate::tree::ConversationTreeBuilder;
use std::collections::{HashMap, HashSet};

pub struct ConversationLoader<S, F> {
    store: S,
    fetcher: F,
    cache: NoteCache,
    config: LoaderConfig,
    selected_note_id: NoteId,
    /// Conversation ids seen among loaded notes. More than one means the
    /// stored links are inconsistent.
    conversation_ids: HashSet<ConversationId>,
    fix_conversation: bool,
    conversation_sync_requested: bool,
    /// Notes hydrated during the current pass
    pass_items: HashMap<NoteId, ConversationItem>,
    /// Guard against walking the same note twice while collecting
    ids_to_find: Vec<NoteId>,
    items: Vec<ConversationItem>,
}

impl<S: NoteStore, F: NoteFetcher> ConversationLoader<S, F> {
    pub fn new(store: S, fetcher: F, config: LoaderConfig, selected_note_id: NoteId) -> Self {
        Self {
            store,
            fetcher,
            cache: NoteCache::new(),
            config,
            selected_note_id,
            conversation_ids: HashSet::new(),
            fix_conversation: false,
            conversation_sync_requested: false,
            pass_items: HashMap::new(),
            ids_to_find: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Use an existing cache, e.g. one the network layer is already filling.
    pub fn with_cache(mut self, cache: NoteCache) -> Self {
        self.cache = cache;
        self
    }

    /// Handle to the cache this loader merges from.
    pub fn cache(&self) -> NoteCache {
        self.cache.clone()
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn selected_note_id(&self) -> NoteId {
        self.selected_note_id
    }

    pub fn allow_loading_from_internet(&mut self) {
        self.config.allow_loading_from_internet = true;
    }

    pub fn is_conversation_sync_requested(&self) -> bool {
        self.conversation_sync_requested
    }

    /// Load, repair if needed, and order the conversation.
    pub fn load(
        &mut self,
        progress: Option<&dyn ProgressPublisher>,
    ) -> Result<Conversation, LoadError> {
        if self.selected_note_id == 0 {
            return Err(LoadError::SelectedNoteMissing);
        }

        self.load_once(progress)?;
        if self.fix_conversation {
            let note_ids: Vec<NoteId> = self.items.iter().map(|item| item.note_id).collect();
            tracing::info!(
                "Fixing conversation of {} notes spread over {} conversation ids",
                note_ids.len(),
                self.conversation_ids.len()
            );
            self.store.fix_conversation(&note_ids)?;
            self.load_once(progress)?;
        }

        let mut items = std::mem::take(&mut self.items);
        let order =
            ConversationTreeBuilder::new(self.config.max_indent_level).build(&mut items, progress);
        Ok(Conversation::new(self.selected_note_id, items, order))
    }

    fn load_once(&mut self, progress: Option<&dyn ProgressPublisher>) -> Result<(), LoadError> {
        self.conversation_ids.clear();
        self.fix_conversation = false;
        self.pass_items.clear();
        self.ids_to_find.clear();
        self.items.clear();

        if self.config.sync {
            self.request_conversation_sync(self.selected_note_id);
        }

        let conversation_id = match self.store.conversation_id(self.selected_note_id) {
            Ok(id) => id.unwrap_or(0),
            Err(e) => {
                tracing::warn!(
                    "Couldn't get conversation of selected note id={}: {}",
                    self.selected_note_id,
                    e
                );
                0
            }
        };
        let selected = self.get_item(self.selected_note_id, conversation_id, 0);

        match self.config.strategy {
            LoadStrategy::Recursive => self.load_recursively(selected, progress),
            LoadStrategy::WholeConversation => self.load_whole_conversation(selected, progress)?,
        }

        self.add_missed_from_cache(progress);
        Ok(())
    }

    /// Walk ancestors and replies of the selected note.
    fn load_recursively(
        &mut self,
        selected: ConversationItem,
        progress: Option<&dyn ProgressPublisher>,
    ) {
        let mut pending = vec![selected];

        while let Some(stub) = pending.pop() {
            if !self.add_note_id_to_find(stub.note_id) {
                continue;
            }

            let mut item = self.load_item_from_store(stub);
            let reply_ids = match self.store.reply_ids(item.note_id) {
                Ok(ids) => ids,
                Err(e) => {
                    tracing::warn!("Couldn't find replies of note id={}: {}", item.note_id, e);
                    Vec::new()
                }
            };
            item.n_replies = reply_ids.len() as u32;

            if item.is_loaded() {
                if item.conversation_id != 0 {
                    self.conversation_ids.insert(item.conversation_id);
                }
                self.cache_conversation(&item);
            } else if self.config.allow_loading_from_internet {
                self.load_from_internet(item.note_id);
            }

            let note_id = item.note_id;
            let conversation_id = item.conversation_id;
            let reply_level = item.reply_level;
            let parent_id = item.parent_id();

            if self.add_item_to_list(item, progress) {
                if let Some(parent_id) = parent_id {
                    pending.push(self.get_item(parent_id, conversation_id, reply_level - 1));
                }
            }
            for reply_id in reply_ids.into_iter().rev() {
                if reply_id != note_id {
                    pending.push(self.get_item(reply_id, conversation_id, reply_level + 1));
                }
            }
        }

        if self.conversation_ids.len() > 1 {
            tracing::debug!(
                "Conversation of note id={} spans ids {:?}",
                self.selected_note_id,
                self.conversation_ids
            );
            self.fix_conversation = true;
        }
    }

    /// Take every note sharing the selected note's conversation id.
    fn load_whole_conversation(
        &mut self,
        selected: ConversationItem,
        progress: Option<&dyn ProgressPublisher>,
    ) -> Result<(), LoadError> {
        let mut notes = if selected.conversation_id != 0 {
            self.store.notes_in_conversation(selected.conversation_id)?
        } else {
            Vec::new()
        };
        if !notes.iter().any(|n| n.note_id == selected.note_id) {
            let selected = self.load_item_from_store(selected);
            if !selected.is_loaded() && self.config.allow_loading_from_internet {
                self.load_from_internet(selected.note_id);
            }
            notes.push(selected);
        }

        let reply_counts = count_replies(&notes);
        let reply_levels = reply_levels(&notes, self.selected_note_id);
        for mut note in notes {
            if !self.add_note_id_to_find(note.note_id) {
                continue;
            }
            note.n_replies = reply_counts.get(&note.note_id).copied().unwrap_or(0);
            note.reply_level = reply_levels.get(&note.note_id).copied().unwrap_or(0);
            if note.is_loaded() {
                if note.conversation_id != 0 {
                    self.conversation_ids.insert(note.conversation_id);
                }
                self.cache_conversation(&note);
            }
            self.add_item_to_list(note, progress);
        }
        Ok(())
    }

    fn cache_conversation(&mut self, item: &ConversationItem) {
        self.pass_items.insert(item.note_id, item.clone());
    }

    /// Append notes the walk did not reach: ones hydrated during this pass,
    /// then shared-cache notes of this conversation or replying into it.
    fn add_missed_from_cache(&mut self, progress: Option<&dyn ProgressPublisher>) {
        let mut listed: HashSet<NoteId> = self.items.iter().map(|item| item.note_id).collect();

        let mut missed: Vec<ConversationItem> = self
            .pass_items
            .values()
            .filter(|item| !listed.contains(&item.note_id))
            .cloned()
            .collect();
        missed.sort_by_key(|item| item.note_id);
        listed.extend(missed.iter().map(|item| item.note_id));

        let mut delivered = if self.cache.is_empty() {
            Vec::new()
        } else {
            self.cache.missing_from(&listed)
        };
        // Replies to replies may arrive together, so repeat until nothing joins
        loop {
            let before = delivered.len();
            delivered.retain(|item| {
                let related = (item.conversation_id != 0
                    && self.conversation_ids.contains(&item.conversation_id))
                    || item.parent_id().is_some_and(|parent| listed.contains(&parent));
                if related {
                    listed.insert(item.note_id);
                    missed.push(item.clone());
                }
                !related
            });
            if delivered.len() == before {
                break;
            }
        }
        if !delivered.is_empty() {
            tracing::debug!("Skipped {} cached notes of other conversations", delivered.len());
        }

        if missed.is_empty() {
            return;
        }
        tracing::debug!(
            "{} cached notes are not connected to selected note id={}",
            missed.len(),
            self.selected_note_id
        );
        for item in missed {
            self.add_item_to_list(item, progress);
        }
    }

    /// Returns true if the id was added, false for 0 or an id already
    /// being looked for.
    pub fn add_note_id_to_find(&mut self, note_id: NoteId) -> bool {
        if note_id == 0 {
            return false;
        }
        if self.ids_to_find.contains(&note_id) {
            tracing::debug!("Find cycled on the id={}", note_id);
            return false;
        }
        self.ids_to_find.push(note_id);
        true
    }

    /// Copy hydrated earlier in this pass, or a stub, at the given reply level.
    pub fn get_item(
        &self,
        note_id: NoteId,
        conversation_id: ConversationId,
        reply_level: i32,
    ) -> ConversationItem {
        let mut item = self
            .pass_items
            .get(&note_id)
            .cloned()
            .unwrap_or_else(|| ConversationItem::non_loaded(note_id, conversation_id));
        item.reply_level = reply_level;
        item
    }

    /// Hydrate a stub: this pass's copy first, then the store, then a copy
    /// delivered to the shared cache that the store does not have yet. A
    /// note that cannot be found is returned unchanged.
    pub fn load_item_from_store(&mut self, item: ConversationItem) -> ConversationItem {
        if item.is_loaded() || item.note_id == 0 {
            return item;
        }
        if let Some(known) = self.pass_items.get(&item.note_id) {
            let mut known = known.clone();
            known.reply_level = item.reply_level;
            return known;
        }
        let stored = match self.store.load_note(item.note_id) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("Store failed on note id={}: {}", item.note_id, e);
                None
            }
        };
        let found = match stored {
            Some(stored) if stored.is_loaded() => Some(stored),
            stored => self
                .cache
                .get(item.note_id)
                .filter(ConversationItem::is_loaded)
                .or(stored),
        };
        match found {
            Some(mut loaded) => {
                loaded.reply_level = item.reply_level;
                tracing::debug!("Loaded ({}) note id={}", loaded.is_loaded(), item.note_id);
                if loaded.is_loaded() {
                    self.cache_conversation(&loaded);
                }
                loaded
            }
            None => {
                tracing::debug!("Couldn't load note id={}", item.note_id);
                item
            }
        }
    }

    /// Returns true if added, false if a note with this id is listed already.
    pub fn add_item_to_list(
        &mut self,
        item: ConversationItem,
        progress: Option<&dyn ProgressPublisher>,
    ) -> bool {
        if self.items.iter().any(|listed| listed.note_id == item.note_id) {
            tracing::debug!("Note id={} is in the list already", item.note_id);
            return false;
        }
        self.items.push(item);
        if let Some(progress) = progress {
            progress.publish(&self.items.len().to_string());
        }
        true
    }

    /// Ask the network for a note, or for its whole conversation if that
    /// is possible and was not requested yet.
    pub fn load_from_internet(&mut self, note_id: NoteId) {
        if self.request_conversation_sync(note_id) {
            return;
        }
        tracing::debug!("Note id={} will be loaded from the Internet", note_id);
        self.fetcher.send(FetchCommand::GetNote(note_id));
    }

    /// Request the whole conversation once per loader. Prefers the selected
    /// note's conversation and falls back to `note_id`'s. Returns true when
    /// a request was sent now or earlier.
    pub fn request_conversation_sync(&mut self, note_id: NoteId) -> bool {
        if self.conversation_sync_requested {
            return true;
        }
        let mut sync_note_id = self.selected_note_id;
        let mut conversation_oid = self.conversation_oid(sync_note_id);
        if conversation_oid.is_none() && note_id != sync_note_id {
            sync_note_id = note_id;
            conversation_oid = self.conversation_oid(sync_note_id);
        }

        let Some(conversation_oid) = conversation_oid else {
            return false;
        };
        if self.fetcher.has_conversation_endpoint() || is_downloadable(&conversation_oid) {
            self.conversation_sync_requested = true;
            tracing::debug!(
                "Conversation oid={} for note id={} will be loaded from the Internet",
                conversation_oid,
                sync_note_id
            );
            self.fetcher.send(FetchCommand::GetConversation(sync_note_id));
            return true;
        }
        false
    }

    fn conversation_oid(&self, note_id: NoteId) -> Option<String> {
        match self.store.conversation_oid(note_id) {
            Ok(oid) => oid.filter(|oid| !oid.is_empty()),
            Err(e) => {
                tracing::warn!("Couldn't get conversation oid of note id={}: {}", note_id, e);
                None
            }
        }
    }
}

fn count_replies(notes: &[ConversationItem]) -> HashMap<NoteId, u32> {
    let mut counts: HashMap<NoteId, u32> = HashMap::new();
    for note in notes {
        if let Some(parent_id) = note.parent_id() {
            *counts.entry(parent_id).or_insert(0) += 1;
        }
    }
    counts
}

/// Hops from the selected note: ancestors negative, descendants positive,
/// everything else 0.
fn reply_levels(notes: &[ConversationItem], selected_note_id: NoteId) -> HashMap<NoteId, i32> {
    let parents: HashMap<NoteId, NoteId> = notes
        .iter()
        .filter_map(|n| n.parent_id().map(|p| (n.note_id, p)))
        .collect();
    let mut levels: HashMap<NoteId, i32> = HashMap::new();
    levels.insert(selected_note_id, 0);

    let mut level = 0;
    let mut current = selected_note_id;
    while let Some(&parent) = parents.get(&current) {
        if levels.contains_key(&parent) {
            break;
        }
        level -= 1;
        levels.insert(parent, level);
        current = parent;
    }

    let mut children: HashMap<NoteId, Vec<NoteId>> = HashMap::new();
    for (&child, &parent) in &parents {
        children.entry(parent).or_default().push(child);
    }
    let mut pending = vec![(selected_note_id, 0)];
    while let Some((note_id, level)) = pending.pop() {
        if let Some(replies) = children.get(&note_id) {
            for &reply in replies {
                if !levels.contains_key(&reply) {
                    levels.insert(reply, level + 1);
                    pending.push((reply, level + 1));
                }
            }
        }
    }

    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DownloadStatus;
    use crate::store::{MemoryStore, NoFetcher, RecordingFetcher};
    use std::cell::RefCell;

    fn note(note_id: NoteId, parent: Option<NoteId>, updated: i64) -> ConversationItem {
        let mut item = ConversationItem::non_loaded(note_id, 1);
        item.in_reply_to_note_id = parent;
        item.updated_date = updated;
        item.body = format!("note {}", note_id);
        item
    }

    /// 1 <- 2 <- 4
    /// 1 <- 3
    fn small_thread() -> MemoryStore {
        MemoryStore::from_items([
            note(1, None, 10),
            note(2, Some(1), 20),
            note(3, Some(1), 30),
            note(4, Some(2), 40),
        ])
    }

    fn ids(conversation: &Conversation) -> Vec<NoteId> {
        conversation
            .ordered()
            .map(|(item, _)| item.note_id)
            .collect()
    }

    #[test]
    fn test_recursive_load_from_leaf() {
        let store = small_thread();
        let mut loader = ConversationLoader::new(&store, NoFetcher, LoaderConfig::default(), 4);
        let conversation = loader.load(None).unwrap();

        assert_eq!(conversation.len(), 4);
        assert_eq!(ids(&conversation), vec![1, 2, 4, 3]);
        assert_eq!(conversation.item(1).unwrap().n_replies, 2);
        assert_eq!(conversation.item(4).unwrap().reply_level, 0);
        assert_eq!(conversation.item(2).unwrap().reply_level, -1);
        assert_eq!(conversation.item(1).unwrap().reply_level, -2);
        assert_eq!(conversation.item(3).unwrap().reply_level, -1);
    }

    #[test]
    fn test_recursive_load_indents() {
        let store = small_thread();
        let mut loader = ConversationLoader::new(&store, NoFetcher, LoaderConfig::default(), 1);
        let conversation = loader.load(None).unwrap();

        let indents: Vec<(NoteId, u32)> = conversation
            .ordered()
            .map(|(item, order)| (item.note_id, order.indent_level))
            .collect();
        // 4 is indented once more because its parent's parent has two replies
        assert_eq!(indents, vec![(1, 0), (2, 1), (4, 2), (3, 1)]);
    }

    #[test]
    fn test_whole_conversation_load() {
        let store = small_thread();
        store.insert({
            let mut other = note(9, None, 5);
            other.conversation_id = 2;
            other
        });
        let config = LoaderConfig {
            strategy: LoadStrategy::WholeConversation,
            ..LoaderConfig::default()
        };
        let mut loader = ConversationLoader::new(&store, NoFetcher, config, 3);
        let conversation = loader.load(None).unwrap();

        assert_eq!(conversation.len(), 4);
        assert!(conversation.item(9).is_none());
        assert_eq!(conversation.item(1).unwrap().n_replies, 2);
        assert_eq!(conversation.item(1).unwrap().reply_level, -1);
        assert_eq!(conversation.item(3).unwrap().reply_level, 0);
        assert_eq!(conversation.item(2).unwrap().reply_level, 0);
        assert_eq!(conversation.history_order_of(1), 1);
    }

    #[test]
    fn test_missing_parent_stays_stub_and_is_requested() {
        let store = MemoryStore::from_items([note(2, Some(1), 20)]);
        let fetcher = RecordingFetcher::new(false);
        let config = LoaderConfig {
            allow_loading_from_internet: true,
            ..LoaderConfig::default()
        };
        let mut loader = ConversationLoader::new(&store, &fetcher, config, 2);
        let conversation = loader.load(None).unwrap();

        assert_eq!(conversation.len(), 2);
        let parent = conversation.item(1).unwrap();
        assert!(!parent.is_loaded());
        assert_eq!(parent.reply_level, -1);
        assert_eq!(conversation.history_order_of(1), 1);
        assert_eq!(fetcher.sent(), vec![FetchCommand::GetNote(1)]);
    }

    #[test]
    fn test_offline_does_not_request_notes() {
        let store = MemoryStore::from_items([note(2, Some(1), 20)]);
        let fetcher = RecordingFetcher::new(true);
        let mut loader = ConversationLoader::new(&store, &fetcher, LoaderConfig::default(), 2);
        loader.load(None).unwrap();

        assert!(fetcher.sent().is_empty());
    }

    #[test]
    fn test_conversation_sync_requested_once() {
        let store = small_thread();
        store.set_conversation_oid(1, "https://example.org/conversation/1");
        let fetcher = RecordingFetcher::new(false);
        let config = LoaderConfig {
            sync: true,
            allow_loading_from_internet: true,
            ..LoaderConfig::default()
        };
        let mut loader = ConversationLoader::new(&store, &fetcher, config, 4);
        loader.load(None).unwrap();
        assert!(loader.is_conversation_sync_requested());
        assert!(loader.request_conversation_sync(4));

        assert_eq!(fetcher.sent(), vec![FetchCommand::GetConversation(4)]);
    }

    #[test]
    fn test_sync_needs_endpoint_or_downloadable_oid() {
        let store = small_thread();
        store.set_conversation_oid(1, "tag:example.org,2020:conversation:1");

        let offline = RecordingFetcher::new(false);
        let mut loader = ConversationLoader::new(&store, &offline, LoaderConfig::default(), 4);
        assert!(!loader.request_conversation_sync(4));
        assert!(offline.sent().is_empty());

        let online = RecordingFetcher::new(true);
        let mut loader = ConversationLoader::new(&store, &online, LoaderConfig::default(), 4);
        assert!(loader.request_conversation_sync(4));
        assert_eq!(online.sent(), vec![FetchCommand::GetConversation(4)]);
    }

    #[test]
    fn test_sync_without_oid_falls_back_to_note() {
        let mut stray = note(7, None, 1);
        stray.conversation_id = 5;
        let store = MemoryStore::from_items([note(1, None, 1), stray]);
        store.set_conversation_oid(5, "https://example.org/c/5");
        let fetcher = RecordingFetcher::new(false);
        let mut loader = ConversationLoader::new(&store, &fetcher, LoaderConfig::default(), 1);

        loader.load_from_internet(7);
        assert_eq!(fetcher.sent(), vec![FetchCommand::GetConversation(7)]);
    }

    #[test]
    fn test_cached_notes_merged() {
        let store = small_thread();
        let cache = NoteCache::new();
        let mut late = note(5, Some(99), 50);
        late.status = DownloadStatus::Loaded;
        cache.put(late);

        let mut loader = ConversationLoader::new(&store, NoFetcher, LoaderConfig::default(), 1)
            .with_cache(cache);
        let conversation = loader.load(None).unwrap();

        assert_eq!(conversation.len(), 5);
        assert_eq!(conversation.order_of(5).unwrap().indent_level, 0);
    }

    #[test]
    fn test_cache_hydrates_stub() {
        let store = MemoryStore::from_items([note(2, Some(1), 20)]);
        let cache = NoteCache::new();
        let mut parent = note(1, None, 10);
        parent.status = DownloadStatus::Loaded;
        cache.put(parent);

        let mut loader = ConversationLoader::new(&store, NoFetcher, LoaderConfig::default(), 2)
            .with_cache(cache);
        let conversation = loader.load(None).unwrap();

        assert!(conversation.item(1).unwrap().is_loaded());
        assert_eq!(conversation.item(1).unwrap().body, "note 1");
    }

    #[test]
    fn test_shared_cache_keeps_conversations_apart() {
        let mut other_root = note(10, None, 100);
        other_root.conversation_id = 2;
        let mut other_reply = note(11, Some(10), 110);
        other_reply.conversation_id = 2;
        let store = MemoryStore::from_items([
            note(1, None, 10),
            note(2, Some(1), 20),
            other_root,
            other_reply,
        ]);
        let cache = NoteCache::new();
        let mut delivered = note(3, Some(2), 30);
        delivered.status = DownloadStatus::Loaded;
        cache.put(delivered);

        let mut first = ConversationLoader::new(&store, NoFetcher, LoaderConfig::default(), 2)
            .with_cache(cache.clone());
        let conversation = first.load(None).unwrap();
        assert_eq!(ids(&conversation), vec![1, 2, 3]);

        let mut second = ConversationLoader::new(&store, NoFetcher, LoaderConfig::default(), 11)
            .with_cache(cache);
        let conversation = second.load(None).unwrap();
        assert_eq!(ids(&conversation), vec![10, 11]);
        assert!(conversation.items.iter().all(|i| i.conversation_id == 2));
    }

    #[test]
    fn test_reply_delivered_for_other_conversation_id_joins_by_parent() {
        let store = small_thread();
        let cache = NoteCache::new();
        let mut delivered = note(6, Some(4), 60);
        delivered.conversation_id = 0;
        delivered.status = DownloadStatus::Loaded;
        cache.put(delivered);
        let mut nested = note(7, Some(6), 70);
        nested.conversation_id = 0;
        nested.status = DownloadStatus::Loaded;
        cache.put(nested);

        let mut loader = ConversationLoader::new(&store, NoFetcher, LoaderConfig::default(), 1)
            .with_cache(cache);
        let conversation = loader.load(None).unwrap();

        assert_eq!(conversation.len(), 6);
        assert!(conversation.item(7).is_some());
    }

    #[test]
    fn test_reload_sees_store_updates() {
        let store = small_thread();
        let cache = NoteCache::new();
        let mut stale = note(1, None, 10);
        stale.body = "cached".to_string();
        stale.status = DownloadStatus::Loaded;
        cache.put(stale);

        let mut loader = ConversationLoader::new(&store, NoFetcher, LoaderConfig::default(), 4)
            .with_cache(cache);
        let conversation = loader.load(None).unwrap();
        assert_eq!(conversation.item(1).unwrap().body, "note 1");

        let mut edited = note(1, None, 10);
        edited.body = "edited".to_string();
        store.insert(edited);
        let conversation = loader.load(None).unwrap();
        assert_eq!(conversation.item(1).unwrap().body, "edited");
    }

    #[test]
    fn test_cycle_in_store_terminates() {
        let store = MemoryStore::from_items([note(1, Some(2), 10), note(2, Some(1), 20)]);
        let mut loader = ConversationLoader::new(&store, NoFetcher, LoaderConfig::default(), 1);
        let conversation = loader.load(None).unwrap();

        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.order.visited_count(), 2);
    }

    #[test]
    fn test_inconsistent_conversation_fixed() {
        let mut reply = note(2, Some(1), 20);
        reply.conversation_id = 8;
        let store = MemoryStore::from_items([note(1, None, 10), reply]);
        let mut loader = ConversationLoader::new(&store, NoFetcher, LoaderConfig::default(), 2);
        let conversation = loader.load(None).unwrap();

        assert_eq!(conversation.len(), 2);
        assert_eq!(store.conversation_id(2).unwrap(), Some(1));
        assert!(conversation.items.iter().all(|i| i.conversation_id == 1));
    }

    #[test]
    fn test_progress_reports_item_count() {
        let store = small_thread();
        let messages = RefCell::new(Vec::new());
        let publisher = |m: &str| messages.borrow_mut().push(m.to_string());
        let mut loader = ConversationLoader::new(&store, NoFetcher, LoaderConfig::default(), 1);
        loader.load(Some(&publisher)).unwrap();

        let messages = messages.borrow();
        assert_eq!(messages[..4].to_vec(), vec!["1", "2", "3", "4"]);
        assert_eq!(messages.last().map(String::as_str), Some("ordering 4 notes"));
    }

    #[test]
    fn test_zero_selected_is_error() {
        let store = MemoryStore::new();
        let mut loader = ConversationLoader::new(&store, NoFetcher, LoaderConfig::default(), 0);
        assert!(matches!(loader.load(None), Err(LoadError::SelectedNoteMissing)));
    }

    #[test]
    fn test_add_note_id_to_find() {
        let store = MemoryStore::new();
        let mut loader = ConversationLoader::new(&store, NoFetcher, LoaderConfig::default(), 1);
        assert!(!loader.add_note_id_to_find(0));
        assert!(loader.add_note_id_to_find(3));
        assert!(!loader.add_note_id_to_find(3));
    }

    #[test]
    fn test_add_item_to_list_rejects_duplicates() {
        let store = MemoryStore::new();
        let mut loader = ConversationLoader::new(&store, NoFetcher, LoaderConfig::default(), 1);
        assert!(loader.add_item_to_list(note(3, None, 1), None));
        assert!(!loader.add_item_to_list(note(3, None, 2), None));
    }
}
