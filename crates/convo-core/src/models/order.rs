use super::note::{ConversationItem, NoteId};
use serde::{Deserialize, Serialize};

/// Position of one note in the flattened conversation.
///
/// All fields stay zero for a note the tree walk never reached (a repeated
/// id or a cycle), so callers can tell such notes apart and decide whether
/// to surface them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteOrder {
    /// 1, 2, 3, ... in root-first traversal order
    pub history_order: u32,
    /// -1, -2, -3, ... in the same traversal order, for reverse lists
    pub list_order: i32,
    pub indent_level: u32,
    /// Reply count of the parent the note was reached through
    pub n_parent_replies: u32,
}

impl NoteOrder {
    pub fn is_visited(&self) -> bool {
        self.history_order != 0
    }
}

/// Ordering metadata for a sorted slice of conversation items.
///
/// Entries are aligned by index with the slice that was enumerated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationOrder {
    entries: Vec<NoteOrder>,
}

impl ConversationOrder {
    pub(crate) fn with_len(len: usize) -> Self {
        Self {
            entries: vec![NoteOrder::default(); len],
        }
    }

    pub(crate) fn set(&mut self, index: usize, order: NoteOrder) {
        self.entries[index] = order;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&NoteOrder> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[NoteOrder] {
        &self.entries
    }

    /// Order of the first visited item carrying `note_id`.
    pub fn by_note_id(&self, items: &[ConversationItem], note_id: NoteId) -> Option<NoteOrder> {
        items
            .iter()
            .zip(self.entries.iter())
            .find(|(item, order)| item.note_id == note_id && order.is_visited())
            .map(|(_, order)| *order)
    }

    /// Indices of visited items, by increasing history order.
    pub fn sequence(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.entries.len())
            .filter(|&i| self.entries[i].is_visited())
            .collect();
        indices.sort_by_key(|&i| self.entries[i].history_order);
        indices
    }

    /// Indices of items the walk skipped.
    pub fn unvisited(&self) -> Vec<usize> {
        (0..self.entries.len())
            .filter(|&i| !self.entries[i].is_visited())
            .collect()
    }

    pub fn visited_count(&self) -> usize {
        self.entries.iter().filter(|o| o.is_visited()).count()
    }
}
