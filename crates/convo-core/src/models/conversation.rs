use super::note::{ConversationItem, NoteId};
use super::order::{ConversationOrder, NoteOrder};

/// A loaded conversation: sorted items plus their ordering metadata.
#[derive(Debug, Clone)]
pub struct Conversation {
    pub selected_note_id: NoteId,
    pub items: Vec<ConversationItem>,
    pub order: ConversationOrder,
}

impl Conversation {
    pub fn new(
        selected_note_id: NoteId,
        items: Vec<ConversationItem>,
        order: ConversationOrder,
    ) -> Self {
        Self {
            selected_note_id,
            items,
            order,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, note_id: NoteId) -> Option<&ConversationItem> {
        self.items.iter().find(|item| item.note_id == note_id)
    }

    pub fn order_of(&self, note_id: NoteId) -> Option<NoteOrder> {
        self.order.by_note_id(&self.items, note_id)
    }

    /// Displayed number of a note, 0 when it is not in the ordered output.
    pub fn history_order_of(&self, note_id: NoteId) -> u32 {
        self.order_of(note_id)
            .map(|o| o.history_order)
            .unwrap_or(0)
    }

    /// Items with their order, in history order.
    pub fn ordered(&self) -> impl Iterator<Item = (&ConversationItem, &NoteOrder)> + '_ {
        self.order
            .sequence()
            .into_iter()
            .map(move |index| (&self.items[index], &self.order.entries()[index]))
    }

    /// Items the tree walk skipped (repeated ids, cycles).
    pub fn unordered(&self) -> impl Iterator<Item = &ConversationItem> + '_ {
        self.order
            .unvisited()
            .into_iter()
            .map(move |index| &self.items[index])
    }
}
