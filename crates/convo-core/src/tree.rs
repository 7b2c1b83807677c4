//! Reply tree reconstruction and ordering.
//!
//! Takes the flat, possibly incomplete set of notes the loader collected and
//! turns it into one linear sequence with indentation, ready for a list view.
//!
//! # Ordering
//! Items are first sorted by [`reply_level_order`]. The walk then runs from
//! the end of the sorted slice to the beginning: every item not reached yet
//! starts a traversal, and inside a traversal the replies of a node are also
//! taken from the end of the slice. With equal reply levels that visits older
//! notes first, so `history_order` reads chronologically.
//!
//! # Anomalies
//! - A reply whose parent is not in the set starts its own traversal, so the
//!   result may be a forest.
//! - An id that was already visited in this pass (cycles, duplicates) is
//!   skipped and logged; its [`NoteOrder`] stays zero.

use crate::constants::MAX_INDENT_LEVEL;
use crate::models::{ConversationItem, ConversationOrder, NoteId, NoteOrder};
use crate::progress::ProgressPublisher;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Sort order applied before the walk: `reply_level` descending, then
/// `updated_date` descending, then `note_id` descending.
pub fn reply_level_order(lhs: &ConversationItem, rhs: &ConversationItem) -> Ordering {
    rhs.reply_level
        .cmp(&lhs.reply_level)
        .then_with(|| rhs.updated_date.cmp(&lhs.updated_date))
        .then_with(|| rhs.note_id.cmp(&lhs.note_id))
}

struct OrderCounters {
    list: i32,
    history: u32,
}

impl Default for OrderCounters {
    fn default() -> Self {
        Self {
            list: -1,
            history: 1,
        }
    }
}

/// Pending visit on the explicit traversal stack
struct Visit {
    index: usize,
    indent: u32,
    n_parent_replies: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct ConversationTreeBuilder {
    max_indent_level: u32,
}

impl Default for ConversationTreeBuilder {
    fn default() -> Self {
        Self::new(MAX_INDENT_LEVEL)
    }
}

impl ConversationTreeBuilder {
    pub fn new(max_indent_level: u32) -> Self {
        Self { max_indent_level }
    }

    pub fn max_indent_level(&self) -> u32 {
        self.max_indent_level
    }

    pub fn sort(&self, items: &mut [ConversationItem]) {
        items.sort_by(reply_level_order);
    }

    /// Sort `items` in place and enumerate them.
    pub fn build(
        &self,
        items: &mut [ConversationItem],
        progress: Option<&dyn ProgressPublisher>,
    ) -> ConversationOrder {
        self.sort(items);
        if let Some(progress) = progress {
            progress.publish(&format!("ordering {} notes", items.len()));
        }
        self.enumerate(items)
    }

    /// Assign history order, list order and indentation to an already
    /// sorted slice. The returned order is aligned with `items` by index.
    pub fn enumerate(&self, items: &[ConversationItem]) -> ConversationOrder {
        let mut order = ConversationOrder::with_len(items.len());
        let replies = reply_index(items);
        let mut visited: HashSet<NoteId> = HashSet::with_capacity(items.len());
        let mut counters = OrderCounters::default();

        for root in (0..items.len()).rev() {
            if order.entries()[root].list_order < 0 {
                continue;
            }
            self.enumerate_branch(
                items,
                root,
                &replies,
                &mut visited,
                &mut counters,
                &mut order,
            );
        }

        order
    }

    fn enumerate_branch(
        &self,
        items: &[ConversationItem],
        root: usize,
        replies: &HashMap<NoteId, Vec<usize>>,
        visited: &mut HashSet<NoteId>,
        counters: &mut OrderCounters,
        order: &mut ConversationOrder,
    ) {
        let mut stack = vec![Visit {
            index: root,
            indent: 0,
            n_parent_replies: 0,
        }];

        while let Some(visit) = stack.pop() {
            let item = &items[visit.index];
            if !visited.insert(item.note_id) {
                tracing::debug!(
                    "Note id={} was visited already, cycle or duplicate skipped",
                    item.note_id
                );
                continue;
            }

            order.set(
                visit.index,
                NoteOrder {
                    history_order: counters.history,
                    list_order: counters.list,
                    indent_level: visit.indent,
                    n_parent_replies: visit.n_parent_replies,
                },
            );
            counters.history += 1;
            counters.list -= 1;

            let mut indent_next = visit.indent;
            if (item.n_replies > 1 || visit.n_parent_replies > 1)
                && indent_next < self.max_indent_level
            {
                indent_next += 1;
            }

            // Replies are visited from the end of the slice; the stack pops
            // the last pushed first, so push them in slice order.
            if let Some(reply_indices) = replies.get(&item.note_id) {
                for &reply in reply_indices {
                    stack.push(Visit {
                        index: reply,
                        indent: indent_next,
                        n_parent_replies: item.n_replies,
                    });
                }
            }
        }
    }
}

/// parent id -> indices of its replies, in slice order
fn reply_index(items: &[ConversationItem]) -> HashMap<NoteId, Vec<usize>> {
    let mut replies: HashMap<NoteId, Vec<usize>> = HashMap::new();
    for (index, item) in items.iter().enumerate() {
        if let Some(parent_id) = item.parent_id() {
            replies.entry(parent_id).or_default().push(index);
        }
    }
    replies
}
