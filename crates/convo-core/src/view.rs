//! Display rows for a conversation list.
//!
//! Turns a [`Conversation`] into the flat rows a list widget binds to:
//! final row order, effective indentation, the message number and the
//! one-line details text. Drawing is left to the UI.

use crate::constants::{INDENT_UNIT_DP, UNKNOWN_REPLY_NAME};
use crate::models::{Conversation, ConversationItem, NoteId, NoteOrder};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewOptions {
    /// Indent replies; when false every row is flush left
    pub show_threads: bool,
    /// Oldest note on top instead of the newest traversal position
    pub old_messages_first: bool,
    /// Append indent and reply level to the details line
    pub show_debug_info: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            show_threads: true,
            old_messages_first: false,
            show_debug_info: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRow {
    pub note_id: NoteId,
    pub indent_level: u32,
    /// Message number shown next to the note
    pub history_order: u32,
    /// Highlighted as the note the conversation was opened from
    pub is_selected: bool,
    pub author: Option<String>,
    pub body: String,
    /// Milliseconds since the Unix epoch; relative formatting is up to the UI
    pub created_date: i64,
    pub details: String,
}

/// Horizontal offset for an indent level.
pub fn indent_pixels(indent_level: u32, unit: u32) -> u32 {
    unit * indent_level
}

/// [`indent_pixels`] with the default unit.
pub fn default_indent_pixels(indent_level: u32) -> u32 {
    indent_pixels(indent_level, INDENT_UNIT_DP)
}

impl Conversation {
    /// Rows of all ordered notes, in display order.
    pub fn rows(&self, options: &ViewOptions) -> Vec<ConversationRow> {
        let mut ordered: Vec<(&ConversationItem, &NoteOrder)> = self.ordered().collect();
        if options.old_messages_first {
            ordered.sort_by_key(|(_, order)| order.history_order);
        } else {
            ordered.sort_by_key(|(_, order)| order.list_order);
        }

        let several = ordered.len() > 1;
        ordered
            .into_iter()
            .map(|(item, order)| ConversationRow {
                note_id: item.note_id,
                indent_level: if options.show_threads {
                    order.indent_level
                } else {
                    0
                },
                history_order: order.history_order,
                is_selected: several && item.note_id == self.selected_note_id,
                author: item.author.clone(),
                body: item.body.clone(),
                created_date: item.created_date,
                details: self.details(item, order, options),
            })
            .collect()
    }

    fn details(
        &self,
        item: &ConversationItem,
        order: &NoteOrder,
        options: &ViewOptions,
    ) -> String {
        let mut details = String::new();

        if let Some(source) = item.note_source.as_deref().filter(|s| !s.trim().is_empty()) {
            details.push_str(&format!("from {}", source));
        }

        if let Some(name) = item.in_reply_to_name.as_deref().filter(|s| !s.is_empty()) {
            let name = if name.trim().is_empty() {
                UNKNOWN_REPLY_NAME
            } else {
                name
            };
            push_part(&mut details, &format!("in reply to {}", name));
            if let Some(parent_id) = item.parent_id() {
                details.push_str(&format!(" ({})", self.history_order_of(parent_id)));
            }
        }

        if let Some(recipient) = item.recipient_name.as_deref().filter(|s| !s.trim().is_empty()) {
            push_part(&mut details, &format!("to {}", recipient));
        }

        if !item.is_loaded() {
            push_part(&mut details, &format!("({})", item.status));
        }

        if options.show_debug_info {
            push_part(
                &mut details,
                &format!("(i{},r{})", order.indent_level, item.reply_level),
            );
        }

        details
    }
}

fn push_part(details: &mut String, part: &str) {
    if !details.is_empty() {
        details.push(' ');
    }
    details.push_str(part);
}
