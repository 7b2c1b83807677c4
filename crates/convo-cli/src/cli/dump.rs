use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use convo_core::models::{ConversationId, ConversationItem};
use convo_core::store::MemoryStore;
use serde::Deserialize;

/// A JSON export of notes: either a bare array of notes, or an object
/// that also maps conversation ids to their origin-side ids.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDump {
    pub notes: Vec<ConversationItem>,
    #[serde(default)]
    pub conversation_oids: HashMap<ConversationId, String>,
}

impl NoteDump {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read notes file: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse notes file: {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim_start().starts_with('[') {
            let notes: Vec<ConversationItem> =
                serde_json::from_str(json).context("Failed to deserialize notes")?;
            return Ok(Self {
                notes,
                conversation_oids: HashMap::new(),
            });
        }
        serde_json::from_str(json).context("Failed to deserialize notes")
    }

    pub fn into_store(self) -> MemoryStore {
        let store = MemoryStore::from_items(self.notes);
        for (conversation_id, oid) in self.conversation_oids {
            store.set_conversation_oid(conversation_id, oid);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convo_core::store::NoteStore;

    #[test]
    fn test_bare_array() {
        let dump = NoteDump::from_json(r#"[{"noteId": 1}, {"noteId": 2, "inReplyToNoteId": 1}]"#)
            .unwrap();
        let store = dump.into_store();
        assert_eq!(store.len(), 2);
        assert_eq!(store.reply_ids(1).unwrap(), vec![2]);
    }

    #[test]
    fn test_full_dump_with_oids() {
        let json = r#"{
            "notes": [{"noteId": 1, "conversationId": 3}],
            "conversationOids": {"3": "https://example.org/conversation/3"}
        }"#;
        let store = NoteDump::from_json(json).unwrap().into_store();
        assert_eq!(
            store.conversation_oid(1).unwrap().as_deref(),
            Some("https://example.org/conversation/3")
        );
    }

    #[test]
    fn test_invalid_json() {
        assert!(NoteDump::from_json(r#"{"nope": true}"#).is_err());
    }
}
