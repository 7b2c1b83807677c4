use serde::{Deserialize, Serialize};
use std::fmt;

pub type NoteId = i64;
pub type ConversationId = i64;

/// Whether a note is visible to everyone at its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Visibility {
    Public,
    Private,
    #[default]
    Unknown,
}

impl Visibility {
    pub fn is_private(&self) -> bool {
        matches!(self, Visibility::Private)
    }
}

/// How far the local copy of a note got.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DownloadStatus {
    Loaded,
    Absent,
    Sending,
    Draft,
    #[default]
    Unknown,
}

impl DownloadStatus {
    pub fn title(&self) -> &'static str {
        match self {
            DownloadStatus::Loaded => "loaded",
            DownloadStatus::Absent => "absent",
            DownloadStatus::Sending => "sending",
            DownloadStatus::Draft => "draft",
            DownloadStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// One note of a conversation, either hydrated or a stub known only by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationItem {
    pub note_id: NoteId,
    #[serde(default)]
    pub conversation_id: ConversationId,
    /// Direct parent note. None for conversation roots.
    #[serde(default)]
    pub in_reply_to_note_id: Option<NoteId>,
    /// Last update, milliseconds since the Unix epoch
    #[serde(default)]
    pub updated_date: i64,
    /// Hops from the selected note: ancestors are negative, replies positive.
    /// Only used as a sort hint before the tree walk.
    #[serde(default)]
    pub reply_level: i32,
    /// Number of direct replies
    #[serde(default)]
    pub n_replies: u32,

    /// Origin-side id of the note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_oid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub created_date: i64,
    /// Client the note was posted from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub status: DownloadStatus,
}

impl ConversationItem {
    /// A stub: identity is known, content is not.
    pub fn non_loaded(note_id: NoteId, conversation_id: ConversationId) -> Self {
        Self {
            note_id,
            conversation_id,
            in_reply_to_note_id: None,
            updated_date: 0,
            reply_level: 0,
            n_replies: 0,
            note_oid: None,
            author: None,
            body: String::new(),
            created_date: 0,
            note_source: None,
            in_reply_to_name: None,
            recipient_name: None,
            visibility: Visibility::Unknown,
            status: DownloadStatus::Unknown,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.status == DownloadStatus::Loaded
    }

    /// Parent id, ignoring the "no parent" encodings (absent or 0).
    pub fn parent_id(&self) -> Option<NoteId> {
        self.in_reply_to_note_id.filter(|id| *id != 0)
    }

    pub fn is_reply_to(&self, note_id: NoteId) -> bool {
        self.parent_id() == Some(note_id)
    }
}
