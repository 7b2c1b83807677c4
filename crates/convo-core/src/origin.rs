//! Per-backend URL formatting.

use crate::constants::gnu_social::{MESSAGE_PATH, NOTICE_PATH};
use crate::models::{ConversationItem, Visibility};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OriginKind {
    GnuSocial,
    Twitter,
    Mastodon,
    ActivityPub,
}

/// A social network server the notes came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub kind: OriginKind,
    pub url: Url,
}

impl Origin {
    pub fn new(kind: OriginKind, url: Url) -> Self {
        Self { kind, url }
    }

    /// Web link to a note built from its origin-side id, for backends whose
    /// notes have a predictable URL.
    ///
    /// GNU social serves public notices under `notice/<oid>` and private
    /// messages under `message/<oid>`.
    pub fn alternative_note_permalink(
        &self,
        note_oid: &str,
        visibility: Visibility,
    ) -> Option<String> {
        match self.kind {
            OriginKind::GnuSocial => {
                let segment = if visibility.is_private() {
                    MESSAGE_PATH
                } else {
                    NOTICE_PATH
                };
                match self.url.join(&format!("{}/{}", segment, note_oid)) {
                    Ok(url) => Some(url.to_string()),
                    Err(e) => {
                        tracing::debug!("Malformed URL from '{}': {}", self.url, e);
                        None
                    }
                }
            }
            OriginKind::Twitter | OriginKind::Mastodon | OriginKind::ActivityPub => None,
        }
    }

    /// [`Self::alternative_note_permalink`] for a loaded note. None when the
    /// note has no origin-side id yet.
    pub fn note_permalink(&self, item: &ConversationItem) -> Option<String> {
        let note_oid = item.note_oid.as_deref().filter(|oid| !oid.is_empty())?;
        self.alternative_note_permalink(note_oid, item.visibility)
    }
}

/// True when `uri` is an http(s) URL the network layer could download.
pub fn is_downloadable(uri: &str) -> bool {
    Url::parse(uri)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
        .unwrap_or(false)
}
