use crate::constants::MAX_INDENT_LEVEL;
use serde::{Deserialize, Serialize};

/// How the loader collects the notes of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadStrategy {
    /// Follow parents and replies outward from the selected note
    #[default]
    Recursive,
    /// Query every note sharing the selected note's conversation id
    WholeConversation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoaderConfig {
    pub max_indent_level: u32,
    /// Ask the network for the whole conversation when loading starts
    pub sync: bool,
    pub strategy: LoadStrategy,
    /// Request single notes from the network when the store lacks them
    pub allow_loading_from_internet: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_indent_level: MAX_INDENT_LEVEL,
            sync: false,
            strategy: LoadStrategy::default(),
            allow_loading_from_internet: false,
        }
    }
}
