use crate::models::NoteId;

/// Failures reported by a [`crate::store::NoteStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Note not found: {0}")]
    NotFound(NoteId),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Errors that abort a conversation load.
///
/// Single notes that cannot be resolved are not errors: they stay stubs.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Selected note id is 0")]
    SelectedNoteMissing,
}
